use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::systems::picking::Ray;

/// Perspective camera for a 3D scene rendered into 2D screen buffers.
/// Screen space is viewport pixels, origin top-left, y down.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    /// Point the camera looks at (also the orbit-controls pivot).
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

/// A world point projected to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Viewport pixels, y down.
    pub pos: Vec2,
    /// Distance along the view axis (positive in front of the camera).
    pub depth: f32,
    /// Pixels per world unit at this depth.
    pub scale: f32,
}

impl PerspectiveCamera {
    pub const DEFAULT_FOV_DEGREES: f32 = 45.0;
    pub const DEFAULT_NEAR: f32 = 0.1;
    pub const DEFAULT_FAR: f32 = 10_000.0;

    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 100.0),
            target: Vec3::ZERO,
            fov_y: Self::DEFAULT_FOV_DEGREES.to_radians(),
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
            viewport_width: viewport_width.max(1.0),
            viewport_height: viewport_height.max(1.0),
        }
    }

    /// Resize the viewport (e.g. on window resize). Non-positive sizes are ignored.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            log::warn!("camera: ignoring viewport {}x{}", width, height);
            return;
        }
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    pub fn aspect(&self) -> f32 {
        self.viewport_width / self.viewport_height
    }

    /// Distance from the camera to its target.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Screen-up reference. Looking straight along ±Y falls back to −Z.
    fn up(&self) -> Vec3 {
        let forward = (self.target - self.position).normalize_or_zero();
        if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up())
    }

    /// Right-handed perspective, depth in [0, 1].
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Snapshot of the current matrices for projecting many points.
    pub fn projector(&self) -> Projector {
        Projector {
            view: self.view(),
            projection: self.projection(),
            near: self.near,
            width: self.viewport_width,
            height: self.viewport_height,
            focal: (self.viewport_height * 0.5) / (self.fov_y * 0.5).tan(),
        }
    }

    /// Project a world point to screen pixels. `None` when it is behind the near plane.
    pub fn project(&self, world: Vec3) -> Option<Projection> {
        self.projector().project(world)
    }

    /// World-space ray from the camera through a screen pixel.
    pub fn ray_through(&self, screen: Vec2) -> Ray {
        let ndc_x = 2.0 * screen.x / self.viewport_width - 1.0;
        let ndc_y = 1.0 - 2.0 * screen.y / self.viewport_height;
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        Ray::new(self.position, far - near)
    }
}

/// Camera matrices frozen for one frame.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    view: Mat4,
    projection: Mat4,
    near: f32,
    width: f32,
    height: f32,
    /// Pixels per world unit at depth 1.
    focal: f32,
}

impl Projector {
    pub fn project(&self, world: Vec3) -> Option<Projection> {
        let view_pos = self.view.transform_point3(world);
        let depth = -view_pos.z;
        if depth < self.near {
            return None;
        }
        let clip = self.projection * Vec4::new(view_pos.x, view_pos.y, view_pos.z, 1.0);
        let ndc = clip.truncate() / clip.w;
        let pos = Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        );
        Some(Projection { pos, depth, scale: self.focal / depth })
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
