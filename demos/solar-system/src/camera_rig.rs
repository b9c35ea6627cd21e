//! Camera behaviour on top of the engine's `PerspectiveCamera`:
//! orbit controls, the three view modes, and focus lock on a body.
//!
//! Per unpaused frame the order is cinematic motion, then focus tracking, then
//! the orbit controls. The controls keep running while the simulation is paused.

use std::f32::consts::{PI, TAU};
use glam::{Vec2, Vec3};
use orrery_engine::PerspectiveCamera;

use crate::bodies::{BodyIndex, SUN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Free,
    Top,
    Cinematic,
}

impl CameraMode {
    pub fn from_wire(value: f32) -> Option<Self> {
        match value {
            v if v == 0.0 => Some(Self::Free),
            v if v == 1.0 => Some(Self::Top),
            v if v == 2.0 => Some(Self::Cinematic),
            _ => None,
        }
    }

    pub fn as_wire(self) -> f32 {
        match self {
            Self::Free => 0.0,
            Self::Top => 1.0,
            Self::Cinematic => 2.0,
        }
    }
}

// ── Orbit controls ───────────────────────────────────────────────────

/// Drag-to-orbit and wheel zoom around the camera target, with damping.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub enabled: bool,
    /// Pending (azimuth, polar) rotation, bled off by the damping factor.
    pending: Vec2,
    /// Distance multiplier applied on the next update.
    zoom: f32,
}

impl OrbitControls {
    pub const DAMPING: f32 = 0.05;
    pub const ZOOM_STEP: f32 = 0.95;
    pub const MIN_DISTANCE: f32 = 5.0;
    pub const MAX_DISTANCE: f32 = 2000.0;
    /// Keeps the polar angle off the poles.
    const POLAR_EPSILON: f32 = 1e-3;

    pub fn new() -> Self {
        Self { enabled: true, pending: Vec2::ZERO, zoom: 1.0 }
    }

    /// Queue a rotation from a pointer drag of `delta` pixels.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }
        self.pending -= delta * (TAU / viewport_height);
    }

    /// Zoom by `notches`; positive moves toward the target.
    pub fn zoom(&mut self, notches: f32) {
        if !self.enabled || !notches.is_finite() {
            return;
        }
        self.zoom *= Self::ZOOM_STEP.powf(notches);
    }

    /// Drop any pending motion.
    pub fn stop(&mut self) {
        self.pending = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub fn is_settled(&self) -> bool {
        self.pending.length_squared() < 1e-12 && self.zoom == 1.0
    }

    /// Apply one frame of damped rotation and the pending zoom.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        if !self.enabled {
            return;
        }
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius < 1e-6 {
            self.stop();
            return;
        }

        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
        azimuth += self.pending.x * Self::DAMPING;
        polar = (polar + self.pending.y * Self::DAMPING)
            .clamp(Self::POLAR_EPSILON, PI - Self::POLAR_EPSILON);
        let radius = (radius * self.zoom).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);

        let offset = Vec3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        );
        camera.position = camera.target + offset;

        self.pending *= 1.0 - Self::DAMPING;
        self.zoom = 1.0;
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

// ── Rig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    mode: CameraMode,
    pub controls: OrbitControls,
    cinematic_angle: f32,
    focus: Option<BodyIndex>,
}

impl CameraRig {
    pub const DEFAULT_POSITION: Vec3 = Vec3::new(-90.0, 140.0, 140.0);
    pub const TOP_POSITION: Vec3 = Vec3::new(0.0, 300.0, 0.0);
    pub const CINEMATIC_RADIUS: f32 = 200.0;
    pub const CINEMATIC_HEIGHT: f32 = 50.0;
    pub const CINEMATIC_BOB: f32 = 30.0;
    pub const CINEMATIC_SPEED: f32 = 0.001;
    pub const SUN_FOCUS_POSITION: Vec3 = Vec3::new(50.0, 30.0, 50.0);
    /// Offset used when a focus starts.
    pub const FOCUS_OFFSET: Vec3 = Vec3::new(20.0, 10.0, 20.0);
    /// Offset held while following.
    pub const FOLLOW_OFFSET: Vec3 = Vec3::new(30.0, 20.0, 30.0);

    pub fn new() -> Self {
        Self {
            mode: CameraMode::Free,
            controls: OrbitControls::new(),
            cinematic_angle: 0.0,
            focus: None,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn focus(&self) -> Option<BodyIndex> {
        self.focus
    }

    pub fn is_locked(&self) -> bool {
        self.focus.is_some()
    }

    pub fn set_mode(&mut self, mode: CameraMode, camera: &mut PerspectiveCamera) {
        self.mode = mode;
        self.controls.stop();
        match mode {
            CameraMode::Free => {
                self.controls.enabled = true;
                camera.position = Self::DEFAULT_POSITION;
            }
            CameraMode::Top => {
                self.controls.enabled = false;
                camera.look_at(Self::TOP_POSITION, Vec3::ZERO);
            }
            CameraMode::Cinematic => {
                self.controls.enabled = false;
            }
        }
        log::debug!("camera mode {:?}", mode);
    }

    /// Default pose, target at the origin. Leaves the mode and any focus alone.
    pub fn reset_view(&mut self, camera: &mut PerspectiveCamera) {
        self.controls.stop();
        camera.look_at(Self::DEFAULT_POSITION, Vec3::ZERO);
    }

    /// Lock onto a body whose current world position is `body_pos`.
    pub fn lock_on(&mut self, body: BodyIndex, body_pos: Vec3, camera: &mut PerspectiveCamera) {
        self.controls.stop();
        if body == SUN {
            camera.look_at(Self::SUN_FOCUS_POSITION, Vec3::ZERO);
        } else {
            camera.look_at(body_pos + Self::FOCUS_OFFSET, body_pos);
        }
        self.focus = Some(body);
        log::debug!("camera focus on body {}", body);
    }

    /// Release the lock and return to the default pose.
    pub fn unlock(&mut self, camera: &mut PerspectiveCamera) {
        if let Some(body) = self.focus.take() {
            log::debug!("camera released body {}", body);
        }
        self.reset_view(camera);
    }

    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        self.controls.rotate(delta, viewport_height);
    }

    pub fn zoom(&mut self, notches: f32) {
        self.controls.zoom(notches);
    }

    /// Unpaused-frame motion: cinematic sweep, then focus tracking.
    /// `locate` returns a body's current world position.
    pub fn advance(
        &mut self,
        camera: &mut PerspectiveCamera,
        time_scale: f32,
        locate: impl Fn(BodyIndex) -> Option<Vec3>,
    ) {
        if self.mode == CameraMode::Cinematic {
            self.cinematic_angle += Self::CINEMATIC_SPEED * time_scale;
            camera.look_at(Self::cinematic_position(self.cinematic_angle), Vec3::ZERO);
        }

        match self.focus {
            Some(SUN) => camera.target = Vec3::ZERO,
            Some(body) => {
                if let Some(pos) = locate(body) {
                    camera.look_at(pos + Self::FOLLOW_OFFSET, pos);
                }
            }
            None => {}
        }
    }

    /// Runs every frame, paused or not.
    pub fn update_controls(&mut self, camera: &mut PerspectiveCamera) {
        if self.mode == CameraMode::Free && !self.controls.is_settled() {
            self.controls.update(camera);
        }
    }

    pub fn cinematic_position(angle: f32) -> Vec3 {
        Vec3::new(
            angle.cos() * Self::CINEMATIC_RADIUS,
            Self::CINEMATIC_HEIGHT + (2.0 * angle).sin() * Self::CINEMATIC_BOB,
            angle.sin() * Self::CINEMATIC_RADIUS,
        )
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}
