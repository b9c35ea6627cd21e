use glam::Vec3;

/// RGB color for SDF rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SDFColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl SDFColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From a packed 0xRRGGBB value.
    pub fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
        }
    }
}

impl Default for SDFColor {
    fn default() -> Self {
        Self { r: 0.6, g: 0.6, b: 0.8 }
    }
}

/// SDF shape primitive, sized in local (pre-scale) world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SDFShape {
    Sphere { radius: f32 },
    /// Rounded cylinder along `axis` (local space), `half_height` of straight section.
    Capsule { radius: f32, half_height: f32, axis: Vec3 },
}

impl SDFShape {
    /// Radius of a sphere that encloses the shape.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            SDFShape::Sphere { radius } => radius,
            SDFShape::Capsule { radius, half_height, .. } => radius + half_height,
        }
    }

    /// Wire code for the shader's shape switch.
    pub fn code(&self) -> f32 {
        match self {
            SDFShape::Sphere { .. } => 0.0,
            SDFShape::Capsule { .. } => 1.0,
        }
    }
}

/// Component for SDF-rendered meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshComponent {
    pub shape: SDFShape,
    pub color: SDFColor,
    /// Phong specular exponent (default: 32.0).
    pub shininess: f32,
    /// HDR glow multiplier (default: 0.0, values > 0 push into EDR range).
    pub emissive: f32,
    /// 1.0 = opaque.
    pub opacity: f32,
    /// Halo or atmosphere: depth-sorted behind the solid body it surrounds.
    pub shell: bool,
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self {
            shape: SDFShape::Sphere { radius: 1.0 },
            color: SDFColor::default(),
            shininess: 32.0,
            emissive: 0.0,
            opacity: 1.0,
            shell: false,
        }
    }
}

impl MeshComponent {
    pub fn new(shape: SDFShape, color: SDFColor) -> Self {
        Self {
            shape,
            color,
            ..Default::default()
        }
    }

    pub fn sphere(radius: f32, color: SDFColor) -> Self {
        Self::new(SDFShape::Sphere { radius }, color)
    }

    pub fn capsule(radius: f32, half_height: f32, axis: Vec3, color: SDFColor) -> Self {
        Self::new(
            SDFShape::Capsule { radius, half_height, axis: axis.normalize_or_zero() },
            color,
        )
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Mark as a translucent shell (glow, atmosphere).
    pub fn as_shell(mut self) -> Self {
        self.shell = true;
        self
    }
}
