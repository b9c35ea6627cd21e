/// Dynamic point lights for a 3D scene shaded in screen space.
///
/// Lights are persistent: they stay until explicitly removed.
/// Each frame the runner calls `rebuild_buffer` to project them through the
/// camera into the flat wire format read by the renderer's lighting pass.

use glam::Vec3;
use crate::renderer::camera::PerspectiveCamera;

/// Floats per serialized light:
/// `[screen_x, screen_y, depth, r, g, b, intensity, range_px]`.
pub const LIGHT_FLOATS: usize = 8;

/// A point light in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub pos: Vec3,
    /// RGB color (typically [0..1] but can exceed 1.0 for HDR).
    pub color: [f32; 3],
    pub intensity: f32,
    /// Falloff distance in world units (0 = infinite).
    pub range: f32,
}

impl PointLight {
    pub fn new(pos: Vec3, color: [f32; 3], intensity: f32, range: f32) -> Self {
        Self { pos, color, intensity, range }
    }

    /// From a packed 0xRRGGBB colour.
    pub fn hex(pos: Vec3, rgb: u32, intensity: f32, range: f32) -> Self {
        let color = [
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
        ];
        Self::new(pos, color, intensity, range)
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }
}

/// Manages active lights and ambient color for the scene.
///
/// The ambient color defaults to (1.0, 1.0, 1.0), which produces unlit output
/// when no lights are present.
pub struct LightState {
    lights: Vec<PointLight>,
    ambient: [f32; 3],
    max_lights: usize,
    /// Projected wire data, rebuilt each frame.
    buffer: Vec<f32>,
}

impl LightState {
    pub fn new() -> Self {
        Self::with_capacity(8)
    }

    pub fn with_capacity(max_lights: usize) -> Self {
        Self {
            lights: Vec::with_capacity(max_lights),
            ambient: [1.0, 1.0, 1.0],
            max_lights,
            buffer: Vec::with_capacity(max_lights * LIGHT_FLOATS),
        }
    }

    /// Add a point light. Lights past capacity are ignored.
    pub fn add(&mut self, light: PointLight) {
        if self.lights.len() >= self.max_lights {
            log::warn!("lighting: capacity {} reached, light ignored", self.max_lights);
            return;
        }
        self.lights.push(light);
    }

    /// Remove all lights and reset the ambient colour.
    pub fn clear(&mut self) {
        self.lights.clear();
        self.buffer.clear();
        self.ambient = [1.0, 1.0, 1.0];
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointLight> {
        self.lights.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PointLight> {
        self.lights.iter_mut()
    }

    pub fn count(&self) -> usize {
        self.lights.len()
    }

    /// Set the ambient light color. A dark space scene wants something like 0x222222.
    pub fn set_ambient(&mut self, r: f32, g: f32, b: f32) {
        self.ambient = [r, g, b];
    }

    pub fn ambient(&self) -> [f32; 3] {
        self.ambient
    }

    /// Project lights to screen space. Lights behind the camera are skipped.
    pub fn rebuild_buffer(&mut self, camera: &PerspectiveCamera) {
        self.buffer.clear();
        let projector = camera.projector();
        for light in &self.lights {
            let Some(p) = projector.project(light.pos) else { continue };
            self.buffer.extend_from_slice(&[
                p.pos.x,
                p.pos.y,
                p.depth,
                light.color[0],
                light.color[1],
                light.color[2],
                light.intensity,
                light.range * p.scale,
            ]);
        }
    }

    /// Lights written by the last `rebuild_buffer`.
    pub fn buffer_count(&self) -> usize {
        self.buffer.len() / LIGHT_FLOATS
    }

    pub fn max_lights(&self) -> usize {
        self.max_lights
    }

    /// Pointer to the projected light data for SAB serialization.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_light_color() {
        let light = PointLight::hex(Vec3::new(0.0, 10.0, 0.0), 0xFFD700, 30000.0, 400.0);
        assert_eq!(light.color[0], 1.0);
        assert!((light.color[1] - 215.0 / 255.0).abs() < 1e-6);
        assert_eq!(light.color[2], 0.0);
    }

    #[test]
    fn add_respects_capacity() {
        let mut state = LightState::with_capacity(1);
        state.add(PointLight::new(Vec3::ZERO, [1.0; 3], 1.0, 50.0));
        state.add(PointLight::new(Vec3::ONE, [1.0; 3], 1.0, 50.0));
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn clear_resets_ambient() {
        let mut state = LightState::new();
        state.set_ambient(0.13, 0.13, 0.13);
        state.add(PointLight::new(Vec3::ZERO, [1.0; 3], 1.0, 50.0));
        state.clear();
        assert_eq!(state.count(), 0);
        assert_eq!(state.ambient(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn rebuild_projects_visible_lights() {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        cam.look_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO);

        let mut state = LightState::new();
        state.add(PointLight::new(Vec3::ZERO, [1.0; 3], 50000.0, 500.0));
        state.add(PointLight::new(Vec3::new(0.0, 0.0, 150.0), [1.0; 3], 1.0, 1.0));
        state.rebuild_buffer(&cam);

        assert_eq!(state.buffer_count(), 1);
        let data = unsafe { std::slice::from_raw_parts(state.buffer_ptr(), LIGHT_FLOATS) };
        assert!((data[0] - 400.0).abs() < 1e-2);
        assert!((data[1] - 300.0).abs() < 1e-2);
        assert!((data[2] - 100.0).abs() < 1e-2);
        assert_eq!(data[6], 50000.0);
    }
}
