//! Per-frame circular motion.
//!
//! Every rate is radians per frame at time scale 1; callers pass the current
//! time scale so a slider value of 2 doubles every speed.

use std::f32::consts::TAU;
use glam::{Quat, Vec3};

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Circle in the XZ plane around the origin of the parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularOrbit {
    pub radius: f32,
    /// Current angle in [0, 2π).
    pub angle: f32,
    pub angular_speed: f32,
    /// Constant Y offset (asteroids sit above or below the plane).
    pub height: f32,
}

impl CircularOrbit {
    pub fn new(radius: f32, angle: f32, angular_speed: f32) -> Self {
        Self {
            radius,
            angle: wrap_angle(angle),
            angular_speed,
            height: 0.0,
        }
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn advance(&mut self, time_scale: f32) {
        self.angle = wrap_angle(self.angle + self.angular_speed * time_scale);
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            self.height,
            self.angle.sin() * self.radius,
        )
    }
}

/// Self-rotation about +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin {
    pub angle: f32,
    pub speed: f32,
}

impl Spin {
    pub fn new(speed: f32) -> Self {
        Self { angle: 0.0, speed }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = wrap_angle(angle);
        self
    }

    pub fn advance(&mut self, time_scale: f32) {
        self.angle = wrap_angle(self.angle + self.speed * time_scale);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_close(a: f32, b: f32) -> bool {
        let d = (a - b).rem_euclid(TAU);
        d < 2e-3 || TAU - d < 2e-3
    }

    #[test]
    fn advance_accumulates_scaled_rate() {
        let mut orbit = CircularOrbit::new(62.0, 1.0, 0.01);
        for _ in 0..1000 {
            orbit.advance(2.5);
        }
        let expected = (1.0 + 0.01 * 2.5 * 1000.0f32).rem_euclid(TAU);
        assert!(angle_close(orbit.angle, expected), "{} vs {}", orbit.angle, expected);
        assert!(orbit.angle >= 0.0 && orbit.angle < TAU);
    }

    #[test]
    fn zero_time_scale_is_a_no_op() {
        let mut orbit = CircularOrbit::new(28.0, 0.3, 0.04);
        let before = orbit;
        for _ in 0..50 {
            orbit.advance(0.0);
        }
        assert_eq!(orbit, before);
    }

    #[test]
    fn position_lies_on_circle() {
        let orbit = CircularOrbit::new(100.0, 0.0, 0.002).with_height(-1.5);
        assert_eq!(orbit.position(), Vec3::new(100.0, -1.5, 0.0));

        let quarter = CircularOrbit::new(100.0, std::f32::consts::FRAC_PI_2, 0.0);
        let p = quarter.position();
        assert!(p.x.abs() < 1e-4);
        assert!((p.z - 100.0).abs() < 1e-4);
    }

    #[test]
    fn negative_start_angle_wraps() {
        let orbit = CircularOrbit::new(1.0, -0.5, 0.0);
        assert!(angle_close(orbit.angle, TAU - 0.5));
    }

    #[test]
    fn spin_rotates_about_y() {
        let mut spin = Spin::new(std::f32::consts::FRAC_PI_2);
        spin.advance(1.0);
        let x = spin.rotation() * Vec3::X;
        // +X turns toward −Z under a right-handed Y rotation.
        assert!((x - Vec3::NEG_Z).length() < 1e-5);
    }
}
