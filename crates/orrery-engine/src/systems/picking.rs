//! Ray casting against scene meshes.
//!
//! The pointer ray comes from `PerspectiveCamera::ray_through`; hits are
//! measured along the (unit) ray direction so they compare across shapes.

use glam::Vec3;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::mesh::SDFShape;
use crate::core::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Nearest non-negative hit distance against a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let t0 = -b - sq;
        let t1 = -b + sq;
        if t0 >= 0.0 {
            Some(t0)
        } else if t1 >= 0.0 {
            Some(t1)
        } else {
            None
        }
    }

    /// Hit against the capsule swept from `a` to `b` with the given radius.
    pub fn intersect_capsule(&self, a: Vec3, b: Vec3, radius: f32) -> Option<f32> {
        let ba = b - a;
        let oa = self.origin - a;
        let baba = ba.dot(ba);
        let bard = ba.dot(self.dir);
        let baoa = ba.dot(oa);
        let rdoa = self.dir.dot(oa);
        let oaoa = oa.dot(oa);

        let qa = baba - bard * bard;
        let qb = baba * rdoa - baoa * bard;
        let qc = baba * oaoa - baoa * baoa - radius * radius * baba;
        let h = qb * qb - qa * qc;
        if h >= 0.0 && qa > f32::EPSILON {
            let t = (-qb - h.sqrt()) / qa;
            let y = baoa + t * bard;
            if t >= 0.0 && y > 0.0 && y < baba {
                return Some(t);
            }
        }

        // End caps.
        [a, b]
            .into_iter()
            .filter_map(|c| self.intersect_sphere(c, radius))
            .min_by(f32::total_cmp)
    }

    /// Hit against an infinite plane. `None` when parallel or behind the origin.
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f32> {
        let denom = normal.dot(self.dir);
        if denom.abs() < 1e-6 {
            return None;
        }
        let t = normal.dot(point - self.origin) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Hit against a flat ring centred at `center`, lying in the plane with `normal`.
    pub fn intersect_annulus(&self, center: Vec3, normal: Vec3, inner: f32, outer: f32) -> Option<f32> {
        let t = self.intersect_plane(center, normal)?;
        let r = self.at(t).distance(center);
        (r >= inner && r <= outer).then_some(t)
    }

    /// Hit distance against an entity's mesh in world space.
    pub fn intersect_entity(&self, entity: &Entity) -> Option<f32> {
        let mesh = entity.mesh.as_ref()?;
        match mesh.shape {
            SDFShape::Sphere { radius } => self.intersect_sphere(entity.pos, radius * entity.scale),
            SDFShape::Capsule { radius, half_height, axis } => {
                let half = entity.rotation * axis * (half_height * entity.scale);
                self.intersect_capsule(entity.pos - half, entity.pos + half, radius * entity.scale)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub id: EntityId,
    pub distance: f32,
}

/// Nearest active, pickable mesh entity along the ray.
pub fn pick(scene: &Scene, ray: &Ray) -> Option<PickHit> {
    pick_filtered(scene, ray, |e| e.pickable)
}

/// Nearest active mesh entity along the ray among those accepted by `filter`.
pub fn pick_filtered(scene: &Scene, ray: &Ray, filter: impl Fn(&Entity) -> bool) -> Option<PickHit> {
    scene
        .meshes()
        .filter(|(e, _)| filter(e))
        .filter_map(|(e, _)| ray.intersect_entity(e).map(|distance| PickHit { id: e.id, distance }))
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mesh::{MeshComponent, SDFColor};

    fn sphere(id: u32, pos: Vec3, radius: f32) -> Entity {
        Entity::new(EntityId(id))
            .with_pos(pos)
            .with_mesh(MeshComponent::sphere(radius, SDFColor::default()))
            .pickable()
    }

    #[test]
    fn sphere_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!((ray.intersect_sphere(Vec3::ZERO, 2.0).unwrap() - 8.0).abs() < 1e-5);
        assert!(ray.intersect_sphere(Vec3::new(5.0, 0.0, 0.0), 2.0).is_none());
        // Sphere behind the origin.
        assert!(ray.intersect_sphere(Vec3::new(0.0, 0.0, 20.0), 2.0).is_none());
    }

    #[test]
    fn capsule_hits_side_and_cap() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray.intersect_capsule(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.5);
        assert!((t.unwrap() - 9.5).abs() < 1e-4);

        let down = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        let t = down.intersect_capsule(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.5);
        assert!((t.unwrap() - 8.5).abs() < 1e-4);
    }

    #[test]
    fn annulus_rejects_the_hole() {
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y);
        assert!(ray.intersect_annulus(Vec3::ZERO, Vec3::Y, 1.0, 2.0).is_none());
        let off = Ray::new(Vec3::new(1.5, 10.0, 0.0), Vec3::NEG_Y);
        assert!((off.intersect_annulus(Vec3::ZERO, Vec3::Y, 1.0, 2.0).unwrap() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn pick_returns_nearest_pickable() {
        let mut scene = Scene::new();
        scene.spawn(sphere(1, Vec3::new(0.0, 0.0, -20.0), 3.0));
        scene.spawn(sphere(2, Vec3::new(0.0, 0.0, -5.0), 1.0));
        let mut rock = sphere(3, Vec3::new(0.0, 0.0, 0.0), 1.0);
        rock.pickable = false;
        scene.spawn(rock);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let hit = pick(&scene, &ray).unwrap();
        assert_eq!(hit.id, EntityId(2));
    }

    #[test]
    fn pick_misses_empty_space() {
        let mut scene = Scene::new();
        scene.spawn(sphere(1, Vec3::ZERO, 1.0));
        let ray = Ray::new(Vec3::new(10.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(pick(&scene, &ray).is_none());
    }
}
