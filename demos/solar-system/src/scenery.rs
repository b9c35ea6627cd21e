//! Background and decoration: starfield, asteroid belt, the space station,
//! planetary rings and orbit paths.
//!
//! Stars, rings and orbit paths are vector geometry projected every frame.
//! Asteroids and the station are SDF entities.

use std::f32::consts::{PI, TAU};
use glam::{Quat, Vec2, Vec3};
use orrery_engine::{
    EngineContext, Entity, EntityId, LocalTransform, MeshComponent, Projector, Rng, SDFColor,
    Scene, TransformGraph, VectorColor, VectorPass, VectorState,
};

use crate::bodies::{
    RingDesc, GLOW_RING_COLOR, GLOW_RING_OPACITY, GLOW_RING_PAD, STATION_HULL_COLOR,
    STATION_HULL_LENGTH, STATION_HULL_RADIUS, STATION_OFFSET, STATION_PANEL_COLOR,
    STATION_PANEL_LENGTH, STATION_PANEL_OFFSET, STATION_PANEL_RADIUS, STATION_SCALE,
    STATION_SPIN,
};
use crate::orbit::{CircularOrbit, Spin};

// ── Starfield ────────────────────────────────────────────────────────

/// Side of the cube the stars fill, centred on the origin.
pub const STAR_EXTENT: f32 = 2000.0;
/// Star size in world units; on screen it shrinks with distance.
pub const STAR_SIZE: f32 = 2.0;
pub const STAR_MIN_PX: f32 = 0.5;
pub const STAR_MAX_PX: f32 = 6.0;
pub const STAR_OPACITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Vec3,
    pub color: VectorColor,
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub fn generate(rng: &mut Rng, count: usize) -> Self {
        let half = STAR_EXTENT * 0.5;
        let stars = (0..count)
            .map(|_| {
                let pos = Vec3::new(
                    rng.range(-half, half),
                    rng.range(-half, half),
                    rng.range(-half, half),
                );
                let hue = rng.range(0.5, 0.7);
                let lightness = rng.range(0.5, 1.0);
                let color = VectorColor::hsl(hue, 0.5, lightness).with_alpha(STAR_OPACITY);
                Star { pos, color }
            })
            .collect();
        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }

    /// Draw the stars that land inside the viewport.
    pub fn draw(&self, vectors: &mut VectorState, projector: &Projector, viewport: Vec2) {
        let margin = STAR_MAX_PX;
        for star in &self.stars {
            let Some(p) = projector.project(star.pos) else { continue };
            if p.pos.x < -margin
                || p.pos.y < -margin
                || p.pos.x > viewport.x + margin
                || p.pos.y > viewport.y + margin
            {
                continue;
            }
            vectors.fill_square(p.pos, star_size_px(p.scale), star.color);
        }
    }
}

/// On-screen size of a star at `scale` pixels per world unit.
pub fn star_size_px(scale: f32) -> f32 {
    (STAR_SIZE * scale).clamp(STAR_MIN_PX, STAR_MAX_PX)
}

// ── Asteroid belt ────────────────────────────────────────────────────

pub const BELT_INNER: f32 = 85.0;
pub const BELT_OUTER: f32 = 95.0;
pub const BELT_THICKNESS: f32 = 5.0;
pub const ASTEROID_BASE_SIZE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Asteroid {
    pub entity: EntityId,
    pub orbit: CircularOrbit,
    pub spin: Spin,
    /// Fixed tumble about X, applied before the spin.
    pub tilt: Quat,
}

impl Asteroid {
    pub fn rotation(&self) -> Quat {
        self.tilt * self.spin.rotation()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AsteroidBelt {
    rocks: Vec<Asteroid>,
}

impl AsteroidBelt {
    /// Spawn `count` rocks as plain SDF entities. They are not pickable.
    pub fn spawn(ctx: &mut EngineContext, rng: &mut Rng, count: usize) -> Self {
        let mut rocks = Vec::with_capacity(count);
        for _ in 0..count {
            let angle = rng.range(0.0, TAU);
            let radius = rng.range(BELT_INNER, BELT_OUTER);
            let height = rng.range(-BELT_THICKNESS * 0.5, BELT_THICKNESS * 0.5);
            let scale = rng.range(0.5, 1.0);
            let color = SDFColor::new(rng.range(0.5, 1.0), rng.range(0.5, 1.0), rng.range(0.5, 1.0));
            let tilt = Quat::from_rotation_x(rng.range(0.0, PI));
            let spin_angle = rng.range(0.0, PI);
            let orbit_speed = rng.range(0.0005, 0.0015);
            let spin_speed = rng.range(0.0, 0.01);

            let orbit = CircularOrbit::new(radius, angle, orbit_speed).with_height(height);
            let spin = Spin::new(spin_speed).with_angle(spin_angle);

            let id = ctx.next_id();
            let rock = Asteroid { entity: id, orbit, spin, tilt };
            ctx.scene.spawn(
                Entity::new(id)
                    .with_tag("asteroid")
                    .with_pos(orbit.position())
                    .with_rotation(rock.rotation())
                    .with_scale(scale)
                    .with_mesh(MeshComponent::sphere(ASTEROID_BASE_SIZE, color).with_shininess(4.0)),
            );
            rocks.push(rock);
        }
        Self { rocks }
    }

    /// Move every rock along its orbit and spin it in place.
    pub fn advance(&mut self, scene: &mut Scene, time_scale: f32) {
        for rock in &mut self.rocks {
            rock.orbit.advance(time_scale);
            rock.spin.advance(time_scale);
            if let Some(entity) = scene.get_mut(rock.entity) {
                entity.pos = rock.orbit.position();
                entity.rotation = rock.rotation();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asteroid> {
        self.rocks.iter()
    }
}

// ── Space station ────────────────────────────────────────────────────

/// A spinning group (hull plus two panels) parented to a planet.
#[derive(Debug, Clone)]
pub struct Station {
    pub group: EntityId,
    pub parts: [EntityId; 3],
    spin: Spin,
}

impl Station {
    pub fn spawn(ctx: &mut EngineContext, graph: &mut TransformGraph, host: EntityId) -> Self {
        let group = ctx.next_id();
        ctx.scene.spawn(Entity::new(group).with_tag("station"));
        graph.attach(
            group,
            host,
            LocalTransform::new()
                .with_offset(Vec3::new(STATION_OFFSET, 0.0, 0.0))
                .with_scale(STATION_SCALE),
        );

        let hull = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(hull)
                .with_tag("station-hull")
                .with_mesh(MeshComponent::capsule(
                    STATION_HULL_RADIUS,
                    STATION_HULL_LENGTH * 0.5 - STATION_HULL_RADIUS,
                    Vec3::Y,
                    SDFColor::hex(STATION_HULL_COLOR),
                ))
                .pickable(),
        );
        graph.attach(hull, group, LocalTransform::new());

        let mut parts = [hull; 3];
        for (slot, side) in [-1.0f32, 1.0].into_iter().enumerate() {
            let panel = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(panel)
                    .with_tag("station-panel")
                    .with_mesh(MeshComponent::capsule(
                        STATION_PANEL_RADIUS,
                        STATION_PANEL_LENGTH * 0.5 - STATION_PANEL_RADIUS,
                        Vec3::X,
                        SDFColor::hex(STATION_PANEL_COLOR),
                    ))
                    .pickable(),
            );
            graph.attach(
                panel,
                group,
                LocalTransform::new().with_offset(Vec3::new(side * STATION_PANEL_OFFSET, 0.0, 0.0)),
            );
            parts[slot + 1] = panel;
        }

        Self { group, parts, spin: Spin::new(STATION_SPIN) }
    }

    pub fn advance(&mut self, graph: &mut TransformGraph, time_scale: f32) {
        self.spin.advance(time_scale);
        if let Some(local) = graph.get_local_mut(self.group) {
            local.rotation = self.spin.rotation();
        }
    }
}

// ── Rings ────────────────────────────────────────────────────────────

pub const RING_SEGMENTS: usize = 64;

/// Orientation of a ring: flat in the planet's equator (local XZ), with the
/// tilt turning it about its own normal.
pub fn ring_rotation(planet_rotation: Quat, tilt: f32) -> Quat {
    planet_rotation * Quat::from_rotation_y(tilt)
}

pub fn ring_normal(planet_rotation: Quat, tilt: f32) -> Vec3 {
    ring_rotation(planet_rotation, tilt) * Vec3::Y
}

struct Band {
    inner: f32,
    outer: f32,
    color: VectorColor,
}

fn bands(ring: &RingDesc) -> Vec<Band> {
    let mut out = Vec::with_capacity(2);
    if ring.glow {
        out.push(Band {
            inner: ring.inner - GLOW_RING_PAD,
            outer: ring.outer + GLOW_RING_PAD,
            color: VectorColor::hex(GLOW_RING_COLOR).with_alpha(GLOW_RING_OPACITY),
        });
    }
    out.push(Band {
        inner: ring.inner,
        outer: ring.outer,
        color: VectorColor::hex(ring.color).with_alpha(ring.opacity),
    });
    out
}

/// Draw a planet's ring as quads. Segments farther than the planet centre go in
/// the back pass, nearer ones in the front pass so they cross over the body.
pub fn draw_ring(vectors: &mut VectorState, projector: &Projector, planet: &Entity, ring: &RingDesc) {
    let Some(center) = projector.project(planet.pos) else { return };
    let rotation = ring_rotation(planet.rotation, ring.tilt);
    let u = rotation * Vec3::X;
    let v = rotation * Vec3::Z;
    let step = TAU / RING_SEGMENTS as f32;

    for band in bands(ring) {
        let inner = band.inner * planet.scale;
        let outer = band.outer * planet.scale;
        for i in 0..RING_SEGMENTS {
            let (a0, a1) = (i as f32 * step, (i + 1) as f32 * step);
            let d0 = u * a0.cos() + v * a0.sin();
            let d1 = u * a1.cos() + v * a1.sin();
            let corners = [
                planet.pos + d0 * outer,
                planet.pos + d1 * outer,
                planet.pos + d1 * inner,
                planet.pos + d0 * inner,
            ];
            let projected: Option<Vec<_>> = corners.iter().map(|c| projector.project(*c)).collect();
            let Some(projected) = projected else { continue };

            let depth = projected.iter().map(|p| p.depth).sum::<f32>() / 4.0;
            vectors.set_pass(if depth > center.depth { VectorPass::Back } else { VectorPass::Front });
            let quad: Vec<Vec2> = projected.iter().map(|p| p.pos).collect();
            vectors.fill_polygon(&quad, band.color);
        }
    }
}

// ── Orbit paths ──────────────────────────────────────────────────────

pub const ORBIT_SEGMENTS: usize = 200;
pub const ORBIT_OPACITY: f32 = 0.6;
pub const ORBIT_LINE_WIDTH: f32 = 1.0;

/// A planet's orbit circle, sampled once.
#[derive(Debug, Clone)]
pub struct OrbitPath {
    points: Vec<Vec3>,
    color: VectorColor,
}

impl OrbitPath {
    pub fn new(radius: f32, color: u32) -> Self {
        let points = (0..ORBIT_SEGMENTS)
            .map(|i| CircularOrbit::new(radius, i as f32 / ORBIT_SEGMENTS as f32 * TAU, 0.0).position())
            .collect();
        Self {
            points,
            color: VectorColor::hex(color).with_alpha(ORBIT_OPACITY),
        }
    }

    /// Stroke the projected circle. Arcs behind the camera break it into open runs.
    pub fn draw(&self, vectors: &mut VectorState, projector: &Projector) {
        let projected: Vec<Option<Vec2>> = self
            .points
            .iter()
            .map(|p| projector.project(*p).map(|pr| pr.pos))
            .collect();

        let Some(gap) = projected.iter().position(Option::is_none) else {
            let ring: Vec<Vec2> = projected.into_iter().flatten().collect();
            vectors.stroke_polygon(&ring, ORBIT_LINE_WIDTH, self.color);
            return;
        };

        // Walk once around starting just past a gap so no run wraps the seam.
        let n = projected.len();
        let mut run = Vec::new();
        for i in 1..=n {
            match projected[(gap + i) % n] {
                Some(p) => run.push(p),
                None => {
                    if run.len() >= 2 {
                        vectors.stroke_polyline(&run, ORBIT_LINE_WIDTH, self.color);
                    }
                    run.clear();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_engine::PerspectiveCamera;

    fn camera(position: Vec3) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        cam.look_at(position, Vec3::ZERO);
        cam
    }

    #[test]
    fn starfield_fills_the_cube() {
        let mut rng = Rng::new(7);
        let stars = Starfield::generate(&mut rng, 2000);
        assert_eq!(stars.len(), 2000);
        for star in stars.iter() {
            assert!(star.pos.abs().max_element() <= STAR_EXTENT * 0.5);
            assert_eq!(star.color.a, STAR_OPACITY);
            // Hues between cyan and blue: blue is never the weakest channel.
            assert!(star.color.b >= star.color.r - 1e-5);
        }
    }

    #[test]
    fn starfield_is_seeded() {
        let a = Starfield::generate(&mut Rng::new(3), 10);
        let b = Starfield::generate(&mut Rng::new(3), 10);
        let c = Starfield::generate(&mut Rng::new(4), 10);
        assert_eq!(a.stars, b.stars);
        assert_ne!(a.stars, c.stars);
    }

    #[test]
    fn stars_draw_as_squares() {
        let stars = Starfield {
            stars: vec![
                Star { pos: Vec3::ZERO, color: VectorColor::WHITE },
                // Behind the camera.
                Star { pos: Vec3::new(0.0, 0.0, 900.0), color: VectorColor::WHITE },
            ],
        };
        let mut vectors = VectorState::with_capacity(1024);
        stars.draw(&mut vectors, &camera(Vec3::new(0.0, 0.0, 100.0)).projector(), Vec2::new(800.0, 600.0));
        vectors.finish();
        assert_eq!(vectors.vertex_count(), 6);
    }

    #[test]
    fn stars_shrink_with_distance() {
        let projector = camera(Vec3::new(0.0, 0.0, 100.0)).projector();
        let near = projector.project(Vec3::new(0.0, 0.0, 50.0)).unwrap();
        let mid = projector.project(Vec3::new(0.0, 0.0, -400.0)).unwrap();
        let far = projector.project(Vec3::new(0.0, 0.0, -900.0)).unwrap();

        let (near_px, mid_px, far_px) =
            (star_size_px(near.scale), star_size_px(mid.scale), star_size_px(far.scale));
        assert!(near_px >= mid_px && mid_px > far_px);
        assert_eq!(near_px, STAR_MAX_PX);
        assert!(far_px >= STAR_MIN_PX);
        assert_eq!(star_size_px(0.0), STAR_MIN_PX);
    }

    #[test]
    fn belt_spawns_unpickable_rocks_in_range() {
        let mut ctx = EngineContext::new();
        let mut rng = Rng::new(11);
        let belt = AsteroidBelt::spawn(&mut ctx, &mut rng, 300);
        assert_eq!(belt.len(), 300);
        assert_eq!(ctx.scene.count_tagged("asteroid"), 300);

        for rock in belt.iter() {
            let entity = ctx.scene.get(rock.entity).unwrap();
            assert!(!entity.pickable);
            let flat = Vec2::new(entity.pos.x, entity.pos.z).length();
            assert!((BELT_INNER - 1e-3..BELT_OUTER + 1e-3).contains(&flat), "{flat}");
            assert!(entity.pos.y.abs() <= BELT_THICKNESS * 0.5);
            assert!((0.5..1.0).contains(&entity.scale));
        }
    }

    #[test]
    fn belt_advance_moves_rocks() {
        let mut ctx = EngineContext::new();
        let mut belt = AsteroidBelt::spawn(&mut ctx, &mut Rng::new(5), 20);
        let before: Vec<Vec3> = belt.iter().map(|r| ctx.scene.get(r.entity).unwrap().pos).collect();

        belt.advance(&mut ctx.scene, 0.0);
        for (rock, pos) in belt.iter().zip(&before) {
            assert!((ctx.scene.get(rock.entity).unwrap().pos - *pos).length() < 1e-4);
        }

        belt.advance(&mut ctx.scene, 10.0);
        let moved = belt
            .iter()
            .zip(&before)
            .filter(|(r, p)| (ctx.scene.get(r.entity).unwrap().pos - **p).length() > 1e-3)
            .count();
        assert_eq!(moved, 20);
    }

    #[test]
    fn station_follows_its_host() {
        let mut ctx = EngineContext::new();
        let mut graph = TransformGraph::new();
        let host = ctx.next_id();
        ctx.scene.spawn(Entity::new(host));
        graph.register_with(host, LocalTransform::new().with_offset(Vec3::new(62.0, 0.0, 0.0)).with_scale(2.0));

        let mut station = Station::spawn(&mut ctx, &mut graph, host);
        graph.propagate(&mut ctx.scene);

        let group = ctx.scene.get(station.group).unwrap();
        assert!((group.pos - Vec3::new(62.0 + STATION_OFFSET * 2.0, 0.0, 0.0)).length() < 1e-4);
        assert!((group.scale - STATION_SCALE * 2.0).abs() < 1e-6);
        assert!(station.parts.iter().all(|p| ctx.scene.get(*p).unwrap().pickable));

        // A quarter turn swings the +X panel onto −Z.
        station.spin = Spin::new(std::f32::consts::FRAC_PI_2);
        station.advance(&mut graph, 1.0);
        graph.propagate(&mut ctx.scene);
        let panel = ctx.scene.get(station.parts[2]).unwrap();
        let rel = panel.pos - ctx.scene.get(station.group).unwrap().pos;
        assert!(rel.x.abs() < 1e-3);
        assert!(rel.z < 0.0);
    }

    #[test]
    fn ring_stays_in_the_equator() {
        for spin in [0.0f32, 0.7, 2.5, 5.9] {
            let n = ring_normal(Quat::from_rotation_y(spin), 0.4);
            assert!((n - Vec3::Y).length() < 1e-5);
        }
        // The tilt turns the ring within its own plane.
        let edge = ring_rotation(Quat::IDENTITY, 0.4) * Vec3::X;
        assert!(edge.y.abs() < 1e-6);
        assert!((edge.x - 0.4f32.cos()).abs() < 1e-5);
    }

    #[test]
    fn ring_splits_across_passes() {
        let planet = Entity::new(EntityId(1)).with_pos(Vec3::ZERO);
        let ring = RingDesc { inner: 14.0, outer: 28.0, tilt: 0.4, color: 0xD8C69A, opacity: 0.8, glow: true };
        let mut vectors = VectorState::with_capacity(65536);
        draw_ring(&mut vectors, &camera(Vec3::new(0.0, 60.0, 120.0)).projector(), &planet, &ring);
        vectors.finish();
        assert!(vectors.split() > 0);
        assert!(vectors.vertex_count() > vectors.split());
    }

    #[test]
    fn orbit_path_closed_from_above() {
        let path = OrbitPath::new(62.0, 0x0080FF);
        assert_eq!(path.points.len(), ORBIT_SEGMENTS);
        assert!(path.points.iter().all(|p| (p.length() - 62.0).abs() < 1e-3));

        let mut vectors = VectorState::with_capacity(65536);
        path.draw(&mut vectors, &camera(Vec3::new(0.0, 300.0, 0.0)).projector());
        vectors.finish();
        assert!(vectors.vertex_count() > 0);
    }

    #[test]
    fn orbit_path_partly_behind_camera_still_draws() {
        let path = OrbitPath::new(100.0, 0xFFD700);
        let mut vectors = VectorState::with_capacity(65536);
        // Camera sits on the circle, so part of it is behind the near plane.
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        cam.look_at(Vec3::new(100.0, 1.0, 0.0), Vec3::new(-100.0, 0.0, 0.0));
        path.draw(&mut vectors, &cam.projector());
        vectors.finish();
        assert!(vectors.vertex_count() > 0);
    }
}
