//! Solar System: a 3D orrery with moons, rings, a space station, an asteroid
//! belt and a starfield.
//!
//! Bodies live in a `TransformGraph` so moons and the station inherit their
//! planet's orbit, spin and scale. Every rate is per frame and scaled by the
//! time-scale slider.

use std::f32::consts::TAU;
use glam::{Vec2, Vec3};
use serde::Deserialize;
use orrery_engine::*;

use crate::bodies::{
    self, BodyIndex, PlanetDesc, AMBIENT_COLOR, ATMOSPHERE_SCALE, MOON_EMISSIVE, PLANETS,
    STATION_HOST, SUN_COLOR, SUN_EMISSIVE, SUN_FILL_HEIGHT, SUN_FILL_LIGHT, SUN_GLOW_COLOR,
    SUN_GLOW_OPACITY, SUN_GLOW_RADIUS, SUN_LIGHT, SUN_NAME, SUN_PULSE_AMPLITUDE,
    SUN_PULSE_RATE, SUN_RADIUS, SUN_SPIN,
};
use crate::camera_rig::CameraRig;
use crate::facts::FactRegistry;
use crate::orbit::{CircularOrbit, Spin};
use crate::scenery::{self, AsteroidBelt, OrbitPath, Starfield, Station};
use crate::ui::{self, ClickTracker, UiCommand, UiState};

// ── Buffer sizing ────────────────────────────────────────────────────

const MAX_SDF_INSTANCES: usize = 1024;
/// Stars alone take six vertices each.
const MAX_VECTOR_VERTICES: usize = 131_072;
/// SDF slots kept free of asteroids for the sun, planets, moons and station.
const RESERVED_SDF_INSTANCES: usize = 64;
/// Share of the vector buffer the starfield may use (1 / n).
const STAR_BUDGET_DIVISOR: usize = 2;

// ── Scene configuration ──────────────────────────────────────────────

/// Host-tunable scene settings, delivered as JSON through `game_load_config`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub seed: u64,
    pub star_count: usize,
    pub asteroid_count: usize,
    pub initial_time_scale: f32,
    pub show_orbits: bool,
    pub realistic_scale: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            star_count: 10_000,
            asteroid_count: 500,
            initial_time_scale: 1.0,
            show_orbits: true,
            realistic_scale: false,
        }
    }
}

impl SceneConfig {
    /// Clamp counts to what the engine buffers can hold.
    pub fn clamped(mut self, engine: &GameConfig) -> Self {
        let max_stars = engine.max_vector_vertices / (6 * STAR_BUDGET_DIVISOR);
        if self.star_count > max_stars {
            log::warn!("config: star_count {} clamped to {}", self.star_count, max_stars);
            self.star_count = max_stars;
        }
        let max_asteroids = engine.max_sdf_instances.saturating_sub(RESERVED_SDF_INSTANCES);
        if self.asteroid_count > max_asteroids {
            log::warn!("config: asteroid_count {} clamped to {}", self.asteroid_count, max_asteroids);
            self.asteroid_count = max_asteroids;
        }
        if !self.initial_time_scale.is_finite() {
            self.initial_time_scale = 1.0;
        }
        self
    }
}

// ── Game state ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct PlanetBody {
    desc: &'static PlanetDesc,
    entity: EntityId,
    orbit: CircularOrbit,
    spin: Spin,
    /// (pivot entity, pivot spin) per moon.
    moons: Vec<(EntityId, Spin)>,
}

pub struct SolarSystem {
    config: SceneConfig,
    facts: FactRegistry,
    clock: SimClock,
    rig: CameraRig,
    ui: UiState,
    pointer: ClickTracker,
    graph: TransformGraph,
    /// Entity per body index (0 = Sun).
    bodies: Vec<EntityId>,
    sun_spin: Spin,
    sun_glow: Option<EntityId>,
    planets: Vec<PlanetBody>,
    station: Option<Station>,
    belt: AsteroidBelt,
    stars: Starfield,
    orbits: Vec<OrbitPath>,
}

impl SolarSystem {
    pub fn new() -> Self {
        let facts = FactRegistry::load().unwrap_or_else(|e| {
            log::warn!("fact table unreadable, info panel disabled: {}", e);
            FactRegistry::default()
        });
        Self {
            config: SceneConfig::default(),
            facts,
            clock: SimClock::default(),
            rig: CameraRig::new(),
            ui: UiState::default(),
            pointer: ClickTracker::default(),
            graph: TransformGraph::new(),
            bodies: Vec::new(),
            sun_spin: Spin::new(SUN_SPIN),
            sun_glow: None,
            planets: Vec::new(),
            station: None,
            belt: AsteroidBelt::default(),
            stars: Starfield::default(),
            orbits: Vec::new(),
        }
    }

    fn planet_scale(desc: &PlanetDesc, realistic: bool) -> f32 {
        if realistic { desc.realistic_scale } else { 1.0 }
    }

    // ── Setup ────────────────────────────────────────────────────────

    fn setup_lights(ctx: &mut EngineContext) {
        let ambient = SDFColor::hex(AMBIENT_COLOR);
        ctx.lights.set_ambient(ambient.r, ambient.g, ambient.b);
        let (rgb, intensity, range) = SUN_LIGHT;
        ctx.lights.add(PointLight::hex(Vec3::ZERO, rgb, intensity, range));
        let (rgb, intensity, range) = SUN_FILL_LIGHT;
        ctx.lights.add(PointLight::hex(Vec3::new(0.0, SUN_FILL_HEIGHT, 0.0), rgb, intensity, range));
    }

    fn spawn_sun(&mut self, ctx: &mut EngineContext) {
        let sun = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(sun)
                .with_tag(SUN_NAME)
                .with_mesh(
                    MeshComponent::sphere(SUN_RADIUS, SDFColor::hex(SUN_COLOR))
                        .with_emissive(SUN_EMISSIVE),
                )
                .pickable(),
        );
        self.graph.register(sun);

        let glow = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(glow)
                .with_tag("sun-glow")
                .with_mesh(
                    MeshComponent::sphere(SUN_GLOW_RADIUS, SDFColor::hex(SUN_GLOW_COLOR))
                        .with_emissive(1.0)
                        .with_opacity(SUN_GLOW_OPACITY)
                        .as_shell(),
                )
                .pickable(),
        );
        self.graph.attach(glow, sun, LocalTransform::new());

        self.bodies.push(sun);
        self.sun_glow = Some(glow);
        self.sun_spin = Spin::new(SUN_SPIN);
    }

    fn spawn_planet(&mut self, ctx: &mut EngineContext, desc: &'static PlanetDesc, rng: &mut Rng) {
        let orbit = CircularOrbit::new(desc.orbit_radius, rng.range(0.0, TAU), desc.orbit_speed);
        let entity = ctx.next_id();
        ctx.scene.spawn(
            Entity::new(entity)
                .with_tag(desc.name)
                .with_mesh(
                    MeshComponent::sphere(desc.size, SDFColor::hex(desc.color))
                        .with_shininess(desc.shininess),
                )
                .pickable(),
        );
        self.graph.register_with(
            entity,
            LocalTransform::new()
                .with_offset(orbit.position())
                .with_scale(Self::planet_scale(desc, self.ui.realistic_scale)),
        );

        if let Some(atmosphere) = desc.atmosphere {
            let shell = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(shell)
                    .with_tag("atmosphere")
                    .with_mesh(
                        MeshComponent::sphere(desc.size * ATMOSPHERE_SCALE, SDFColor::hex(atmosphere.color))
                            .with_opacity(atmosphere.opacity)
                            .as_shell(),
                    )
                    .pickable(),
            );
            self.graph.attach(shell, entity, LocalTransform::new());
        }

        let mut moons = Vec::with_capacity(desc.moons.len());
        for moon in desc.moons {
            let pivot = ctx.next_id();
            ctx.scene.spawn(Entity::new(pivot).with_tag("moon-pivot"));
            self.graph.attach(pivot, entity, LocalTransform::new());

            let body = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(body)
                    .with_tag("moon")
                    .with_mesh(
                        MeshComponent::sphere(moon.size, SDFColor::hex(moon.color))
                            .with_emissive(MOON_EMISSIVE),
                    )
                    .pickable(),
            );
            self.graph.attach(
                body,
                pivot,
                LocalTransform::new().with_offset(Vec3::new(moon.distance, 0.0, 0.0)),
            );
            moons.push((pivot, Spin::new(moon.speed)));
        }

        self.bodies.push(entity);
        self.planets.push(PlanetBody {
            desc,
            entity,
            orbit,
            spin: Spin::new(desc.spin_speed),
            moons,
        });
    }

    // ── Simulation ───────────────────────────────────────────────────

    fn animate(&mut self, time_scale: f32) {
        self.sun_spin.advance(time_scale);
        if let Some(&sun) = self.bodies.first() {
            if let Some(local) = self.graph.get_local_mut(sun) {
                local.rotation = self.sun_spin.rotation();
            }
        }
        if let Some(glow) = self.sun_glow {
            let pulse = 1.0 + (self.clock.elapsed() * SUN_PULSE_RATE).sin() as f32 * SUN_PULSE_AMPLITUDE;
            if let Some(local) = self.graph.get_local_mut(glow) {
                local.scale = pulse;
            }
        }

        for planet in &mut self.planets {
            planet.orbit.advance(time_scale);
            planet.spin.advance(time_scale);
            if let Some(local) = self.graph.get_local_mut(planet.entity) {
                local.offset = planet.orbit.position();
                local.rotation = planet.spin.rotation();
            }
            for (pivot, spin) in &mut planet.moons {
                spin.advance(time_scale);
                if let Some(local) = self.graph.get_local_mut(*pivot) {
                    local.rotation = spin.rotation();
                }
            }
        }

        if let Some(station) = &mut self.station {
            station.advance(&mut self.graph, time_scale);
        }
    }

    fn apply_planet_scale(&mut self) {
        let realistic = self.ui.realistic_scale;
        for planet in &self.planets {
            if let Some(local) = self.graph.get_local_mut(planet.entity) {
                local.scale = Self::planet_scale(planet.desc, realistic);
            }
        }
    }

    /// Current world position of a body, from the hierarchy's locals.
    fn body_position(&self, body: BodyIndex) -> Option<Vec3> {
        let id = *self.bodies.get(body)?;
        self.graph.world_transform(id).map(|w| w.pos)
    }

    // ── Input ────────────────────────────────────────────────────────

    fn handle_input(&mut self, ctx: &mut EngineContext, event: &InputEvent) {
        match *event {
            InputEvent::Custom { kind, a, b, .. } => {
                if let Some(command) = UiCommand::from_custom(kind, a, b) {
                    self.apply(ctx, command);
                }
            }
            InputEvent::PointerDown { x, y } => self.pointer.down(Vec2::new(x, y)),
            InputEvent::PointerMove { x, y } => {
                if let Some(delta) = self.pointer.moved(Vec2::new(x, y)) {
                    self.rig.rotate(delta, ctx.camera.viewport_height);
                }
            }
            InputEvent::PointerUp { x, y } => {
                if let Some(pos) = self.pointer.up(Vec2::new(x, y)) {
                    self.click(ctx, pos);
                }
            }
            InputEvent::Wheel { delta } => {
                if delta != 0.0 {
                    self.rig.zoom(delta);
                }
            }
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => {}
        }
    }

    fn apply(&mut self, ctx: &mut EngineContext, command: UiCommand) {
        match command {
            UiCommand::SetTimeScale(scale) => self.clock.set_time_scale(scale),
            UiCommand::TogglePause => {
                let paused = self.clock.toggle_pause();
                log::debug!("paused: {}", paused);
            }
            UiCommand::ResetView => self.rig.reset_view(&mut ctx.camera),
            UiCommand::ShowOrbits(on) => self.ui.show_orbits = on,
            UiCommand::RealisticScale(on) => {
                self.ui.realistic_scale = on;
                self.apply_planet_scale();
            }
            UiCommand::CameraMode(mode) => self.rig.set_mode(mode, &mut ctx.camera),
            UiCommand::Focus(body) => match self.body_position(body) {
                Some(pos) => self.rig.lock_on(body, pos, &mut ctx.camera),
                None => log::warn!("focus: body {} is not in the scene", body),
            },
            UiCommand::Unlock => self.rig.unlock(&mut ctx.camera),
            UiCommand::Zoom(notches) => self.rig.zoom(notches),
            UiCommand::Resize { width, height } => ctx.camera.set_viewport(width, height),
        }
    }

    fn click(&mut self, ctx: &mut EngineContext, screen: Vec2) {
        let ray = ctx.camera.ray_through(screen);
        match self.pick_body(&ctx.scene, &ray) {
            Some(body) => {
                self.ui.selected = Some(body);
                log::debug!("selected {}", bodies::body_name(body).unwrap_or("?"));
            }
            None => {
                self.ui.selected = None;
                if self.rig.is_locked() {
                    self.rig.unlock(&mut ctx.camera);
                }
            }
        }
    }

    /// Body owning an entity: the entity itself or its nearest body ancestor.
    fn owner_of(&self, id: EntityId) -> Option<BodyIndex> {
        std::iter::once(id)
            .chain(self.graph.ancestors(id))
            .find_map(|e| self.bodies.iter().position(|&b| b == e))
    }

    /// Nearest body under the ray, counting ring annuli as part of their planet.
    fn pick_body(&self, scene: &Scene, ray: &Ray) -> Option<BodyIndex> {
        let mut best = pick(scene, ray)
            .and_then(|hit| self.owner_of(hit.id).map(|body| (hit.distance, body)));

        for (i, planet) in self.planets.iter().enumerate() {
            let (Some(ring), Some(entity)) = (planet.desc.ring, scene.get(planet.entity)) else {
                continue;
            };
            let (inner, outer) = ring.extent();
            let normal = scenery::ring_normal(entity.rotation, ring.tilt);
            let Some(t) = ray.intersect_annulus(entity.pos, normal, inner * entity.scale, outer * entity.scale)
            else {
                continue;
            };
            if best.map_or(true, |(d, _)| t < d) {
                best = Some((t, i + 1));
            }
        }

        best.map(|(_, body)| body)
    }
}

impl Default for SolarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SolarSystem {
    fn config(&self) -> GameConfig {
        GameConfig {
            max_sdf_instances: MAX_SDF_INSTANCES,
            max_vector_vertices: MAX_VECTOR_VERTICES,
            ..GameConfig::default()
        }
    }

    fn configure(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let parsed: SceneConfig = serde_json::from_str(json)?;
        self.config = parsed.clamped(&self.config());
        log::info!("solar-system: config {:?}", self.config);
        Ok(())
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        let mut rng = Rng::new(self.config.seed);

        self.graph.clear();
        self.bodies.clear();
        self.planets.clear();
        self.station = None;
        self.sun_glow = None;
        self.clock = SimClock::new(self.config.initial_time_scale);
        self.ui = UiState {
            selected: None,
            show_orbits: self.config.show_orbits,
            realistic_scale: self.config.realistic_scale,
        };
        self.pointer = ClickTracker::default();
        self.rig = CameraRig::new();
        self.rig.reset_view(&mut ctx.camera);

        Self::setup_lights(ctx);
        self.spawn_sun(ctx);
        for desc in PLANETS.iter() {
            self.spawn_planet(ctx, desc, &mut rng);
        }
        match bodies::body_index(STATION_HOST).and_then(|i| self.bodies.get(i).copied()) {
            Some(host) => self.station = Some(Station::spawn(ctx, &mut self.graph, host)),
            None => log::warn!("station host {} is not in the scene", STATION_HOST),
        }
        self.stars = Starfield::generate(&mut rng, self.config.star_count);
        self.belt = AsteroidBelt::spawn(ctx, &mut rng, self.config.asteroid_count);
        self.orbits = PLANETS
            .iter()
            .map(|p| OrbitPath::new(p.orbit_radius, p.orbit_color))
            .collect();

        self.graph.propagate(&mut ctx.scene);
        log::info!(
            "solar-system: {} entities, {} stars, {} asteroids",
            ctx.scene.len(),
            self.stars.len(),
            self.belt.len()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter() {
            self.handle_input(ctx, event);
        }

        if self.clock.advance() {
            let time_scale = self.clock.time_scale();
            self.animate(time_scale);
            self.belt.advance(&mut ctx.scene, time_scale);

            let graph = &self.graph;
            let bodies = &self.bodies;
            self.rig.advance(&mut ctx.camera, time_scale, |body| {
                bodies
                    .get(body)
                    .and_then(|&id| graph.world_transform(id))
                    .map(|w| w.pos)
            });
        }

        self.graph.propagate(&mut ctx.scene);
        self.rig.update_controls(&mut ctx.camera);
    }

    fn render(&self, ctx: &mut RenderContext) {
        let scene = ctx.scene;
        let projector = ctx.camera.projector();
        let viewport = Vec2::new(ctx.camera.viewport_width, ctx.camera.viewport_height);

        {
            let vectors = &mut *ctx.vectors;
            vectors.set_pass(VectorPass::Back);
            self.stars.draw(vectors, &projector, viewport);
            if self.ui.show_orbits {
                for path in &self.orbits {
                    path.draw(vectors, &projector);
                }
            }
            for planet in &self.planets {
                if let (Some(ring), Some(entity)) = (planet.desc.ring.as_ref(), scene.get(planet.entity)) {
                    scenery::draw_ring(vectors, &projector, entity, ring);
                }
            }
        }

        ctx.emit_event(ui::time_event(self.clock.time_scale(), self.clock.paused(), self.rig.mode()));
        ctx.emit_event(ui::selection_event(self.ui.selected, self.rig.focus()));
        ctx.emit_event(ui::display_event(&self.ui));

        for (body, &id) in self.bodies.iter().enumerate() {
            let Some(entity) = scene.get(id) else { continue };
            let anchor = entity.pos + Vec3::Y * (bodies::label_height(body) * entity.scale);
            if let Some(p) = projector.project(anchor) {
                ctx.emit_event(ui::label_event(body, p.pos));
            }
        }
    }

    fn inspect(&self) -> Option<String> {
        let body = self.ui.selected?;
        ui::info_panel_json(body, &self.facts, self.rig.focus() == Some(body))
    }
}
