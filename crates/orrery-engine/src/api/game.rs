use serde::Deserialize;
use crate::core::scene::Scene;
use crate::api::types::{EntityId, GameEvent};
use crate::input::queue::InputQueue;
use crate::renderer::camera::PerspectiveCamera;
use crate::systems::lighting::LightState;
#[cfg(feature = "vectors")]
use crate::systems::vector::VectorState;

/// Configuration for the engine, provided by the game.
/// Deserializable so a host can override capacities; missing fields keep defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Initial viewport width in pixels (replaced by resize events).
    pub viewport_width: f32,
    /// Initial viewport height in pixels.
    pub viewport_height: f32,
    /// Maximum number of SDF instances (default: 1024).
    pub max_sdf_instances: usize,
    /// Maximum number of vector vertices (default: 65536).
    pub max_vector_vertices: usize,
    /// Maximum number of point lights (default: 8).
    pub max_lights: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            max_sdf_instances: 1024,
            max_vector_vertices: 65536,
            max_lights: 8,
            max_events: 32,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Apply a JSON configuration document.
    /// The runner rebuilds the scene (via `init`) when this succeeds after init.
    fn configure(&mut self, _json: &str) -> Result<(), serde_json::Error> {
        Ok(())
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed step. Advance the simulation and react to input.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// Read-only pass after all steps of a tick: vector drawing and per-frame UI events.
    fn render(&self, _ctx: &mut RenderContext) {}

    /// JSON payload describing whatever the UI should inspect right now.
    fn inspect(&self) -> Option<String> {
        None
    }
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub lights: LightState,
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_config(&GameConfig::default())
    }

    /// Create a context sized and shaped by a GameConfig.
    pub fn with_config(config: &GameConfig) -> Self {
        Self {
            scene: Scene::with_capacity(config.max_sdf_instances),
            camera: PerspectiveCamera::new(config.viewport_width, config.viewport_height),
            lights: LightState::with_capacity(config.max_lights),
            events: Vec::with_capacity(config.max_events),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a game event to be forwarded to the UI layer.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }

    /// Drop every entity and light so `Game::init` can rebuild from scratch.
    /// The camera viewport survives; its pose is left for the game to set.
    pub fn reset(&mut self) {
        self.scene.clear();
        self.lights.clear();
        self.events.clear();
        self.next_id = 1;
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Render context for the read-only render pass.
pub struct RenderContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub events: &'a mut Vec<GameEvent>,
    #[cfg(feature = "vectors")]
    pub vectors: &'a mut VectorState,
}

impl RenderContext<'_> {
    /// Emit a game event from the render pass.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;

    #[test]
    fn ids_are_unique_and_restart_after_reset() {
        let mut ctx = EngineContext::new();
        let a = ctx.next_id();
        let b = ctx.next_id();
        assert_ne!(a, b);

        ctx.scene.spawn(Entity::new(a));
        ctx.reset();
        assert!(ctx.scene.is_empty());
        assert_eq!(ctx.next_id(), EntityId(1));
    }

    #[test]
    fn reset_keeps_viewport() {
        let mut ctx = EngineContext::new();
        ctx.camera.set_viewport(640.0, 480.0);
        ctx.reset();
        assert_eq!(ctx.camera.viewport_width, 640.0);
        assert_eq!(ctx.camera.viewport_height, 480.0);
    }

    #[test]
    fn config_json_keeps_defaults_for_missing_fields() {
        let config: GameConfig = serde_json::from_str(r#"{ "max_sdf_instances": 2048 }"#).unwrap();
        assert_eq!(config.max_sdf_instances, 2048);
        assert_eq!(config.max_lights, GameConfig::default().max_lights);
    }

    #[test]
    fn clear_frame_data_drops_events() {
        let mut ctx = EngineContext::new();
        ctx.emit_event(GameEvent::new(1.0, 0.0, 0.0, 0.0));
        ctx.clear_frame_data();
        assert!(ctx.events.is_empty());
    }
}
