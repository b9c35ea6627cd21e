use orrery_engine::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, SDFBuffer,
    FixedTimestep, ProtocolLayout, FrameCounts, GameEvent,
    build_sdf_buffer,
};
use orrery_engine::bridge::protocol::HEADER_FLOATS;
#[cfg(feature = "vectors")]
use orrery_engine::VectorState;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game (e.g., `solar-system`) creates a `thread_local!` GameRunner
/// and exports free functions via `#[wasm_bindgen]`, because wasm-bindgen
/// cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    /// Stands in for the input queue on the second and later steps of a tick.
    no_input: InputQueue,
    sdf_buffer: SDFBuffer,
    #[cfg(feature = "vectors")]
    vectors: VectorState,
    timestep: FixedTimestep,
    config: GameConfig,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    frame: u64,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);

        Self {
            game,
            ctx: EngineContext::with_config(&config),
            input: InputQueue::new(),
            no_input: InputQueue::new(),
            sdf_buffer: SDFBuffer::with_capacity(config.max_sdf_instances),
            #[cfg(feature = "vectors")]
            vectors: VectorState::with_capacity(config.max_vector_vertices),
            timestep,
            layout,
            config,
            header: [0.0; HEADER_FLOATS],
            frame: 0,
            initialized: false,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
        self.render_frame();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame tick: fixed-step updates, then projection and the game's render pass.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.ctx.clear_frame_data();

        // Input is delivered to the first step only; with zero steps it waits for the next tick.
        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            let input = if step == 0 { &self.input } else { &self.no_input };
            self.game.update(&mut self.ctx, input);
        }
        if steps > 0 {
            self.input.drain();
        }

        self.render_frame();
    }

    /// Apply a JSON config. After init, a successful load rebuilds the scene.
    pub fn load_config(&mut self, json: &str) {
        match self.game.configure(json) {
            Ok(()) => {
                log::info!("config loaded");
                if self.initialized {
                    self.ctx.reset();
                    self.game.init(&mut self.ctx);
                    self.render_frame();
                }
            }
            Err(e) => log::warn!("config rejected, keeping current settings: {}", e),
        }
    }

    pub fn inspect_json(&self) -> Option<String> {
        self.game.inspect()
    }

    fn render_frame(&mut self) {
        build_sdf_buffer(&self.ctx.scene, &self.ctx.camera, &mut self.sdf_buffer);
        self.ctx.lights.rebuild_buffer(&self.ctx.camera);

        #[cfg(feature = "vectors")]
        self.vectors.clear();
        {
            let mut render_ctx = RenderContext {
                scene: &self.ctx.scene,
                camera: &self.ctx.camera,
                events: &mut self.ctx.events,
                #[cfg(feature = "vectors")]
                vectors: &mut self.vectors,
            };
            self.game.render(&mut render_ctx);
        }
        #[cfg(feature = "vectors")]
        self.vectors.finish();

        if self.ctx.events.len() > self.config.max_events {
            log::warn!(
                "{} game events this frame, keeping the first {}",
                self.ctx.events.len(),
                self.config.max_events
            );
            self.ctx.events.truncate(self.config.max_events);
        }

        self.frame += 1;
        let counts = FrameCounts {
            frame: self.frame,
            sdf_instances: self.sdf_buffer.instance_count(),
            vector_vertices: self.vector_vertex_count() as usize,
            vector_split: self.vector_split() as usize,
            lights: self.ctx.lights.buffer_count(),
            events: self.ctx.events.len(),
            ambient: self.ctx.lights.ambient(),
        };
        self.layout.write_header(&counts, &mut self.header);
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn header(&self) -> &[f32; HEADER_FLOATS] {
        &self.header
    }

    pub fn sdf_instances_ptr(&self) -> *const f32 {
        self.sdf_buffer.instances_ptr()
    }

    pub fn sdf_instance_count(&self) -> u32 {
        self.sdf_buffer.instance_count() as u32
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.vectors.buffer_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertex_count(&self) -> u32 {
        self.vectors.vertex_count() as u32
    }

    #[cfg(not(feature = "vectors"))]
    pub fn vector_vertex_count(&self) -> u32 {
        0
    }

    /// Vertices drawn behind the SDF bodies; the rest go in front.
    #[cfg(feature = "vectors")]
    pub fn vector_split(&self) -> u32 {
        self.vectors.split() as u32
    }

    #[cfg(not(feature = "vectors"))]
    pub fn vector_split(&self) -> u32 {
        0
    }

    pub fn lights_ptr(&self) -> *const f32 {
        self.ctx.lights.buffer_ptr()
    }

    pub fn light_count(&self) -> u32 {
        self.ctx.lights.buffer_count() as u32
    }

    pub fn ambient(&self) -> [f32; 3] {
        self.ctx.lights.ambient()
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    /// This frame's events flattened to `[kind, a, b, c, ...]`.
    pub fn game_events_flat(&self) -> &[f32] {
        GameEvent::as_floats(&self.ctx.events)
    }

    pub fn viewport(&self) -> (f32, f32) {
        (self.ctx.camera.viewport_width, self.ctx.camera.viewport_height)
    }

    // ---- Capacity accessors (read by TypeScript via wasm_bindgen exports) ----

    pub fn max_sdf_instances(&self) -> u32 {
        self.layout.max_sdf_instances as u32
    }

    pub fn max_vector_vertices(&self) -> u32 {
        self.layout.max_vector_vertices as u32
    }

    pub fn max_lights(&self) -> u32 {
        self.layout.max_lights as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use orrery_engine::bridge::protocol::{HEADER_EVENT_COUNT, HEADER_FRAME_COUNTER, HEADER_SDF_INSTANCE_COUNT};
    use orrery_engine::{Entity, MeshComponent, SDFColor};

    #[derive(Default)]
    struct Probe {
        radius: f32,
        updates: u32,
        customs_seen: u32,
        inits: u32,
    }

    impl Game for Probe {
        fn configure(&mut self, json: &str) -> Result<(), serde_json::Error> {
            self.radius = serde_json::from_str(json)?;
            Ok(())
        }

        fn init(&mut self, ctx: &mut EngineContext) {
            self.inits += 1;
            let id = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(id).with_mesh(MeshComponent::sphere(self.radius.max(1.0), SDFColor::default())),
            );
            ctx.camera.look_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        }

        fn update(&mut self, _ctx: &mut EngineContext, input: &InputQueue) {
            self.updates += 1;
            self.customs_seen += input
                .iter()
                .filter(|e| matches!(e, InputEvent::Custom { .. }))
                .count() as u32;
        }

        fn render(&self, ctx: &mut RenderContext) {
            ctx.emit_event(GameEvent::new(1.0, self.updates as f32, 0.0, 0.0));
        }
    }

    #[test]
    fn tick_before_init_does_nothing() {
        let mut runner = GameRunner::new(Probe::default());
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.game.updates, 0);
    }

    #[test]
    fn input_reaches_only_the_first_step() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.push_input(InputEvent::Custom { kind: 2, a: 0.0, b: 0.0, c: 0.0 });
        runner.tick(3.0 / 60.0 + 1e-4);
        assert_eq!(runner.game.updates, 3);
        assert_eq!(runner.game.customs_seen, 1);
        assert!(runner.input.is_empty());
    }

    #[test]
    fn input_waits_for_a_step() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.push_input(InputEvent::Wheel { delta: 1.0 });
        runner.tick(0.001);
        assert_eq!(runner.input.len(), 1);
    }

    #[test]
    fn header_reflects_frame() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.tick(1.0 / 60.0);
        let header = runner.header();
        assert_eq!(header[HEADER_FRAME_COUNTER], 2.0);
        assert_eq!(header[HEADER_SDF_INSTANCE_COUNT], 1.0);
        assert_eq!(header[HEADER_EVENT_COUNT], 1.0);
        assert_eq!(runner.game_events_flat(), &[1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn config_after_init_rebuilds_scene() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.load_config("4.0");
        assert_eq!(runner.game.inits, 2);
        assert_eq!(runner.ctx.scene.len(), 1);

        runner.load_config("not json");
        assert_eq!(runner.game.inits, 2);
        assert_eq!(runner.game.radius, 4.0);
    }
}
