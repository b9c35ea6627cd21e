pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use api::types::{EntityId, GameEvent};
pub use components::entity::Entity;
pub use components::mesh::{MeshComponent, SDFShape, SDFColor};
pub use core::scene::Scene;
pub use core::time::{FixedTimestep, SimClock};
pub use core::rng::Rng;
pub use renderer::camera::{PerspectiveCamera, Projection, Projector};
pub use renderer::sdf_instance::{SDFInstance, SDFBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use bridge::protocol::{ProtocolLayout, FrameCounts};
pub use systems::lighting::{PointLight, LightState, LIGHT_FLOATS};
pub use systems::picking::{Ray, PickHit, pick, pick_filtered};
pub use systems::sdf_render::build_sdf_buffer;

#[cfg(feature = "vectors")]
pub use systems::vector::{VectorState, VectorVertex, VectorColor, VectorPass};

// Extensions: decoupled optional systems
pub use extensions::{TransformGraph, LocalTransform, WorldTransform};
