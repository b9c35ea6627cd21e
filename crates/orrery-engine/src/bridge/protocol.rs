/// SharedArrayBuffer layout.
/// Must stay in sync with TypeScript `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 16 floats]
/// [SDF instances: max_sdf_instances × 12 floats]
/// [Vector vertices: max_vector_vertices × 6 floats]
/// [Lights: max_lights × 8 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written into the header every frame alongside the counts.
/// TypeScript reads them from the header to compute offsets dynamically.

use crate::api::game::GameConfig;
use crate::api::types::GameEvent;
use crate::renderer::sdf_instance::SDFInstance;
use crate::systems::lighting::LIGHT_FLOATS;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 16;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PROTOCOL_VERSION: usize = 2;
pub const HEADER_MAX_SDF_INSTANCES: usize = 3;
pub const HEADER_SDF_INSTANCE_COUNT: usize = 4;
pub const HEADER_MAX_VECTOR_VERTICES: usize = 5;
pub const HEADER_VECTOR_VERTEX_COUNT: usize = 6;
/// Vertices drawn before the SDF pass; the rest are drawn after.
pub const HEADER_VECTOR_SPLIT: usize = 7;
pub const HEADER_MAX_LIGHTS: usize = 8;
pub const HEADER_LIGHT_COUNT: usize = 9;
pub const HEADER_MAX_EVENTS: usize = 10;
pub const HEADER_EVENT_COUNT: usize = 11;
pub const HEADER_AMBIENT_R: usize = 12;
pub const HEADER_AMBIENT_G: usize = 13;
pub const HEADER_AMBIENT_B: usize = 14;
pub const HEADER_RESERVED: usize = 15;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per SDF instance (wire format, never changes).
pub const SDF_INSTANCE_FLOATS: usize = SDFInstance::FLOATS;

/// Floats per vector vertex: x, y, r, g, b, a (wire format, never changes).
pub const VECTOR_VERTEX_FLOATS: usize = 6;

/// Floats per game event: kind, a, b, c (wire format, never changes).
pub const EVENT_FLOATS: usize = GameEvent::FLOATS;

/// Per-frame counts that go into the header next to the capacities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameCounts {
    pub frame: u64,
    pub sdf_instances: usize,
    pub vector_vertices: usize,
    pub vector_split: usize,
    pub lights: usize,
    pub events: usize,
    pub ambient: [f32; 3],
}

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_sdf_instances: usize,
    pub max_vector_vertices: usize,
    pub max_lights: usize,
    pub max_events: usize,

    /// Section sizes in floats.
    pub sdf_data_floats: usize,
    pub vector_data_floats: usize,
    pub light_data_floats: usize,
    pub event_data_floats: usize,

    /// Offsets (in floats) where each section begins.
    pub sdf_data_offset: usize,
    pub vector_data_offset: usize,
    pub light_data_offset: usize,
    pub event_data_offset: usize,

    pub buffer_total_floats: usize,
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(
        max_sdf_instances: usize,
        max_vector_vertices: usize,
        max_lights: usize,
        max_events: usize,
    ) -> Self {
        let sdf_data_floats = max_sdf_instances * SDF_INSTANCE_FLOATS;
        let vector_data_floats = max_vector_vertices * VECTOR_VERTEX_FLOATS;
        let light_data_floats = max_lights * LIGHT_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let sdf_data_offset = HEADER_FLOATS;
        let vector_data_offset = sdf_data_offset + sdf_data_floats;
        let light_data_offset = vector_data_offset + vector_data_floats;
        let event_data_offset = light_data_offset + light_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_sdf_instances,
            max_vector_vertices,
            max_lights,
            max_events,
            sdf_data_floats,
            vector_data_floats,
            light_data_floats,
            event_data_floats,
            sdf_data_offset,
            vector_data_offset,
            light_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.max_sdf_instances,
            config.max_vector_vertices,
            config.max_lights,
            config.max_events,
        )
    }

    /// Fill a header block. Counts are clamped to the capacities.
    pub fn write_header(&self, counts: &FrameCounts, header: &mut [f32; HEADER_FLOATS]) {
        header[HEADER_LOCK] = 0.0;
        header[HEADER_FRAME_COUNTER] = counts.frame as f32;
        header[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        header[HEADER_MAX_SDF_INSTANCES] = self.max_sdf_instances as f32;
        header[HEADER_SDF_INSTANCE_COUNT] = counts.sdf_instances.min(self.max_sdf_instances) as f32;
        header[HEADER_MAX_VECTOR_VERTICES] = self.max_vector_vertices as f32;
        header[HEADER_VECTOR_VERTEX_COUNT] =
            counts.vector_vertices.min(self.max_vector_vertices) as f32;
        header[HEADER_VECTOR_SPLIT] = counts.vector_split.min(counts.vector_vertices) as f32;
        header[HEADER_MAX_LIGHTS] = self.max_lights as f32;
        header[HEADER_LIGHT_COUNT] = counts.lights.min(self.max_lights) as f32;
        header[HEADER_MAX_EVENTS] = self.max_events as f32;
        header[HEADER_EVENT_COUNT] = counts.events.min(self.max_events) as f32;
        header[HEADER_AMBIENT_R] = counts.ambient[0];
        header[HEADER_AMBIENT_G] = counts.ambient[1];
        header[HEADER_AMBIENT_B] = counts.ambient[2];
        header[HEADER_RESERVED] = 0.0;
    }
}
