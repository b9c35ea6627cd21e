use bytemuck::{Pod, Zeroable};

/// Per-instance SDF render data, already projected to screen space.
/// Written to SharedArrayBuffer for the TypeScript SDF renderer.
/// 12 floats = 48 bytes per instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SDFInstance {
    /// Screen pixels, y down.
    pub x: f32,
    pub y: f32,
    /// Pixel radius.
    pub radius: f32,
    /// Spheres: spin about the body's up axis. Capsules: screen angle of the axis.
    pub rotation: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub shininess: f32,
    pub emissive: f32,
    /// 0 = sphere, 1 = capsule.
    pub shape: f32,
    /// Capsule straight-section half length in pixels (0 for spheres).
    pub half_height: f32,
    pub opacity: f32,
}

impl SDFInstance {
    pub const FLOATS: usize = 12;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Fixed-capacity buffer of SDF instances.
pub struct SDFBuffer {
    instances: Vec<SDFInstance>,
    max: usize,
}

impl SDFBuffer {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(max: usize) -> Self {
        Self {
            instances: Vec::with_capacity(max),
            max,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Push an instance. Returns false once the buffer is full.
    pub fn push(&mut self, instance: SDFInstance) -> bool {
        if self.instances.len() >= self.max {
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn instances(&self) -> &[SDFInstance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for SDFBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdf_instance_is_48_bytes() {
        assert_eq!(std::mem::size_of::<SDFInstance>(), SDFInstance::STRIDE_BYTES);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut buf = SDFBuffer::with_capacity(2);
        assert!(buf.push(SDFInstance::default()));
        assert!(buf.push(SDFInstance::default()));
        assert!(!buf.push(SDFInstance::default()));
        assert_eq!(buf.instance_count(), 2);
        buf.clear();
        assert_eq!(buf.instance_count(), 0);
    }
}
