use glam::{Quat, Vec3};
use crate::api::types::EntityId;
use crate::components::mesh::MeshComponent;

/// Fat Entity: a single struct with optional components.
///
/// `pos`, `rotation` and `scale` are world-space. Entities inside a
/// `TransformGraph` have them overwritten on every `propagate`.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Inactive entities are neither drawn nor picked.
    pub active: bool,
    pub pos: Vec3,
    pub rotation: Quat,
    /// Uniform scale.
    pub scale: f32,
    /// SDF mesh (optional; entities without one are pivots or groups).
    pub mesh: Option<MeshComponent>,
    /// Whether pointer rays may hit this entity.
    pub pickable: bool,
}

impl Entity {
    /// Create a new entity with the given ID at the origin.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            mesh: None,
            pickable: false,
        }
    }

    // -- Builder pattern --

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec3) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_mesh(mut self, mesh: MeshComponent) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }

    /// World-space radius of the mesh's bounding sphere (0 without a mesh).
    pub fn world_radius(&self) -> f32 {
        self.mesh
            .as_ref()
            .map(|m| m.shape.bounding_radius() * self.scale)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mesh::SDFColor;

    #[test]
    fn world_radius_follows_scale() {
        let e = Entity::new(EntityId(1))
            .with_scale(2.0)
            .with_mesh(MeshComponent::sphere(3.0, SDFColor::default()));
        assert_eq!(e.world_radius(), 6.0);
        assert_eq!(Entity::new(EntityId(2)).world_radius(), 0.0);
    }
}
