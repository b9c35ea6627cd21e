// extensions/transform.rs
//
// Transform hierarchy extension: tracks parent-child relationships by EntityId.
// Kept outside Entity/Scene; games that need nesting (moons on planets,
// a station on a moon pivot) build one alongside their Scene.
//
// Usage:
//   let mut graph = TransformGraph::new();
//   graph.register_with(moon, LocalTransform::new().with_offset(Vec3::X * 10.0));
//   graph.set_parent(moon, Some(planet));
//   graph.propagate(&mut scene);  // writes world pos/rotation/scale into entities

use std::collections::HashMap;
use glam::{Quat, Vec3};
use crate::api::types::EntityId;
use crate::core::scene::Scene;

/// Local transform data for entities in a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    /// Position relative to parent (or world if no parent).
    pub offset: Vec3,
    /// Rotation relative to parent.
    pub rotation: Quat,
    /// Uniform scale relative to parent; also scales the offsets of children.
    pub scale: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
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
}

/// Resolved world-space transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub pos: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl WorldTransform {
    pub const IDENTITY: Self = Self {
        pos: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    /// Compose a child's local transform onto this (parent) transform.
    pub fn then(&self, local: &LocalTransform) -> Self {
        Self {
            pos: self.pos + self.rotation * (local.offset * self.scale),
            rotation: (self.rotation * local.rotation).normalize(),
            scale: self.scale * local.scale,
        }
    }

    /// Map a point from this transform's local space to world space.
    pub fn apply(&self, local_point: Vec3) -> Vec3 {
        self.pos + self.rotation * (local_point * self.scale)
    }
}

#[derive(Debug, Clone, Default)]
struct TransformNode {
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    local: LocalTransform,
}

/// Transform hierarchy graph. Manages parent-child relationships.
#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: HashMap<EntityId, TransformNode>,
    /// Entities with no parent, in registration order.
    roots: Vec<EntityId>,
    /// Set when hierarchy or locals change, cleared after propagate.
    dirty: bool,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity with a default local transform.
    pub fn register(&mut self, id: EntityId) {
        self.register_with(id, LocalTransform::default());
    }

    /// Register an entity with a specific local transform.
    pub fn register_with(&mut self, id: EntityId, local: LocalTransform) {
        let node = self.nodes.entry(id).or_default();
        node.local = local;
        if node.parent.is_none() && !self.roots.contains(&id) {
            self.roots.push(id);
        }
        self.dirty = true;
    }

    /// Register `child` under `parent` in one call.
    pub fn attach(&mut self, child: EntityId, parent: EntityId, local: LocalTransform) {
        self.register_with(child, local);
        self.set_parent(child, Some(parent));
    }

    /// Set the parent of an entity. Pass `None` to make it a root.
    /// Refuses links that would create a cycle.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) {
        if let Some(p) = parent {
            if p == child || self.ancestors(p).contains(&child) {
                log::warn!("transform graph: refusing cycle {:?} -> {:?}", child, p);
                return;
            }
            self.nodes.entry(p).or_default();
            if self.nodes.get(&p).is_some_and(|n| n.parent.is_none()) && !self.roots.contains(&p) {
                self.roots.push(p);
            }
        }
        self.nodes.entry(child).or_default();

        if let Some(old_parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(old_node) = self.nodes.get_mut(&old_parent) {
                old_node.children.retain(|&c| c != child);
            }
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }

        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    if !parent_node.children.contains(&child) {
                        parent_node.children.push(child);
                    }
                }
                self.roots.retain(|&r| r != child);
            }
            None => {
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
        }

        self.dirty = true;
    }

    pub fn get_local_mut(&mut self, id: EntityId) -> Option<&mut LocalTransform> {
        self.dirty = true;
        self.nodes.get_mut(&id).map(|n| &mut n.local)
    }

    pub fn get_parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn get_children(&self, id: EntityId) -> Option<&[EntityId]> {
        self.nodes.get(&id).map(|n| n.children.as_slice())
    }

    /// Parent, grandparent, ... up to the root. Excludes `id` itself.
    pub fn ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let mut chain = Vec::new();
        let mut cursor = self.get_parent(id);
        while let Some(p) = cursor {
            if chain.contains(&p) {
                break;
            }
            chain.push(p);
            cursor = self.get_parent(p);
        }
        chain
    }

    /// World transform of `id`, computed from locals without touching the scene.
    pub fn world_transform(&self, id: EntityId) -> Option<WorldTransform> {
        let node = self.nodes.get(&id)?;
        let parent_world = match node.parent {
            Some(p) => self.world_transform(p)?,
            None => WorldTransform::IDENTITY,
        };
        Some(parent_world.then(&node.local))
    }

    /// Remove an entity from the hierarchy. Children become roots.
    pub fn remove(&mut self, id: EntityId) {
        if let Some(node) = self.nodes.remove(&id) {
            if let Some(parent) = node.parent {
                if let Some(parent_node) = self.nodes.get_mut(&parent) {
                    parent_node.children.retain(|&c| c != id);
                }
            }
            for child in node.children {
                if let Some(child_node) = self.nodes.get_mut(&child) {
                    child_node.parent = None;
                }
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
            self.roots.retain(|&r| r != id);
        }
        self.dirty = true;
    }

    /// Propagate transforms from roots down through the hierarchy,
    /// writing world pos/rotation/scale into scene entities.
    pub fn propagate(&mut self, scene: &mut Scene) {
        if !self.dirty {
            return;
        }
        for &root in &self.roots {
            self.propagate_recursive(root, WorldTransform::IDENTITY, scene);
        }
        self.dirty = false;
    }

    fn propagate_recursive(&self, id: EntityId, parent: WorldTransform, scene: &mut Scene) {
        let Some(node) = self.nodes.get(&id) else { return };
        let world = parent.then(&node.local);

        if let Some(entity) = scene.get_mut(id) {
            entity.pos = world.pos;
            entity.rotation = world.rotation;
            entity.scale = world.scale;
        }

        for &child in &node.children {
            self.propagate_recursive(child, world, scene);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn parent_child_relationship() {
        let mut graph = TransformGraph::new();
        let parent = EntityId(1);
        let child = EntityId(2);

        graph.register(parent);
        graph.register(child);
        graph.set_parent(child, Some(parent));

        assert_eq!(graph.get_parent(child), Some(parent));
        assert_eq!(graph.get_children(parent), Some([child].as_slice()));
        assert_eq!(graph.ancestors(child), vec![parent]);
    }

    #[test]
    fn child_follows_parent_rotation_and_scale() {
        let mut graph = TransformGraph::new();
        let mut scene = Scene::new();
        let planet = scene.spawn(Entity::new(EntityId(1)));
        let moon = scene.spawn(Entity::new(EntityId(2)));

        graph.register_with(
            planet,
            LocalTransform::new()
                .with_offset(Vec3::new(100.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_y(FRAC_PI_2))
                .with_scale(2.0),
        );
        graph.attach(moon, planet, LocalTransform::new().with_offset(Vec3::new(10.0, 0.0, 0.0)));
        graph.propagate(&mut scene);

        // +X rotated a quarter turn about +Y points at -Z; doubled by parent scale.
        let moon_pos = scene.get(moon).unwrap().pos;
        assert!(close(moon_pos, Vec3::new(100.0, 0.0, -20.0)), "{moon_pos:?}");
        assert_eq!(scene.get(moon).unwrap().scale, 2.0);
        assert!(close(graph.world_transform(moon).unwrap().pos, moon_pos));
    }

    #[test]
    fn propagate_skips_when_clean() {
        let mut graph = TransformGraph::new();
        let mut scene = Scene::new();
        let id = scene.spawn(Entity::new(EntityId(1)));
        graph.register_with(id, LocalTransform::new().with_offset(Vec3::X));
        graph.propagate(&mut scene);
        assert!(!graph.is_dirty());

        scene.get_mut(id).unwrap().pos = Vec3::ZERO;
        graph.propagate(&mut scene);
        assert_eq!(scene.get(id).unwrap().pos, Vec3::ZERO);

        graph.get_local_mut(id).unwrap().offset = Vec3::Y;
        graph.propagate(&mut scene);
        assert_eq!(scene.get(id).unwrap().pos, Vec3::Y);
    }

    #[test]
    fn refuses_cycles() {
        let mut graph = TransformGraph::new();
        let a = EntityId(1);
        let b = EntityId(2);
        graph.register(a);
        graph.attach(b, a, LocalTransform::default());
        graph.set_parent(a, Some(b));
        assert_eq!(graph.get_parent(a), None);
        graph.set_parent(a, Some(a));
        assert_eq!(graph.get_parent(a), None);
    }

    #[test]
    fn remove_orphans_children() {
        let mut graph = TransformGraph::new();
        let parent = EntityId(1);
        let child = EntityId(2);

        graph.register(parent);
        graph.attach(child, parent, LocalTransform::default());
        graph.remove(parent);

        assert_eq!(graph.get_parent(child), None);
        assert!(graph.roots.contains(&child));
    }
}
