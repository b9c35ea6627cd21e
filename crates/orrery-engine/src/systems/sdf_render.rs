use glam::{EulerRot, Vec3};
use crate::components::entity::Entity;
use crate::components::mesh::{MeshComponent, SDFShape};
use crate::core::scene::Scene;
use crate::renderer::camera::{PerspectiveCamera, Projector};
use crate::renderer::sdf_instance::{SDFBuffer, SDFInstance};

/// Project every active mesh entity through the camera and fill the
/// SDF buffer back to front.
///
/// Shells sort by their centre depth pushed back by their world radius, so a
/// glow or atmosphere lands behind the body it wraps. When the scene holds
/// more instances than the buffer, the farthest are dropped.
pub fn build_sdf_buffer(scene: &Scene, camera: &PerspectiveCamera, buffer: &mut SDFBuffer) {
    buffer.clear();

    let projector = camera.projector();
    let mut projected: Vec<(f32, SDFInstance)> = scene
        .meshes()
        .filter_map(|(entity, mesh)| project_entity(entity, mesh, &projector))
        .collect();

    projected.sort_by(|a, b| b.0.total_cmp(&a.0));

    let skip = projected.len().saturating_sub(buffer.capacity());
    if skip > 0 {
        log::debug!("sdf: dropping {} far instances over capacity", skip);
    }
    for (_, instance) in projected.into_iter().skip(skip) {
        buffer.push(instance);
    }
}

/// Returns (sort depth, instance), or `None` when the entity is behind the camera.
fn project_entity(
    entity: &Entity,
    mesh: &MeshComponent,
    projector: &Projector,
) -> Option<(f32, SDFInstance)> {
    let center = projector.project(entity.pos)?;

    let mut instance = SDFInstance {
        x: center.pos.x,
        y: center.pos.y,
        radius: 0.0,
        rotation: 0.0,
        r: mesh.color.r,
        g: mesh.color.g,
        b: mesh.color.b,
        shininess: mesh.shininess,
        emissive: mesh.emissive,
        shape: mesh.shape.code(),
        half_height: 0.0,
        opacity: mesh.opacity,
    };

    match mesh.shape {
        SDFShape::Sphere { radius } => {
            instance.radius = radius * entity.scale * center.scale;
            instance.rotation = entity.rotation.to_euler(EulerRot::YXZ).0;
        }
        SDFShape::Capsule { radius, half_height, axis } => {
            let half: Vec3 = entity.rotation * axis * (half_height * entity.scale);
            let a = projector.project(entity.pos - half)?;
            let b = projector.project(entity.pos + half)?;
            let mid = (a.pos + b.pos) * 0.5;
            let span = b.pos - a.pos;
            instance.x = mid.x;
            instance.y = mid.y;
            instance.radius = radius * entity.scale * center.scale;
            instance.rotation = span.y.atan2(span.x);
            instance.half_height = span.length() * 0.5;
        }
    }

    let depth = if mesh.shell {
        center.depth + entity.world_radius()
    } else {
        center.depth
    };
    Some((depth, instance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::mesh::SDFColor;
    use glam::Quat;

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(800.0, 600.0);
        cam.look_at(Vec3::new(0.0, 0.0, 100.0), Vec3::ZERO);
        cam
    }

    fn ball(id: u32, pos: Vec3, radius: f32, color: SDFColor) -> Entity {
        Entity::new(EntityId(id))
            .with_pos(pos)
            .with_mesh(MeshComponent::sphere(radius, color))
    }

    #[test]
    fn projects_sphere_to_screen() {
        let mut scene = Scene::new();
        scene.spawn(ball(1, Vec3::ZERO, 2.0, SDFColor::new(1.0, 0.0, 0.0)).with_scale(1.5));

        let cam = camera();
        let mut buffer = SDFBuffer::new();
        build_sdf_buffer(&scene, &cam, &mut buffer);

        let inst = buffer.instances()[0];
        let center = cam.project(Vec3::ZERO).unwrap();
        assert!((inst.x - 400.0).abs() < 1e-2);
        assert!((inst.y - 300.0).abs() < 1e-2);
        assert!((inst.radius - 3.0 * center.scale).abs() < 1e-3);
        assert_eq!(inst.r, 1.0);
        assert_eq!(inst.shape, 0.0);
        assert_eq!(inst.opacity, 1.0);
    }

    #[test]
    fn sorted_back_to_front() {
        let mut scene = Scene::new();
        scene.spawn(ball(1, Vec3::new(0.0, 0.0, 20.0), 1.0, SDFColor::default()));
        scene.spawn(ball(2, Vec3::new(0.0, 0.0, -40.0), 1.0, SDFColor::default()));
        scene.spawn(ball(3, Vec3::ZERO, 1.0, SDFColor::default()));

        let mut buffer = SDFBuffer::new();
        build_sdf_buffer(&scene, &camera(), &mut buffer);

        let radii: Vec<f32> = buffer.instances().iter().map(|i| i.radius).collect();
        // Farther means smaller on screen.
        assert!(radii[0] < radii[1] && radii[1] < radii[2], "{radii:?}");
    }

    #[test]
    fn shell_sorts_behind_its_body() {
        let mut scene = Scene::new();
        scene.spawn(ball(1, Vec3::ZERO, 6.0, SDFColor::new(0.0, 0.5, 1.0)));
        scene.spawn(
            Entity::new(EntityId(2)).with_mesh(
                MeshComponent::sphere(6.12, SDFColor::hex(0x0088FF))
                    .with_opacity(0.2)
                    .as_shell(),
            ),
        );

        let mut buffer = SDFBuffer::new();
        build_sdf_buffer(&scene, &camera(), &mut buffer);
        assert_eq!(buffer.instances()[0].opacity, 0.2);
        assert_eq!(buffer.instances()[1].opacity, 1.0);
    }

    #[test]
    fn capsule_projects_endpoints() {
        let mut scene = Scene::new();
        scene.spawn(
            Entity::new(EntityId(1))
                .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2))
                .with_mesh(MeshComponent::capsule(0.5, 5.0, Vec3::Y, SDFColor::default())),
        );

        let cam = camera();
        let mut buffer = SDFBuffer::new();
        build_sdf_buffer(&scene, &cam, &mut buffer);

        let inst = buffer.instances()[0];
        let scale = cam.project(Vec3::ZERO).unwrap().scale;
        assert_eq!(inst.shape, 1.0);
        // Y axis rotated onto −X: horizontal on screen.
        assert!(inst.rotation.sin().abs() < 1e-3);
        assert!((inst.half_height - 5.0 * scale).abs() < 0.05);
    }

    #[test]
    fn skips_behind_camera_and_caps_far_ones() {
        let mut scene = Scene::new();
        scene.spawn(ball(1, Vec3::new(0.0, 0.0, 200.0), 1.0, SDFColor::default()));
        scene.spawn(ball(2, Vec3::new(0.0, 0.0, -50.0), 1.0, SDFColor::default()));
        scene.spawn(ball(3, Vec3::new(0.0, 0.0, 50.0), 1.0, SDFColor::default()));

        let mut buffer = SDFBuffer::with_capacity(1);
        build_sdf_buffer(&scene, &camera(), &mut buffer);
        assert_eq!(buffer.instance_count(), 1);
        // The nearest visible one survives.
        let near = camera().project(Vec3::new(0.0, 0.0, 50.0)).unwrap();
        assert!((buffer.instances()[0].radius - near.scale).abs() < 1e-3);
    }
}
