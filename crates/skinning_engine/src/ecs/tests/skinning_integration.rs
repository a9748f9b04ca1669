//! Integration tests for the skinning system driving mesh and animation
//! components through the message bus

use crate::animation::{Skeleton, SpaceType, WeightMatrix};
use crate::core::SkinningConfig;
use crate::ecs::components::{AnimationComponent, MeshComponent};
use crate::ecs::systems::SkinningSystem;
use crate::ecs::{Entity, System, World};
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::geometry::TriangleMesh;
use crate::skinning::{SkinningError, SkinningState, SkinningType};
use approx::assert_relative_eq;

#[cfg(test)]
mod tests {
    use super::*;

    /// Strip along X, left half on the root bone, right half on its child
    fn strip() -> TriangleMesh {
        TriangleMesh::with_computed_normals(
            vec![
                Vec3::new(-2.0, 0.0, 0.0),
                Vec3::new(-2.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.0, 1.0, 0.0),
            ],
            vec![[0, 2, 1], [1, 2, 3], [2, 4, 3], [3, 4, 5]],
        )
    }

    fn blended_weights() -> WeightMatrix {
        WeightMatrix::from_rows(
            2,
            &[
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.5, 0.5],
                vec![0.5, 0.5],
                vec![0.0, 1.0],
                vec![0.0, 1.0],
            ],
        )
    }

    fn chain() -> Skeleton {
        let mut skeleton = Skeleton::new("chain");
        let root = skeleton.add_bone("root", None, Transform::identity()).unwrap();
        skeleton.add_bone("tip", Some(root), Transform::identity()).unwrap();
        skeleton
    }

    fn spawn(world: &mut World, content_id: &str) -> (Entity, MeshComponent, AnimationComponent) {
        let entity = world.create_entity();
        let mesh = MeshComponent::new("mesh", entity, content_id, strip());
        let animation = AnimationComponent::new("animation", entity, content_id, chain(), blended_weights());
        mesh.register(world.messenger_mut()).unwrap();
        animation.register(world.messenger_mut()).unwrap();
        (entity, mesh, animation)
    }

    #[test]
    fn test_rigid_skeleton_motion_is_exact_for_every_algorithm() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.8);

        for kind in [SkinningType::Lbs, SkinningType::Dqs, SkinningType::Cor] {
            let mut world = World::new();
            let (entity, mesh, animation) = spawn(&mut world, "strip");
            let mut system = SkinningSystem::new(SkinningConfig::default().with_skinning_type(kind));
            system.handle_weights_loading(&mut world, entity, "strip").unwrap();

            animation
                .skeleton()
                .write()
                .unwrap()
                .set_transform(0, Transform::from_rotation(rotation), SpaceType::Local)
                .unwrap();
            system.run(&mut world);

            let vertices = mesh.vertices().snapshot().unwrap();
            for (skinned, original) in vertices.iter().zip(&strip().vertices) {
                assert_relative_eq!(*skinned, rotation * original, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_late_inputs_are_picked_up() {
        let mut world = World::new();
        let (ready, ready_mesh, ready_animation) = spawn(&mut world, "ready");
        let late = world.create_entity();
        let late_mesh = MeshComponent::new("mesh", late, "late", strip());
        late_mesh.register(world.messenger_mut()).unwrap();

        let mut system = SkinningSystem::new(SkinningConfig::default());
        let ready_handle = system.handle_weights_loading(&mut world, ready, "ready").unwrap();
        let late_handle = system.handle_weights_loading(&mut world, late, "late").unwrap();
        assert!(system.component(ready_handle).unwrap().is_ready());
        assert!(!system.component(late_handle).unwrap().is_ready());

        let lift = Transform::from_position(Vec3::new(0.0, 3.0, 0.0));
        ready_animation
            .skeleton()
            .write()
            .unwrap()
            .set_transform(0, lift, SpaceType::Local)
            .unwrap();
        system.run(&mut world);

        assert_relative_eq!(ready_mesh.vertices().snapshot().unwrap()[0], Vec3::new(-2.0, 3.0, 0.0));
        assert_eq!(late_mesh.vertices().snapshot().unwrap(), strip().vertices);

        let late_animation = AnimationComponent::new("animation", late, "late", chain(), blended_weights());
        late_animation.register(world.messenger_mut()).unwrap();
        system.run(&mut world);

        assert!(system.component(late_handle).unwrap().is_ready());
    }

    #[test]
    fn test_switching_algorithm_mid_animation() {
        let mut world = World::new();
        let (entity, mesh, animation) = spawn(&mut world, "strip");
        let mut system = SkinningSystem::new(SkinningConfig::default());
        system.handle_weights_loading(&mut world, entity, "strip").unwrap();
        let bend = Transform::from_rotation(Quat::from_axis_angle(&Vec3::z_axis(), 1.2));

        animation
            .skeleton()
            .write()
            .unwrap()
            .set_transform(1, bend, SpaceType::Model)
            .unwrap();
        system.run(&mut world);
        let linear = mesh.vertices().snapshot().unwrap();

        // Same pose, new algorithm: nothing changes until the pose moves.
        system.set_skinning_type(SkinningType::Dqs).unwrap();
        system.run(&mut world);
        assert_eq!(mesh.vertices().snapshot().unwrap(), linear);

        animation.set_reset_requested(true);
        system.run(&mut world);
        assert_eq!(mesh.vertices().snapshot().unwrap(), strip().vertices);

        animation.set_reset_requested(false);
        system.run(&mut world);
        let dual = mesh.vertices().snapshot().unwrap();

        // Rigid ends agree; at the joint LBS shrinks toward the bone origin, DQS does not.
        assert_relative_eq!(dual[4], linear[4], epsilon = 1e-5);
        assert!(linear[3].norm() < 0.9);
        assert_relative_eq!(dual[3].norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_failing_component_does_not_hold_back_others() {
        let mut world = World::new();
        let (broken, _, broken_animation) = spawn(&mut world, "a");
        let (healthy, healthy_mesh, healthy_animation) = spawn(&mut world, "b");
        let mut system = SkinningSystem::new(SkinningConfig::default());
        let broken_handle = system.handle_weights_loading(&mut world, broken, "a").unwrap();
        let healthy_handle = system.handle_weights_loading(&mut world, healthy, "b").unwrap();

        broken_animation
            .skeleton()
            .write()
            .unwrap()
            .add_bone("extra", Some(1), Transform::identity())
            .unwrap();
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), 1.0);
        healthy_animation
            .skeleton()
            .write()
            .unwrap()
            .set_transform(1, Transform::from_rotation(rotation), SpaceType::Local)
            .unwrap();

        let result = system.update(&world);

        assert_eq!(result, Err(SkinningError::RefPoseMismatch { pose: 2, bones: 3 }));
        assert_relative_eq!(
            healthy_mesh.vertices().snapshot().unwrap()[4],
            rotation * Vec3::new(2.0, 0.0, 0.0),
            epsilon = 1e-5
        );
        let healthy_skinning = system.component(healthy_handle).unwrap();
        assert_eq!(healthy_skinning.state().unwrap(), SkinningState::Idle);
        assert!(system.component(broken_handle).unwrap().is_ready());

        // The broken component keeps failing on its own without blocking later frames.
        healthy_animation
            .skeleton()
            .write()
            .unwrap()
            .set_transform(1, Transform::identity(), SpaceType::Local)
            .unwrap();
        assert!(system.update(&world).is_err());
        assert_relative_eq!(healthy_mesh.vertices().snapshot().unwrap()[4], Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
    }
}
