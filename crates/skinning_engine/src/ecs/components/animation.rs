//! Animation component
//!
//! Owns an entity's skeleton together with the binding data produced at
//! import time (reference pose and skinning weights) and publishes them on
//! the message bus under the content id. Also exposes the "reset requested"
//! flag consumed by deformers and the live model-space pose, so per-frame
//! readers don't have to copy the whole skeleton.

use crate::animation::{Pose, RefPose, Skeleton, SpaceType, WeightMatrix};
use crate::ecs::{Component, ComponentMessenger, Entity, MessengerError};
use crate::foundation::collections::Shared;

/// Suffix appended to the content id for the live model-space pose entry
pub const MODEL_POSE_SUFFIX: &str = "p";

/// Bus id of the live model-space pose for `content_id`
pub fn model_pose_id(content_id: &str) -> String {
    format!("{content_id}{MODEL_POSE_SUFFIX}")
}

/// Skeleton, bind data and reset flag of one entity
pub struct AnimationComponent {
    name: String,
    entity: Entity,
    content_id: String,
    skeleton: Shared<Skeleton>,
    ref_pose: Shared<RefPose>,
    weights: Shared<WeightMatrix>,
    reset_requested: Shared<bool>,
}

impl AnimationComponent {
    /// Create the component; the reference pose is the skeleton's current
    /// model-space pose.
    pub fn new(
        name: impl Into<String>,
        entity: Entity,
        content_id: impl Into<String>,
        skeleton: Skeleton,
        weights: WeightMatrix,
    ) -> Self {
        let ref_pose = skeleton.get_pose(SpaceType::Model);
        Self {
            name: name.into(),
            entity,
            content_id: content_id.into(),
            skeleton: Shared::new(skeleton),
            ref_pose: Shared::new(ref_pose),
            weights: Shared::new(weights),
            reset_requested: Shared::new(false),
        }
    }

    /// Content id the data is published under
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    /// Live skeleton; posing it is picked up by deformers on their next frame
    pub fn skeleton(&self) -> &Shared<Skeleton> {
        &self.skeleton
    }

    /// Request (or clear a request for) reverting deformed meshes to bind pose
    pub fn set_reset_requested(&self, requested: bool) {
        match self.reset_requested.write() {
            Ok(mut flag) => *flag = requested,
            Err(e) => log::error!("Reset flag of '{}' unavailable: {}", self.content_id, e),
        }
    }

    /// Publish skeleton, live pose, reference pose, weights and reset flag
    pub fn register(&self, messenger: &mut ComponentMessenger) -> Result<(), MessengerError> {
        let skeleton = self.skeleton.clone();
        messenger.register_output::<Skeleton>(self.entity, &self.name, &self.content_id, move || {
            skeleton.read_unpoisoned().clone()
        })?;

        let skeleton = self.skeleton.clone();
        messenger.register_output::<Pose>(self.entity, &self.name, &model_pose_id(&self.content_id), move || {
            skeleton.read_unpoisoned().get_pose(SpaceType::Model)
        })?;

        let ref_pose = self.ref_pose.clone();
        messenger.register_output::<RefPose>(self.entity, &self.name, &self.content_id, move || {
            ref_pose.read_unpoisoned().clone()
        })?;

        let weights = self.weights.clone();
        messenger.register_output::<WeightMatrix>(self.entity, &self.name, &self.content_id, move || {
            weights.read_unpoisoned().clone()
        })?;

        let reset = self.reset_requested.clone();
        messenger.register_output::<bool>(self.entity, &self.name, &self.content_id, move || {
            *reset.read_unpoisoned()
        })?;

        log::debug!(
            "Animation data '{}' published for entity {} ({} bones)",
            self.content_id,
            self.entity,
            self.skeleton.read_unpoisoned().size()
        );
        Ok(())
    }
}

impl Component for AnimationComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::foundation::math::{Transform, Vec3};

    #[test]
    fn test_register_publishes_bind_data() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut skeleton = Skeleton::new("rig");
        skeleton.add_bone("root", None, Transform::from_position(Vec3::y())).unwrap();
        let component = AnimationComponent::new("anim", entity, "body", skeleton, WeightMatrix::zeros(3, 1));

        component.register(world.messenger_mut()).unwrap();
        component.set_reset_requested(true);

        let messenger = world.messenger();
        assert_eq!(messenger.get::<Skeleton>(entity, "body").unwrap().size(), 1);
        assert_eq!(messenger.get::<RefPose>(entity, "body").unwrap()[0].position, Vec3::y());
        assert_eq!(messenger.get::<WeightMatrix>(entity, "body").unwrap().rows(), 3);
        assert!(messenger.get::<bool>(entity, "body").unwrap());
    }

    #[test]
    fn test_model_pose_follows_live_skeleton() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut skeleton = Skeleton::new("rig");
        let root = skeleton.add_bone("root", None, Transform::identity()).unwrap();
        skeleton.add_bone("tip", Some(root), Transform::from_position(Vec3::x())).unwrap();
        let component = AnimationComponent::new("anim", entity, "body", skeleton, WeightMatrix::zeros(3, 2));
        component.register(world.messenger_mut()).unwrap();

        component
            .skeleton()
            .write()
            .unwrap()
            .set_transform(root, Transform::from_position(Vec3::y()), SpaceType::Local)
            .unwrap();

        let pose = world.messenger().get::<Pose>(entity, &model_pose_id("body")).unwrap();
        assert_eq!(pose.len(), 2);
        assert_eq!(pose[1].position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(world.messenger().get::<RefPose>(entity, "body").unwrap()[1].position, Vec3::x());
    }
}
