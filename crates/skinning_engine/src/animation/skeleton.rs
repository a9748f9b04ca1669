//! Skeleton hierarchy
//!
//! Bones are stored as an ordered forest: a bone's parent always has a
//! smaller index than the bone itself, so model-space transforms can be
//! resolved in a single forward pass.

use thiserror::Error;

use super::pose::Pose;
use crate::foundation::math::Transform;

/// Space in which bone transforms are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpaceType {
    /// Relative to the parent bone
    Local,
    /// Relative to the skeleton root (mesh space)
    Model,
}

/// Skeleton errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    /// Parent must be an already existing bone
    #[error("Bone '{bone}' references parent {parent}, but only {count} bones exist")]
    InvalidParent {
        /// Name of the bone being added
        bone: String,
        /// Requested parent index
        parent: usize,
        /// Bones existing at insertion time
        count: usize,
    },

    /// Bone index out of range
    #[error("Bone index {index} out of range ({count} bones)")]
    BoneOutOfRange {
        /// Requested index
        index: usize,
        /// Number of bones
        count: usize,
    },

    /// Pose with a different bone count
    #[error("Pose has {actual} transforms, skeleton has {expected} bones")]
    PoseSizeMismatch {
        /// Skeleton bone count
        expected: usize,
        /// Pose length
        actual: usize,
    },
}

/// Single joint of the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Bone name, unique within a skeleton by convention
    pub name: String,
    /// Parent bone index, `None` for roots
    pub parent: Option<usize>,
}

/// Hierarchical set of joint transforms
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    name: String,
    bones: Vec<Bone>,
    local: Pose,
    model: Pose,
}

impl Skeleton {
    /// Create an empty skeleton
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Skeleton name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bones
    pub fn size(&self) -> usize {
        self.bones.len()
    }

    /// Whether the skeleton has no bones
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Bones in hierarchy order
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Find a bone index by name
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }

    /// Append a bone with its local (parent-relative) transform.
    ///
    /// Returns the new bone's index.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        local: Transform,
    ) -> Result<usize, SkeletonError> {
        let name = name.into();
        let count = self.bones.len();
        if let Some(parent) = parent {
            if parent >= count {
                return Err(SkeletonError::InvalidParent { bone: name, parent, count });
            }
        }

        let model = match parent {
            Some(parent) => self.model[parent].combine(&local),
            None => local,
        };
        self.bones.push(Bone { name, parent });
        self.local.push(local);
        self.model.push(model);
        Ok(count)
    }

    /// Copy of the whole pose in the requested space
    pub fn get_pose(&self, space: SpaceType) -> Pose {
        match space {
            SpaceType::Local => self.local.clone(),
            SpaceType::Model => self.model.clone(),
        }
    }

    /// Borrow the whole pose in the requested space
    pub fn pose(&self, space: SpaceType) -> &[Transform] {
        match space {
            SpaceType::Local => &self.local,
            SpaceType::Model => &self.model,
        }
    }

    /// Replace the whole pose
    pub fn set_pose(&mut self, pose: &[Transform], space: SpaceType) -> Result<(), SkeletonError> {
        if pose.len() != self.size() {
            return Err(SkeletonError::PoseSizeMismatch {
                expected: self.size(),
                actual: pose.len(),
            });
        }

        match space {
            SpaceType::Local => {
                self.local.copy_from_slice(pose);
                self.update_model_transforms(0);
            }
            SpaceType::Model => {
                self.model.copy_from_slice(pose);
                for index in 0..self.size() {
                    self.local[index] = self.local_from_model(index);
                }
            }
        }
        Ok(())
    }

    /// Transform of one bone in the requested space
    pub fn get_transform(&self, bone: usize, space: SpaceType) -> Result<Transform, SkeletonError> {
        self.check_index(bone)?;
        Ok(self.pose(space)[bone])
    }

    /// Set the transform of one bone; descendants follow their parent
    pub fn set_transform(
        &mut self,
        bone: usize,
        transform: Transform,
        space: SpaceType,
    ) -> Result<(), SkeletonError> {
        self.check_index(bone)?;
        match space {
            SpaceType::Local => self.local[bone] = transform,
            SpaceType::Model => {
                self.model[bone] = transform;
                self.local[bone] = self.local_from_model(bone);
            }
        }
        self.update_model_transforms(bone);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), SkeletonError> {
        if index < self.size() {
            Ok(())
        } else {
            Err(SkeletonError::BoneOutOfRange { index, count: self.size() })
        }
    }

    fn local_from_model(&self, index: usize) -> Transform {
        match self.bones[index].parent {
            Some(parent) => self.model[parent].inverse().combine(&self.model[index]),
            None => self.model[index],
        }
    }

    // Parents precede children, so everything from `first` on can be
    // recomputed in one pass.
    fn update_model_transforms(&mut self, first: usize) {
        for index in first..self.size() {
            self.model[index] = match self.bones[index].parent {
                Some(parent) => self.model[parent].combine(&self.local[index]),
                None => self.local[index],
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::identity_pose;
    use crate::foundation::math::{constants::HALF_PI, Quat, Vec3};
    use approx::assert_relative_eq;

    fn arm() -> Skeleton {
        let mut skeleton = Skeleton::new("arm");
        let shoulder = skeleton.add_bone("shoulder", None, Transform::identity()).unwrap();
        let elbow = skeleton
            .add_bone("elbow", Some(shoulder), Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        skeleton
            .add_bone("wrist", Some(elbow), Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        skeleton
    }

    #[test]
    fn test_model_pose_accumulates_parents() {
        let skeleton = arm();

        let model = skeleton.get_pose(SpaceType::Model);

        assert_eq!(model.len(), 3);
        assert_relative_eq!(model[2].position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(skeleton.find_bone("elbow"), Some(1));
    }

    #[test]
    fn test_rotating_parent_moves_children() {
        let mut skeleton = arm();
        let rotation = Transform::from_rotation(Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI));

        skeleton.set_transform(0, rotation, SpaceType::Local).unwrap();

        let wrist = skeleton.get_transform(2, SpaceType::Model).unwrap();
        assert_relative_eq!(wrist.position, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_model_space_edit_updates_local() {
        let mut skeleton = arm();
        let target = Transform::from_position(Vec3::new(1.0, 1.0, 0.0));

        skeleton.set_transform(1, target, SpaceType::Model).unwrap();

        let local = skeleton.get_transform(1, SpaceType::Local).unwrap();
        assert_relative_eq!(local.position, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-5);
        let wrist = skeleton.get_transform(2, SpaceType::Model).unwrap();
        assert_relative_eq!(wrist.position, Vec3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_invalid_parent_rejected() {
        let mut skeleton = Skeleton::new("broken");

        let result = skeleton.add_bone("orphan", Some(0), Transform::identity());

        assert!(matches!(result, Err(SkeletonError::InvalidParent { parent: 0, .. })));
        assert!(skeleton.is_empty());
    }

    #[test]
    fn test_pose_size_mismatch() {
        let mut skeleton = arm();

        let result = skeleton.set_pose(&identity_pose(2), SpaceType::Local);

        assert_eq!(result, Err(SkeletonError::PoseSizeMismatch { expected: 3, actual: 2 }));
    }
}
