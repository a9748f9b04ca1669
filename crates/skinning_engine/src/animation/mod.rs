//! Skeletal animation data model
//!
//! Skeletons, poses and skinning weights consumed by the skinning pipeline.

pub mod pose;
pub mod skeleton;
pub mod weights;

pub use pose::{are_equal, identity_pose, relative_pose, relative_pose_into, Pose, RefPose};
pub use skeleton::{Bone, Skeleton, SkeletonError, SpaceType};
pub use weights::WeightMatrix;
