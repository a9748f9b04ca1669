//! ECS Components module
//!
//! Producers of the data deformers bind to: geometry and animation.

pub mod animation;
pub mod mesh;

pub use animation::{model_pose_id, AnimationComponent};
pub use mesh::{normals_id, vertices_id, MeshComponent};
