//! Mesh geometry
//!
//! Triangle meshes and the normal computation used after deformation.

pub mod mesh;
pub mod normal;

pub use mesh::{triangle_area, triangle_centroid, triangle_corners, MeshError, Triangle, TriangleMesh};
pub use normal::uniform_normal;
