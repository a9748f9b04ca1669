//! Triangle mesh representation
//!
//! Pure geometry container: positions, per-vertex normals and triangle
//! indices. Rendering-side vertex layouts live with the drawable that uploads
//! them, not here.

use thiserror::Error;

use crate::foundation::math::{Vec3, Vec3Array};

/// Triangle as three vertex indices
pub type Triangle = [u32; 3];

/// Mesh validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Normals and vertices must pair up
    #[error("Mesh has {vertices} vertices but {normals} normals")]
    NormalCountMismatch {
        /// Vertex count
        vertices: usize,
        /// Normal count
        normals: usize,
    },

    /// Triangle references a vertex that does not exist
    #[error("Triangle {triangle} references vertex {index} (mesh has {vertices} vertices)")]
    IndexOutOfRange {
        /// Offending triangle
        triangle: usize,
        /// Offending index
        index: u32,
        /// Vertex count
        vertices: usize,
    },
}

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleMesh {
    /// Vertex positions
    pub vertices: Vec3Array,

    /// Per-vertex normals
    pub normals: Vec3Array,

    /// Triangle indices into `vertices`
    pub triangles: Vec<Triangle>,
}

impl TriangleMesh {
    /// Create a mesh from its parts
    pub fn new(vertices: Vec3Array, normals: Vec3Array, triangles: Vec<Triangle>) -> Self {
        Self { vertices, normals, triangles }
    }

    /// Create a mesh and compute uniform normals for it
    pub fn with_computed_normals(vertices: Vec3Array, triangles: Vec<Triangle>) -> Self {
        let mut normals = Vec::new();
        super::normal::uniform_normal(&vertices, &triangles, &mut normals);
        Self { vertices, normals, triangles }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check that normals pair with vertices and indices are in range
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.normals.len() != self.vertices.len() {
            return Err(MeshError::NormalCountMismatch {
                vertices: self.vertices.len(),
                normals: self.normals.len(),
            });
        }
        for (triangle, indices) in self.triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertices: self.vertices.len(),
                });
            }
        }
        Ok(())
    }

    /// Corner positions of a triangle
    pub fn triangle_vertices(&self, triangle: &Triangle) -> [Vec3; 3] {
        triangle_corners(&self.vertices, triangle)
    }
}

/// Corner positions of `triangle` within `vertices`
pub fn triangle_corners(vertices: &[Vec3], triangle: &Triangle) -> [Vec3; 3] {
    [
        vertices[triangle[0] as usize],
        vertices[triangle[1] as usize],
        vertices[triangle[2] as usize],
    ]
}

/// Area of the triangle spanned by three points
pub fn triangle_area(corners: &[Vec3; 3]) -> f32 {
    0.5 * (corners[1] - corners[0]).cross(&(corners[2] - corners[0])).norm()
}

/// Barycenter of the triangle spanned by three points
pub fn triangle_centroid(corners: &[Vec3; 3]) -> Vec3 {
    (corners[0] + corners[1] + corners[2]) / 3.0
}
