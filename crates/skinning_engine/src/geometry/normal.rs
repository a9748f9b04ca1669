//! Vertex normal computation

use super::mesh::{triangle_corners, Triangle};
use crate::foundation::math::{constants::NORM_EPSILON, Vec3};

/// Unweighted average of the adjacent face normals, per vertex.
///
/// `normals` is resized to the vertex count. Degenerate faces contribute
/// nothing, and vertices with no usable face end up with a zero normal.
pub fn uniform_normal(vertices: &[Vec3], triangles: &[Triangle], normals: &mut Vec<Vec3>) {
    normals.clear();
    normals.resize(vertices.len(), Vec3::zeros());

    for triangle in triangles {
        let [p0, p1, p2] = triangle_corners(vertices, triangle);
        let face = (p1 - p0).cross(&(p2 - p0));
        let length = face.norm();
        if length <= NORM_EPSILON {
            continue;
        }
        let face = face / length;
        for &index in triangle {
            normals[index as usize] += face;
        }
    }

    for normal in normals.iter_mut() {
        let length = normal.norm();
        if length > NORM_EPSILON {
            *normal /= length;
        }
    }
}
