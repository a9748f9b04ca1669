//! Center-of-rotation skinning
//!
//! Each vertex rotates rigidly around its own center of rotation: the
//! area-weighted average of triangle centroids, where every triangle counts
//! in proportion to how similar its skinning weights are to the vertex's.
//! The rotation is the sign-corrected quaternion blend of the influencing
//! bones; the translation is the linear blend of the center itself. This
//! keeps joints from collapsing (LBS) or bulging (DQS).

use std::time::Instant;

use crate::animation::WeightMatrix;
use crate::foundation::math::{
    constants::NORM_EPSILON, sign_nz, Quat, Quaternion, Transform, Vec3, Vec3Array,
};
use crate::geometry::{triangle_area, triangle_centroid, triangle_corners, Triangle};

use super::RefData;

/// Sparse weight row: `(bone, weight)` pairs with non-zero weight
type Influences = Vec<(usize, f32)>;

/// Similarity of two weight rows.
///
/// Sums `a_j a_k b_j b_k exp(-(a_j b_k - a_k b_j)² / σ²)` over every bone pair
/// `j < k` influencing both rows. Rows sharing fewer than two bones are not
/// similar at all.
pub fn weight_similarity(a: &[(usize, f32)], b: &[(usize, f32)], sigma: f32) -> f32 {
    let sigma_sq = sigma * sigma;
    let weight_in_b = |bone: usize| {
        b.iter()
            .find(|(other, _)| *other == bone)
            .map_or(0.0, |(_, weight)| *weight)
    };

    let mut similarity = 0.0;
    for (index, &(j, a_j)) in a.iter().enumerate() {
        let b_j = weight_in_b(j);
        if b_j <= 0.0 {
            continue;
        }
        for &(k, a_k) in &a[index + 1..] {
            let b_k = weight_in_b(k);
            if b_k <= 0.0 {
                continue;
            }
            let cross = a_j * b_k - a_k * b_j;
            similarity += a_j * a_k * b_j * b_k * (-(cross * cross) / sigma_sq).exp();
        }
    }
    similarity
}

struct TriangleSample {
    area: f32,
    centroid: Vec3,
    influences: Influences,
}

/// Fill `ref_data.centers_of_rotation`, one center per reference vertex.
///
/// Weights below `weight_epsilon` are dropped and rows renormalized before
/// comparing. A vertex similar to no triangle (e.g. one driven by a single
/// bone) keeps its own position as center, which makes the skinning
/// reduce to its bone's rigid transform.
pub fn compute_cor(ref_data: &mut RefData, sigma: f32, weight_epsilon: f32) {
    let start = Instant::now();

    let mut weights = ref_data.weights.clone();
    weights.prune(weight_epsilon);
    weights.normalize_rows();

    let rows: Vec<Influences> = (0..weights.rows())
        .map(|vertex| weights.vertex_influences(vertex).collect())
        .collect();

    let mesh = &ref_data.reference_mesh;
    let triangles: Vec<TriangleSample> = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let corners = triangle_corners(&mesh.vertices, triangle);
            TriangleSample {
                area: triangle_area(&corners),
                centroid: triangle_centroid(&corners),
                influences: average_influences(&weights, triangle),
            }
        })
        .collect();

    let centers: Vec3Array = mesh
        .vertices
        .iter()
        .zip(&rows)
        .map(|(vertex, row)| {
            let mut center = Vec3::zeros();
            let mut total = 0.0;
            for sample in &triangles {
                let similarity = weight_similarity(row, &sample.influences, sigma);
                if similarity > 0.0 {
                    center += similarity * sample.area * sample.centroid;
                    total += similarity * sample.area;
                }
            }
            if total > NORM_EPSILON {
                center / total
            } else {
                *vertex
            }
        })
        .collect();

    log::debug!(
        "Computed {} centers of rotation from {} triangles in {:.2?}",
        centers.len(),
        triangles.len(),
        start.elapsed()
    );
    ref_data.centers_of_rotation = centers;
}

fn average_influences(weights: &WeightMatrix, triangle: &Triangle) -> Influences {
    let mut dense = vec![0.0; weights.cols()];
    for &corner in triangle {
        for (bone, weight) in weights.vertex_influences(corner as usize) {
            dense[bone] += weight / 3.0;
        }
    }
    dense
        .into_iter()
        .enumerate()
        .filter(|(_, weight)| *weight != 0.0)
        .collect()
}

/// Rotate each vertex around its center of rotation.
///
/// `output[v] = q_v * (input[v] - c_v) + Σ_b W[v][b] * (pose[b] * c_v)` with
/// `q_v` the normalized, sign-corrected blend of the bone rotations. Vertices
/// without influence are left in place.
pub fn cor_skinning(
    input: &[Vec3],
    pose: &[Transform],
    weights: &WeightMatrix,
    centers: &[Vec3],
    output: &mut Vec3Array,
) {
    debug_assert_eq!(input.len(), centers.len(), "one center of rotation per vertex is required");
    debug_assert_eq!(pose.len(), weights.cols(), "weights are incompatible with the pose");

    output.clear();
    output.extend(input.iter().zip(centers).enumerate().map(|(vertex, (position, center))| {
        let mut rotation = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        let mut pivot: Option<Quaternion<f32>> = None;
        let mut blended_center = Vec3::zeros();

        for (bone, weight) in weights.vertex_influences(vertex) {
            let transform = &pose[bone];
            let bone_rotation = transform.rotation.into_inner();
            let first = *pivot.get_or_insert(bone_rotation);
            rotation = rotation + bone_rotation * (weight * sign_nz(first.dot(&bone_rotation)));
            blended_center += weight * transform.transform_point(center);
        }

        match Quat::try_new(rotation, NORM_EPSILON) {
            Some(rotation) => rotation * (position - center) + blended_center,
            None => *position,
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::identity_pose;
    use crate::foundation::math::constants::HALF_PI;
    use crate::geometry::TriangleMesh;
    use approx::assert_relative_eq;

    /// Strip along X: left half on bone 0, right half on bone 1, blended in the middle
    fn strip() -> RefData {
        let vertices = vec![
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(-2.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 0.0),
        ];
        let triangles = vec![[0, 2, 1], [1, 2, 3], [2, 4, 3], [3, 4, 5]];
        let weights = WeightMatrix::from_rows(
            2,
            &[
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.5, 0.5],
                vec![0.5, 0.5],
                vec![0.0, 1.0],
                vec![0.0, 1.0],
            ],
        );
        RefData {
            reference_mesh: TriangleMesh::with_computed_normals(vertices, triangles),
            ref_pose: identity_pose(2),
            weights,
            ..Default::default()
        }
    }

    #[test]
    fn test_similarity_needs_two_shared_bones() {
        assert_eq!(weight_similarity(&[(0, 1.0)], &[(0, 1.0)], 0.1), 0.0);
        assert_eq!(weight_similarity(&[(0, 0.5), (1, 0.5)], &[(0, 1.0)], 0.1), 0.0);
    }

    #[test]
    fn test_similarity_peaks_on_identical_rows() {
        let row = [(0, 0.5), (1, 0.5)];
        let other = [(0, 0.9), (1, 0.1)];

        let same = weight_similarity(&row, &row, 0.1);
        let different = weight_similarity(&row, &other, 0.1);

        assert_relative_eq!(same, 0.0625, epsilon = 1e-7);
        assert!(different < same);
    }

    #[test]
    fn test_compute_cor_centers_blended_vertices_on_joint() {
        let mut data = strip();

        compute_cor(&mut data, 0.1, 0.1);

        let centers = &data.centers_of_rotation;
        assert_eq!(centers.len(), 6);
        // Rigid vertices keep themselves as center.
        assert_eq!(centers[0], Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(centers[5], Vec3::new(2.0, 1.0, 0.0));
        // Blended vertices sit on the joint, symmetric in X.
        assert_relative_eq!(centers[2].x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(centers[3].x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(centers[2], centers[3], epsilon = 1e-5);
    }

    #[test]
    fn test_identity_pose_keeps_vertices() {
        let mut data = strip();
        compute_cor(&mut data, 0.1, 0.1);
        let mut output = Vec::new();

        cor_skinning(
            &data.reference_mesh.vertices,
            &identity_pose(2),
            &data.weights,
            &data.centers_of_rotation,
            &mut output,
        );

        for (skinned, original) in output.iter().zip(&data.reference_mesh.vertices) {
            assert_relative_eq!(*skinned, *original, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_rigid_vertices_follow_their_bone() {
        let mut data = strip();
        compute_cor(&mut data, 0.1, 0.1);
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), HALF_PI);
        let pose = vec![Transform::identity(), Transform::from_rotation(rotation)];
        let mut output = Vec::new();

        cor_skinning(
            &data.reference_mesh.vertices,
            &pose,
            &data.weights,
            &data.centers_of_rotation,
            &mut output,
        );

        assert_relative_eq!(output[0], Vec3::new(-2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(output[4], rotation * Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(output[5], rotation * Vec3::new(2.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_unweighted_vertex_stays_in_place() {
        let weights = WeightMatrix::zeros(1, 1);
        let mut output = Vec::new();

        cor_skinning(
            &[Vec3::new(1.0, 2.0, 3.0)],
            &[Transform::from_position(Vec3::x())],
            &weights,
            &[Vec3::zeros()],
            &mut output,
        );

        assert_eq!(output, vec![Vec3::new(1.0, 2.0, 3.0)]);
    }
}
