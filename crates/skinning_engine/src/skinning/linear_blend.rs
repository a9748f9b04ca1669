//! Linear blend skinning

use crate::animation::WeightMatrix;
use crate::foundation::math::{Transform, Vec3, Vec3Array};

/// Weighted sum of the bone-transformed reference positions.
///
/// `output[v] = Σ_b W[v][b] * (pose[b] * input[v])`. Weights are used as
/// given: rows that do not sum to one scale the result, and a vertex with no
/// influence lands on the origin.
pub fn linear_blend_skinning(
    input: &[Vec3],
    pose: &[Transform],
    weights: &WeightMatrix,
    output: &mut Vec3Array,
) {
    debug_assert_eq!(input.len(), weights.rows(), "weights are incompatible with the mesh");
    debug_assert_eq!(pose.len(), weights.cols(), "weights are incompatible with the pose");

    output.clear();
    output.resize(input.len(), Vec3::zeros());

    for (bone, transform) in pose.iter().enumerate().take(weights.cols()) {
        for (vertex, weight) in weights.bone_influences(bone) {
            output[vertex] += weight * transform.transform_point(&input[vertex]);
        }
    }
}
