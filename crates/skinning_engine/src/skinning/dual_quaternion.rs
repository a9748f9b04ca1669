//! Dual-quaternion skinning

use crate::animation::WeightMatrix;
use crate::foundation::math::{
    constants::NORM_EPSILON, sign_nz, zero_dual_quaternion, DualQuat, DualQuaternion, Point3,
    Transform, UnitDualQuaternion, Vec3, Vec3Array,
};

/// Blend the bone dual quaternions of every vertex.
///
/// `dq` ends up with one normalized dual quaternion per weight row. Each
/// bone contribution is sign-flipped to the hemisphere of the vertex's first
/// influencing bone so antipodal rotations do not cancel out. Vertices with
/// no influence get the identity.
pub fn compute_dq(pose: &[Transform], weights: &WeightMatrix, dq: &mut Vec<DualQuat>) {
    debug_assert_eq!(pose.len(), weights.cols(), "weights are incompatible with the pose");

    dq.clear();
    dq.resize(weights.rows(), zero_dual_quaternion());

    let pose_dq: Vec<DualQuat> = pose.iter().map(Transform::to_dual_quaternion).collect();
    let mut first_non_zero = vec![usize::MAX; weights.rows()];

    for (bone, bone_dq) in pose_dq.iter().enumerate().take(weights.cols()) {
        for (vertex, weight) in weights.bone_influences(bone) {
            let pivot = first_non_zero[vertex].min(bone);
            first_non_zero[vertex] = pivot;
            let sign = sign_nz(pose_dq[pivot].real.dot(&bone_dq.real));
            accumulate(&mut dq[vertex], bone_dq, weight * sign);
        }
    }

    for blended in dq.iter_mut() {
        *blended = normalized_or_identity(blended);
    }
}

/// Apply each vertex's blended dual quaternion to its reference position
pub fn dual_quaternion_skinning(input: &[Vec3], dq: &[DualQuat], output: &mut Vec3Array) {
    debug_assert_eq!(input.len(), dq.len(), "one dual quaternion per vertex is required");

    output.clear();
    output.extend(input.iter().zip(dq).map(|(vertex, blended)| {
        UnitDualQuaternion::new_unchecked(*blended)
            .transform_point(&Point3::from(*vertex))
            .coords
    }));
}

fn accumulate(target: &mut DualQuat, source: &DualQuat, weight: f32) {
    *target = DualQuaternion::from_real_and_dual(
        target.real + source.real * weight,
        target.dual + source.dual * weight,
    );
}

fn normalized_or_identity(dq: &DualQuat) -> DualQuat {
    let norm = dq.real.norm();
    if norm > NORM_EPSILON {
        let inv = 1.0 / norm;
        DualQuaternion::from_real_and_dual(dq.real * inv, dq.dual * inv)
    } else {
        UnitDualQuaternion::identity().into_inner()
    }
}
