//! Poses and pose arithmetic

use crate::foundation::math::Transform;

/// Per-bone transforms at one point in time, indexed by bone id
pub type Pose = Vec<Transform>;

/// Pose of a skeleton at bind time, in model space
pub type RefPose = Pose;

/// Pose made of `size` identity transforms
pub fn identity_pose(size: usize) -> Pose {
    vec![Transform::identity(); size]
}

/// Exact per-bone equality of two poses
pub fn are_equal(a: &[Transform], b: &[Transform]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(lhs, rhs)| lhs == rhs)
}

/// Delta taking `reference` to `pose`: `pose[i] * reference[i]^-1`.
///
/// Applying the result to a point expressed in the reference pose yields the
/// point moved along with its bone into `pose`.
pub fn relative_pose(pose: &[Transform], reference: &[Transform]) -> Pose {
    debug_assert_eq!(pose.len(), reference.len(), "poses have different bone counts");
    pose.iter()
        .zip(reference)
        .map(|(current, rest)| current.combine(&rest.inverse()))
        .collect()
}

/// Same as [`relative_pose`], writing into an existing buffer
pub fn relative_pose_into(pose: &[Transform], reference: &[Transform], out: &mut Pose) {
    out.clear();
    out.extend(
        pose.iter()
            .zip(reference)
            .map(|(current, rest)| current.combine(&rest.inverse())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use approx::assert_relative_eq;

    #[test]
    fn test_are_equal_checks_size_and_values() {
        let a = identity_pose(2);
        let mut b = identity_pose(2);

        assert!(are_equal(&a, &b));
        assert!(!are_equal(&a, &identity_pose(3)));

        b[1].position.x = 1e-6;
        assert!(!are_equal(&a, &b));
    }

    #[test]
    fn test_relative_pose_moves_reference_points() {
        let reference = vec![Transform::from_position(Vec3::new(0.0, 1.0, 0.0))];
        let pose = vec![Transform::from_position_rotation(
            Vec3::new(0.0, 1.0, 0.0),
            Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2),
        )];

        let delta = relative_pose(&pose, &reference);

        // A point one unit along x from the joint swings up to the joint's +y.
        let moved = delta[0].transform_point(&Vec3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(moved, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_relative_pose_of_same_pose_is_identity() {
        let pose = vec![Transform::from_position_rotation(
            Vec3::new(3.0, -2.0, 1.0),
            Quat::from_axis_angle(&Vec3::x_axis(), 1.2),
        )];

        let mut delta = Vec::new();
        relative_pose_into(&pose, &pose, &mut delta);

        assert_eq!(delta.len(), 1);
        assert_relative_eq!(delta[0].position, Vec3::zeros(), epsilon = 1e-5);
    }
}
