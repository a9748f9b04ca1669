//! Algorithm dispatch
//!
//! A closed enum rather than a trait object: the set of algorithms is fixed
//! and each variant carries the scratch state only it needs.

use crate::core::CorConfig;
use crate::foundation::math::{zero_dual_quaternion, DualQuat, Transform, Vec3Array};

use super::{
    compute_cor, compute_dq, cor_skinning, dual_quaternion_skinning, linear_blend_skinning,
    RefData, SkinningType,
};

/// Selected skinning algorithm and its per-algorithm state
#[derive(Debug, Clone, PartialEq)]
pub enum SkinningMethod {
    /// Linear blend skinning, stateless
    Linear,
    /// Dual-quaternion skinning with its per-vertex blend buffer
    DualQuaternion {
        /// One blended dual quaternion per vertex, refreshed every deform
        blended: Vec<DualQuat>,
    },
    /// Center-of-rotation skinning; centers live in [`RefData`]
    RotationCenter,
}

impl SkinningMethod {
    /// Method for `kind`, without any buffer allocated yet
    pub fn new(kind: SkinningType) -> Self {
        match kind {
            SkinningType::Lbs => Self::Linear,
            SkinningType::Dqs => Self::DualQuaternion { blended: Vec::new() },
            SkinningType::Cor => Self::RotationCenter,
        }
    }

    /// Algorithm implemented by this method
    pub fn kind(&self) -> SkinningType {
        match self {
            Self::Linear => SkinningType::Lbs,
            Self::DualQuaternion { .. } => SkinningType::Dqs,
            Self::RotationCenter => SkinningType::Cor,
        }
    }

    /// Allocate whatever the algorithm needs and is still missing.
    ///
    /// Returns `true` when something was initialized. Calling it again is a
    /// no-op, so this is safe to run before every deform.
    pub fn prepare(&mut self, ref_data: &mut RefData, cor: &CorConfig) -> bool {
        match self {
            Self::Linear => false,
            Self::DualQuaternion { blended } => {
                if blended.is_empty() {
                    blended.resize(ref_data.weights.rows(), zero_dual_quaternion());
                    true
                } else {
                    false
                }
            }
            Self::RotationCenter => {
                if ref_data.centers_of_rotation.is_empty() {
                    compute_cor(ref_data, cor.similarity_sigma, cor.weight_epsilon);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Deform the reference vertices with `relative_pose` into `output`.
    ///
    /// [`SkinningMethod::prepare`] must have run for the center-of-rotation
    /// variant.
    pub fn deform(&mut self, ref_data: &RefData, relative_pose: &[Transform], output: &mut Vec3Array) {
        let vertices = &ref_data.reference_mesh.vertices;
        match self {
            Self::Linear => linear_blend_skinning(vertices, relative_pose, &ref_data.weights, output),
            Self::DualQuaternion { blended } => {
                compute_dq(relative_pose, &ref_data.weights, blended);
                dual_quaternion_skinning(vertices, blended, output);
            }
            Self::RotationCenter => cor_skinning(
                vertices,
                relative_pose,
                &ref_data.weights,
                &ref_data.centers_of_rotation,
                output,
            ),
        }
    }

    /// Blend buffer of the last deform, for the dual-quaternion variant
    pub fn blended_dual_quaternions(&self) -> Option<&[DualQuat]> {
        match self {
            Self::DualQuaternion { blended } => Some(blended),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{identity_pose, WeightMatrix};
    use crate::foundation::math::Vec3;
    use crate::geometry::TriangleMesh;

    fn ref_data() -> RefData {
        RefData {
            reference_mesh: TriangleMesh::with_computed_normals(
                vec![Vec3::zeros(), Vec3::x(), Vec3::y()],
                vec![[0, 1, 2]],
            ),
            ref_pose: identity_pose(1),
            weights: WeightMatrix::from_rows(1, &[vec![1.0], vec![1.0], vec![1.0]]),
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_round_trips() {
        for kind in [SkinningType::Lbs, SkinningType::Dqs, SkinningType::Cor] {
            assert_eq!(SkinningMethod::new(kind).kind(), kind);
        }
    }

    #[test]
    fn test_prepare_runs_once() {
        let mut data = ref_data();
        let config = CorConfig::default();
        let mut dqs = SkinningMethod::new(SkinningType::Dqs);
        let mut cor = SkinningMethod::new(SkinningType::Cor);

        assert!(dqs.prepare(&mut data, &config));
        assert!(!dqs.prepare(&mut data, &config));
        assert_eq!(dqs.blended_dual_quaternions().map(<[_]>::len), Some(3));

        assert!(cor.prepare(&mut data, &config));
        assert!(!cor.prepare(&mut data, &config));
        assert_eq!(data.centers_of_rotation.len(), 3);

        assert!(!SkinningMethod::new(SkinningType::Lbs).prepare(&mut data, &config));
    }

    #[test]
    fn test_every_method_is_neutral_under_identity() {
        let mut data = ref_data();
        let config = CorConfig::default();

        for kind in [SkinningType::Lbs, SkinningType::Dqs, SkinningType::Cor] {
            let mut method = SkinningMethod::new(kind);
            method.prepare(&mut data, &config);
            let mut output = Vec::new();

            method.deform(&data, &identity_pose(1), &mut output);

            for (skinned, original) in output.iter().zip(&data.reference_mesh.vertices) {
                approx::assert_relative_eq!(*skinned, *original, epsilon = 1e-6);
            }
        }
    }
}
