//! GPU packing of the blended dual quaternions
//!
//! Shader-side skinning consumes the per-vertex dual quaternion cache as a
//! storage buffer of `vec4` pairs.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::DualQuat;

/// One dual quaternion laid out as two `vec4`, components in `(x, y, z, w)` order
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuDualQuaternion {
    /// Rotation part
    pub real: [f32; 4],
    /// Translation part
    pub dual: [f32; 4],
}

impl From<&DualQuat> for GpuDualQuaternion {
    fn from(dq: &DualQuat) -> Self {
        Self {
            real: [dq.real.i, dq.real.j, dq.real.k, dq.real.w],
            dual: [dq.dual.i, dq.dual.j, dq.dual.k, dq.dual.w],
        }
    }
}

/// Convert a dual quaternion cache into its GPU layout
pub fn pack_dual_quaternions(dq: &[DualQuat]) -> Vec<GpuDualQuaternion> {
    dq.iter().map(GpuDualQuaternion::from).collect()
}

/// Raw bytes ready for a buffer upload
pub fn as_bytes(packed: &[GpuDualQuaternion]) -> &[u8] {
    bytemuck::cast_slice(packed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Transform, Vec3};

    #[test]
    fn test_identity_packs_w_last() {
        let packed = pack_dual_quaternions(&[Transform::identity().to_dual_quaternion()]);

        assert_eq!(packed[0].real, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(packed[0].dual, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_byte_layout_is_tight() {
        let dq = Transform::from_position(Vec3::new(2.0, 0.0, 0.0)).to_dual_quaternion();
        let packed = pack_dual_quaternions(&[dq, dq]);

        let bytes = as_bytes(&packed);

        assert_eq!(std::mem::size_of::<GpuDualQuaternion>(), 32);
        assert_eq!(bytes.len(), 64);
        // Dual part of a pure translation t is (t/2, 0).
        let dual_x = f32::from_ne_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        assert_eq!(dual_x, 1.0);
    }
}
