//! Math utilities and types
//!
//! Provides the fundamental math types used by the animation and skinning
//! modules. Everything is single precision and backed by nalgebra.

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    DualQuaternion,
    UnitDualQuaternion,
    Translation3,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Dual quaternion type used by the skinning blends
pub type DualQuat = DualQuaternion<f32>;

/// Array of 3D vectors (vertex positions, normals, rotation centers)
pub type Vec3Array = Vec<Vec3>;

/// Transform representing position, rotation, and scale
///
/// Composition follows the TRS convention: a point is scaled, then rotated,
/// then translated. Exact inversion through [`Transform::inverse`] assumes
/// uniform scale, which is what bone transforms carry in practice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with only rotation
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Combine this transform with another (`self * other`)
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * (self.scale.component_mul(&other.position)),
            rotation: self.rotation * other.rotation,
            scale: self.scale.component_mul(&other.scale),
        }
    }

    /// Get the inverse transform
    pub fn inverse(&self) -> Transform {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inv_rotation = self.rotation.inverse();
        let inv_position = inv_rotation * (-self.position.component_mul(&inv_scale));

        Transform {
            position: inv_position,
            rotation: inv_rotation,
            scale: inv_scale,
        }
    }

    /// Rigid part of the transform as a dual quaternion.
    ///
    /// Scale is dropped: dual quaternions only encode rotation + translation.
    pub fn to_dual_quaternion(&self) -> DualQuat {
        UnitDualQuaternion::from_parts(Translation3::from(self.position), self.rotation).into_inner()
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Tolerance under which a norm is treated as zero
    pub const NORM_EPSILON: f32 = 1e-8;
}

/// Returns `1.0` for non-negative values and `-1.0` otherwise.
///
/// Unlike `f32::signum`, `-0.0` maps to `1.0`.
pub fn sign_nz(value: f32) -> f32 {
    if value >= 0.0 { 1.0 } else { -1.0 }
}

/// All-zero dual quaternion, the neutral element of a weighted blend.
pub fn zero_dual_quaternion() -> DualQuat {
    DualQuaternion::from_real_and_dual(
        Quaternion::new(0.0, 0.0, 0.0, 0.0),
        Quaternion::new(0.0, 0.0, 0.0, 0.0),
    )
}
