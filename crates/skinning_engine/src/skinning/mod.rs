//! Skeletal skinning
//!
//! Deforms a reference mesh every frame from the pose of its skeleton.
//!
//! ## Pipeline
//!
//! 1. [`SkinningComponent::setup_skinning`] snapshots the bind data
//!    ([`RefData`]) once skeleton, weights, reference pose and mesh are all
//!    published on the message bus.
//! 2. [`SkinningComponent::skin`] (compute phase) compares the live pose to
//!    the previous one and, when it moved, deforms the reference vertices
//!    with the selected [`SkinningType`].
//! 3. [`SkinningComponent::end_skinning`] (commit phase) writes positions and
//!    recomputed normals into the mesh buffers, or reverts them to the
//!    reference mesh when a reset was requested.
//!
//! ## Algorithms
//!
//! - [`linear_blend_skinning`]: weighted sum of bone-transformed positions
//! - [`dual_quaternion_skinning`]: per-vertex blend of bone dual quaternions
//! - [`cor_skinning`]: quaternion-blended rotation around a precomputed
//!   per-vertex center of rotation

pub mod component;
pub mod data;
pub mod dual_quaternion;
pub mod gpu;
pub mod linear_blend;
pub mod method;
pub mod rotation_center;


pub use component::{SkinningComponent, SkinningInputs};
pub use data::{FrameData, RefData, SkinningState};
pub use dual_quaternion::{compute_dq, dual_quaternion_skinning};
pub use gpu::GpuDualQuaternion;
pub use linear_blend::linear_blend_skinning;
pub use method::SkinningMethod;
pub use rotation_center::{compute_cor, cor_skinning};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::MessengerError;
use crate::foundation::collections::PoisonedLock;

/// Skinning algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinningType {
    /// Linear blend skinning
    #[default]
    Lbs,
    /// Dual-quaternion skinning
    Dqs,
    /// Center-of-rotation skinning
    Cor,
}

impl std::fmt::Display for SkinningType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lbs => "linear blend",
            Self::Dqs => "dual quaternion",
            Self::Cor => "center of rotation",
        };
        f.write_str(name)
    }
}

/// Skinning errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkinningError {
    /// Per-frame update called before a successful setup
    #[error("Skinning of '{0}' is not set up")]
    NotReady(String),

    /// Weight matrix does not match the skeleton
    #[error("Weights are incompatible with bones: {weight_cols} weight columns, {bones} bones")]
    BoneCountMismatch {
        /// Columns of the weight matrix
        weight_cols: usize,
        /// Bones in the skeleton
        bones: usize,
    },

    /// Weight matrix does not match the mesh
    #[error("Weights are incompatible with mesh: {weight_rows} weight rows, {vertices} vertices")]
    VertexCountMismatch {
        /// Rows of the weight matrix
        weight_rows: usize,
        /// Vertices of the reference mesh
        vertices: usize,
    },

    /// Reference pose does not match the skeleton
    #[error("Reference pose has {pose} transforms, skeleton has {bones} bones")]
    RefPoseMismatch {
        /// Transforms in the reference pose
        pose: usize,
        /// Bones in the skeleton
        bones: usize,
    },

    /// Target mesh cannot be written
    #[error("Mesh '{0}' cannot be skinned, it is not deformable")]
    NotDeformable(String),

    /// Message bus lookup failed
    #[error(transparent)]
    Messenger(#[from] MessengerError),

    /// Shared buffer lock poisoned
    #[error(transparent)]
    Poisoned(#[from] PoisonedLock),
}
