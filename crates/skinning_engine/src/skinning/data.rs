//! Reference and per-frame skinning data

use crate::animation::{Pose, RefPose, Skeleton, WeightMatrix};
use crate::foundation::math::Vec3Array;
use crate::geometry::TriangleMesh;

/// Bind-time snapshot, immutable until the component is bound again.
///
/// `centers_of_rotation` is the only lazily filled member: it stays empty
/// until center-of-rotation skinning is first selected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefData {
    /// Skeleton as it was at bind time
    pub skeleton: Skeleton,
    /// Undeformed mesh
    pub reference_mesh: TriangleMesh,
    /// Model-space bind pose
    pub ref_pose: RefPose,
    /// Skinning weights, `vertices x bones`
    pub weights: WeightMatrix,
    /// Per-vertex centers of rotation
    pub centers_of_rotation: Vec3Array,
}

impl RefData {
    /// Number of vertices of the reference mesh
    pub fn vertex_count(&self) -> usize {
        self.reference_mesh.vertex_count()
    }
}

/// Effective state of the per-frame state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkinningState {
    /// Nothing to commit
    Idle,
    /// A deformation was computed and awaits commit
    SkinningPending,
    /// The mesh must be reverted to the reference and awaits commit
    ResetPending,
}

/// Mutable per-frame state.
///
/// Previous/current slots are swapped at commit rather than copied, so both
/// buffers keep their allocation from frame to frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameData {
    /// Pose committed last frame
    pub previous_pose: Pose,
    /// Pose read this frame
    pub current_pose: Pose,
    /// Positions committed last frame
    pub previous_positions: Vec3Array,
    /// Positions computed this frame
    pub current_positions: Vec3Array,
    /// Normals matching the committed positions
    pub current_normals: Vec3Array,
    /// `current_pose * ref_pose^-1`, per bone
    pub ref_to_current_relative_pose: Pose,
    /// `current_pose * previous_pose^-1`, per bone
    pub prev_to_current_relative_pose: Pose,
    /// A deformation must be committed
    pub do_skinning: bool,
    /// The mesh must be reverted to its reference state
    pub do_reset: bool,
}

impl FrameData {
    /// Initial state for a fresh binding: everything at the reference
    pub fn from_reference(ref_data: &RefData) -> Self {
        let vertices = &ref_data.reference_mesh.vertices;
        Self {
            previous_pose: ref_data.ref_pose.clone(),
            current_pose: ref_data.ref_pose.clone(),
            previous_positions: vertices.clone(),
            current_positions: vertices.clone(),
            current_normals: ref_data.reference_mesh.normals.clone(),
            ref_to_current_relative_pose: Pose::new(),
            prev_to_current_relative_pose: Pose::new(),
            do_skinning: false,
            do_reset: false,
        }
    }

    /// Revert every slot to the reference, keeping allocations
    pub fn reset_to_reference(&mut self, ref_data: &RefData) {
        let mesh = &ref_data.reference_mesh;
        self.current_pose.clone_from(&ref_data.ref_pose);
        self.previous_pose.clone_from(&ref_data.ref_pose);
        self.current_positions.clone_from(&mesh.vertices);
        self.previous_positions.clone_from(&mesh.vertices);
        self.current_normals.clone_from(&mesh.normals);
    }

    /// Current state derived from the two flags
    pub fn state(&self) -> SkinningState {
        if self.do_skinning {
            SkinningState::SkinningPending
        } else if self.do_reset {
            SkinningState::ResetPending
        } else {
            SkinningState::Idle
        }
    }

    /// Rotate previous/current pose and positions after a commit
    pub fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.previous_pose, &mut self.current_pose);
        std::mem::swap(&mut self.previous_positions, &mut self.current_positions);
    }
}
