//! Skinning component
//!
//! Binds to the skeleton, weights, reference pose and mesh published under
//! one content id and deforms the mesh buffers whenever the pose changes.
//! Work is split in a compute phase ([`SkinningComponent::skin`]) and a
//! commit phase ([`SkinningComponent::end_skinning`]) so several components
//! can compute before any of them touches shared mesh data.

use std::sync::Arc;

use crate::animation::{are_equal, relative_pose_into, Pose, RefPose, Skeleton, SpaceType, WeightMatrix};
use crate::core::{CorConfig, SkinningConfig};
use crate::ecs::components::{model_pose_id, normals_id, vertices_id};
use crate::ecs::{Component, ComponentMessenger, Entity, Getter, MessengerError, ReadWrite};
use crate::foundation::collections::Shared;
use crate::foundation::math::{zero_dual_quaternion, DualQuat, Vec3Array};
use crate::geometry::{uniform_normal, TriangleMesh};

use super::{
    compute_dq, FrameData, RefData, SkinningError, SkinningMethod, SkinningState, SkinningType,
};

bitflags::bitflags! {
    /// Bus inputs a skinning component binds to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SkinningInputs: u8 {
        /// Live skeleton
        const SKELETON = 1 << 0;
        /// Weight matrix
        const WEIGHTS = 1 << 1;
        /// Reference pose
        const REF_POSE = 1 << 2;
        /// Triangle mesh
        const MESH = 1 << 3;
    }
}

impl SkinningInputs {
    /// Inputs currently published under `(entity, id)`
    pub fn available(messenger: &ComponentMessenger, entity: Entity, id: &str) -> Self {
        let mut inputs = Self::empty();
        inputs.set(Self::SKELETON, messenger.can_get::<Skeleton>(entity, id));
        inputs.set(Self::WEIGHTS, messenger.can_get::<WeightMatrix>(entity, id));
        inputs.set(Self::REF_POSE, messenger.can_get::<RefPose>(entity, id));
        inputs.set(Self::MESH, messenger.can_get::<TriangleMesh>(entity, id));
        inputs
    }
}

/// Handles obtained from the bus once every input is available
struct Binding {
    model_pose: Getter<Pose>,
    vertices: ReadWrite<Vec3Array>,
    normals: ReadWrite<Vec3Array>,
}

/// Per-entity skinning deformer
pub struct SkinningComponent {
    name: String,
    entity: Entity,
    content_id: String,
    skinning_type: SkinningType,
    method: SkinningMethod,
    cor_config: CorConfig,
    binding: Option<Binding>,
    ref_data: Shared<RefData>,
    frame_data: Shared<FrameData>,
    dual_quaternions: Shared<Vec<DualQuat>>,
}

impl SkinningComponent {
    /// Create an unbound component
    pub fn new(name: impl Into<String>, entity: Entity, config: &SkinningConfig) -> Self {
        Self {
            name: name.into(),
            entity,
            content_id: String::new(),
            skinning_type: config.skinning_type,
            method: SkinningMethod::new(config.skinning_type),
            cor_config: config.center_of_rotation,
            binding: None,
            ref_data: Shared::new(RefData::default()),
            frame_data: Shared::new(FrameData::default()),
            dual_quaternions: Shared::new(Vec::new()),
        }
    }

    /// Content id the component binds to
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    /// Whether [`SkinningComponent::setup_skinning`] succeeded
    pub fn is_ready(&self) -> bool {
        self.binding.is_some()
    }

    /// Selected algorithm
    pub fn skinning_type(&self) -> SkinningType {
        self.skinning_type
    }

    /// Active algorithm state
    pub fn method(&self) -> &SkinningMethod {
        &self.method
    }

    /// Bind-time data; empty until bound
    pub fn ref_data(&self) -> &Shared<RefData> {
        &self.ref_data
    }

    /// Per-frame data; empty until bound
    pub fn frame_data(&self) -> &Shared<FrameData> {
        &self.frame_data
    }

    /// Per-vertex dual quaternions of the last evaluated pose
    pub fn dual_quaternions(&self) -> &Shared<Vec<DualQuat>> {
        &self.dual_quaternions
    }

    /// Pending work of the state machine
    pub fn state(&self) -> Result<SkinningState, SkinningError> {
        Ok(self.frame_data.read()?.state())
    }

    /// Attach to `content_id` and publish the component's outputs
    pub fn handle_weights_loading(
        &mut self,
        content_id: impl Into<String>,
        messenger: &mut ComponentMessenger,
    ) -> Result<(), SkinningError> {
        self.content_id = content_id.into();
        self.setup_io(messenger)?;
        Ok(())
    }

    /// Publish the dual quaternion cache, reference data and frame data
    pub fn setup_io(&self, messenger: &mut ComponentMessenger) -> Result<(), MessengerError> {
        let dual_quaternions = self.dual_quaternions.clone();
        messenger.register_output::<Vec<DualQuat>>(self.entity, &self.name, &self.content_id, move || {
            dual_quaternions.read_unpoisoned().clone()
        })?;

        let ref_data = self.ref_data.clone();
        messenger.register_output::<RefData>(self.entity, &self.name, &self.content_id, move || {
            ref_data.read_unpoisoned().clone()
        })?;

        let frame_data = self.frame_data.clone();
        messenger.register_output::<FrameData>(self.entity, &self.name, &self.content_id, move || {
            frame_data.read_unpoisoned().clone()
        })?;

        Ok(())
    }

    /// Inputs not yet published under the content id
    pub fn missing_inputs(&self, messenger: &ComponentMessenger) -> SkinningInputs {
        SkinningInputs::all() - SkinningInputs::available(messenger, self.entity, &self.content_id)
    }

    /// Bind to the inputs published under the content id.
    ///
    /// Returns `Ok(false)` while skeleton, weights, reference pose or mesh is
    /// still missing; the caller retries later. Inputs that are present but
    /// inconsistent with each other are an error.
    pub fn setup_skinning(&mut self, messenger: &ComponentMessenger) -> Result<bool, SkinningError> {
        let (entity, id) = (self.entity, self.content_id.as_str());

        let missing = self.missing_inputs(messenger);
        if !missing.is_empty() {
            log::debug!("Skinning '{}' on entity {} waits for {:?}", id, entity, missing);
            return Ok(false);
        }

        if !messenger.can_set::<TriangleMesh>(entity, id) {
            return Err(SkinningError::NotDeformable(id.to_string()));
        }

        let skeleton = messenger.getter_callback::<Skeleton>(entity, id)?;
        let model_pose: Getter<Pose> = if messenger.can_get::<Pose>(entity, &model_pose_id(id)) {
            messenger.getter_callback::<Pose>(entity, &model_pose_id(id))?
        } else {
            let skeleton = Arc::clone(&skeleton);
            Arc::new(move || skeleton().get_pose(SpaceType::Model))
        };
        let vertices = messenger.rw_callback::<Vec3Array>(entity, &vertices_id(id))?;
        let normals = messenger.rw_callback::<Vec3Array>(entity, &normals_id(id))?;

        let ref_data = RefData {
            skeleton: skeleton(),
            reference_mesh: messenger.get::<TriangleMesh>(entity, id)?,
            ref_pose: messenger.get::<RefPose>(entity, id)?,
            weights: messenger.get::<WeightMatrix>(entity, id)?,
            centers_of_rotation: Vec3Array::new(),
        };
        validate(&ref_data)?;

        *self.frame_data.write()? = FrameData::from_reference(&ref_data);
        *self.ref_data.write()? = ref_data;
        self.dual_quaternions.write()?.clear();
        self.method = SkinningMethod::new(self.skinning_type);
        self.binding = Some(Binding { model_pose, vertices, normals });
        self.setup_skinning_type(self.skinning_type)?;

        let ref_data = self.ref_data.read()?;
        log::info!(
            "Skinning '{}' bound on entity {}: {} vertices, {} bones, {}",
            self.content_id,
            self.entity,
            ref_data.vertex_count(),
            ref_data.skeleton.size(),
            self.skinning_type
        );
        Ok(true)
    }

    /// Select the algorithm used from the next frame on
    pub fn set_skinning_type(&mut self, skinning_type: SkinningType) -> Result<(), SkinningError> {
        self.skinning_type = skinning_type;
        if self.is_ready() {
            self.setup_skinning_type(skinning_type)?;
        }
        Ok(())
    }

    /// Switch the algorithm and lazily build what it needs.
    ///
    /// The dual quaternion cache is sized the first time DQS is selected and
    /// centers of rotation are computed the first time CoR is; switching back
    /// and forth afterwards reuses them.
    fn setup_skinning_type(&mut self, skinning_type: SkinningType) -> Result<(), SkinningError> {
        if self.method.kind() != skinning_type {
            self.method = SkinningMethod::new(skinning_type);
        }

        let mut ref_data = self.ref_data.write()?;
        if self.method.prepare(&mut ref_data, &self.cor_config) {
            log::debug!("Initialized {} skinning for '{}'", skinning_type, self.content_id);
        }

        if skinning_type == SkinningType::Dqs {
            let mut dual_quaternions = self.dual_quaternions.write()?;
            if dual_quaternions.is_empty() {
                dual_quaternions.resize(ref_data.weights.rows(), zero_dual_quaternion());
            }
        }
        Ok(())
    }

    /// Compute phase.
    ///
    /// Reads the live pose and either schedules a reset (when the reset flag
    /// is raised) or, if the pose moved since the last commit, deforms the
    /// reference vertices into the current position buffer. Nothing visible
    /// to other components changes until [`SkinningComponent::end_skinning`].
    pub fn skin(&mut self, messenger: &ComponentMessenger) -> Result<SkinningState, SkinningError> {
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| SkinningError::NotReady(self.content_id.clone()))?;

        let reset = if messenger.can_get::<bool>(self.entity, &self.content_id) {
            messenger.get::<bool>(self.entity, &self.content_id)?
        } else {
            false
        };

        let mut frame_guard = self.frame_data.write()?;
        let frame = &mut *frame_guard;

        if reset && !frame.do_reset {
            frame.do_reset = true;
            log::trace!("Reset of '{}' scheduled", self.content_id);
            return Ok(frame.state());
        }

        let live_pose = (binding.model_pose)();

        let mut ref_data = self.ref_data.write()?;
        if live_pose.len() != ref_data.ref_pose.len() {
            return Err(SkinningError::RefPoseMismatch {
                pose: ref_data.ref_pose.len(),
                bones: live_pose.len(),
            });
        }

        frame.current_pose = live_pose;

        if are_equal(&frame.current_pose, &frame.previous_pose) {
            return Ok(frame.state());
        }

        frame.do_skinning = true;
        relative_pose_into(&frame.current_pose, &ref_data.ref_pose, &mut frame.ref_to_current_relative_pose);
        relative_pose_into(&frame.current_pose, &frame.previous_pose, &mut frame.prev_to_current_relative_pose);

        self.method.prepare(&mut ref_data, &self.cor_config);
        self.method.deform(&ref_data, &frame.ref_to_current_relative_pose, &mut frame.current_positions);

        let mut dual_quaternions = self.dual_quaternions.write()?;
        match self.method.blended_dual_quaternions() {
            Some(blended) => {
                dual_quaternions.clear();
                dual_quaternions.extend_from_slice(blended);
            }
            None => compute_dq(&frame.ref_to_current_relative_pose, &ref_data.weights, &mut dual_quaternions),
        }

        log::trace!("Skinned '{}' with {}", self.content_id, self.skinning_type);
        Ok(frame.state())
    }

    /// Commit phase.
    ///
    /// Writes the computed positions and their normals into the mesh, or
    /// reverts the mesh to its reference state, then clears the pending flag.
    pub fn end_skinning(&mut self) -> Result<(), SkinningError> {
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| SkinningError::NotReady(self.content_id.clone()))?;

        let mut frame = self.frame_data.write()?;
        if frame.do_skinning {
            let ref_data = self.ref_data.read()?;
            let mut vertices = binding.vertices.write()?;
            let mut normals = binding.normals.write()?;

            vertices.clone_from(&frame.current_positions);
            uniform_normal(&vertices, &ref_data.reference_mesh.triangles, &mut normals);
            frame.current_normals.clone_from(&normals);

            frame.swap_buffers();
            frame.do_skinning = false;
        } else if frame.do_reset {
            let ref_data = self.ref_data.read()?;
            let mut vertices = binding.vertices.write()?;
            let mut normals = binding.normals.write()?;

            vertices.clone_from(&ref_data.reference_mesh.vertices);
            normals.clone_from(&ref_data.reference_mesh.normals);

            frame.reset_to_reference(&ref_data);
            frame.do_reset = false;
            log::debug!("Mesh '{}' reset to its reference state", self.content_id);
        }
        Ok(())
    }

    /// Drop the binding and everything this component published
    pub fn unbind(&mut self, messenger: &mut ComponentMessenger) -> usize {
        self.binding = None;
        messenger.unregister_all(self.entity, &self.name)
    }
}

impl Component for SkinningComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn entity(&self) -> Entity {
        self.entity
    }
}

fn validate(ref_data: &RefData) -> Result<(), SkinningError> {
    let bones = ref_data.skeleton.size();
    if ref_data.weights.cols() != bones {
        return Err(SkinningError::BoneCountMismatch {
            weight_cols: ref_data.weights.cols(),
            bones,
        });
    }
    if ref_data.weights.rows() != ref_data.vertex_count() {
        return Err(SkinningError::VertexCountMismatch {
            weight_rows: ref_data.weights.rows(),
            vertices: ref_data.vertex_count(),
        });
    }
    if ref_data.ref_pose.len() != bones {
        return Err(SkinningError::RefPoseMismatch {
            pose: ref_data.ref_pose.len(),
            bones,
        });
    }
    Ok(())
}
