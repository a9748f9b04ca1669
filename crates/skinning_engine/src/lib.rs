//! # Skinning Engine
//!
//! Skeletal skinning for a component-based 3D scene engine.
//!
//! ## Features
//!
//! - **Three Algorithms**: linear blend, dual-quaternion and center-of-rotation skinning
//! - **Message Bus**: components exchange skeletons, weights and meshes by `(entity, id)`
//! - **Two-Phase Frames**: every deformer computes before any of them commits
//! - **Lazy Initialization**: per-algorithm data is built the first time it is selected
//! - **Config Files**: TOML and RON configuration with defaults for every field
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skinning_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut world = World::new();
//!     let entity = world.create_entity();
//!
//!     let mut skeleton = Skeleton::new("arm");
//!     skeleton.add_bone("shoulder", None, Transform::identity())?;
//!
//!     let mesh = TriangleMesh::with_computed_normals(
//!         vec![Vec3::zeros(), Vec3::x(), Vec3::y()],
//!         vec![[0, 1, 2]],
//!     );
//!     let weights = WeightMatrix::from_rows(1, &[vec![1.0], vec![1.0], vec![1.0]]);
//!
//!     let mesh = MeshComponent::new("mesh", entity, "arm", mesh);
//!     let animation = AnimationComponent::new("animation", entity, "arm", skeleton, weights);
//!     mesh.register(world.messenger_mut())?;
//!     animation.register(world.messenger_mut())?;
//!
//!     let mut skinning = SkinningSystem::new(SkinningConfig::default());
//!     skinning.handle_weights_loading(&mut world, entity, "arm")?;
//!
//!     // Pose the skeleton, then once per frame:
//!     skinning.run(&mut world);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;
pub mod config;
pub mod foundation;
pub mod ecs;

// Skinning pipeline
pub mod animation;
pub mod geometry;
pub mod skinning;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{Pose, RefPose, Skeleton, SpaceType, WeightMatrix},
        core::config::{Config, CorConfig, EngineConfig, LoggingConfig, SkinningConfig},
        ecs::{
            components::{AnimationComponent, MeshComponent},
            systems::SkinningSystem,
            Component, ComponentMessenger, Entity, System, World,
        },
        foundation::math::{DualQuat, Quat, Transform, Vec3, Vec3Array},
        geometry::TriangleMesh,
        skinning::{
            FrameData, RefData, SkinningComponent, SkinningError, SkinningState, SkinningType,
        },
    };
}
