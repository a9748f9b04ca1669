//! ECS Systems module

pub mod skinning_system;

pub use skinning_system::SkinningSystem;
