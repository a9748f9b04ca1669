//! Entity-Component-System implementation
//!
//! Components never hold references to each other. They publish typed data
//! on the [`ComponentMessenger`] under `(entity, id)` keys and look up what
//! they consume there; systems drive them frame by frame.

pub mod world;
pub mod entity;
pub mod component;
pub mod system;
pub mod messenger;
pub mod components;
pub mod systems;

#[cfg(test)]
mod tests;

pub use world::World;
pub use entity::Entity;
pub use component::Component;
pub use system::System;
pub use messenger::{CallbackKind, ComponentMessenger, Getter, MessengerError, ReadWrite, Setter};
