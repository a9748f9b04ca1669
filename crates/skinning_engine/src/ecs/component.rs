//! Component trait

use super::Entity;

/// Behaviour attached to an entity.
///
/// Components own their data and publish whatever other systems need
/// through the [`ComponentMessenger`](super::ComponentMessenger); the name
/// doubles as the owner tag of everything they register.
pub trait Component: Send + Sync {
    /// Owner name used when registering callbacks
    fn name(&self) -> &str;

    /// Entity the component is attached to
    fn entity(&self) -> Entity;
}
