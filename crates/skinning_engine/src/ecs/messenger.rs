//! Component message bus
//!
//! Components never hold references to each other. Instead a producer
//! registers typed callbacks under `(entity, id)` and consumers look them up
//! by the same key:
//!
//! - **outputs** (`register_output`): read-only getters, consumed with
//!   `can_get` / `get` / `getter_callback`
//! - **inputs** (`register_input`): setters, consumed with `can_set` / `set`
//! - **read/write** (`register_read_write`): shared data a consumer may
//!   mutate in place, consumed with `can_rw` / `rw_callback`
//!
//! Entries are keyed by type as well, so the same id can carry a mesh, its
//! skeleton and a reset flag at the same time.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::Entity;
use crate::foundation::collections::Shared;

/// Read-only accessor registered by a producer
pub type Getter<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Write accessor registered by a producer
pub type Setter<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Data a consumer may mutate in place
pub type ReadWrite<T> = Shared<T>;

/// Kinds of registered callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Getter
    Output,
    /// Setter
    Input,
    /// Shared read/write data
    ReadWrite,
}

impl std::fmt::Display for CallbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Output => "output",
            Self::Input => "input",
            Self::ReadWrite => "read/write",
        };
        f.write_str(name)
    }
}

/// Message bus errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessengerError {
    /// Nothing registered under the key
    #[error("No {kind} of type {type_name} registered for entity {entity} under '{id}'")]
    NotFound {
        /// Callback kind looked up
        kind: CallbackKind,
        /// Entity id
        entity: u32,
        /// String id
        id: String,
        /// Rust type name of the payload
        type_name: &'static str,
    },

    /// Key already owned by another component
    #[error("{kind} of type {type_name} for entity {entity} under '{id}' is already owned by '{owner}'")]
    AlreadyRegistered {
        /// Callback kind registered
        kind: CallbackKind,
        /// Entity id
        entity: u32,
        /// String id
        id: String,
        /// Rust type name of the payload
        type_name: &'static str,
        /// Current owner
        owner: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    entity: Entity,
    type_id: TypeId,
    id: String,
}

impl Key {
    fn new<T: 'static>(entity: Entity, id: &str) -> Self {
        Self {
            entity,
            type_id: TypeId::of::<T>(),
            id: id.to_string(),
        }
    }
}

struct Entry {
    owner: String,
    callback: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
struct CallbackTable {
    entries: HashMap<Key, Entry>,
}

impl CallbackTable {
    fn insert<T: 'static, C: Any + Send + Sync>(
        &mut self,
        kind: CallbackKind,
        entity: Entity,
        owner: &str,
        id: &str,
        callback: C,
    ) -> Result<(), MessengerError> {
        let key = Key::new::<T>(entity, id);
        if let Some(existing) = self.entries.get(&key) {
            if existing.owner != owner {
                return Err(MessengerError::AlreadyRegistered {
                    kind,
                    entity: entity.id(),
                    id: id.to_string(),
                    type_name: type_name::<T>(),
                    owner: existing.owner.clone(),
                });
            }
            log::debug!("Replacing {} '{}' for entity {} (owner '{}')", kind, id, entity.id(), owner);
        }
        self.entries.insert(
            key,
            Entry {
                owner: owner.to_string(),
                callback: Box::new(callback),
            },
        );
        Ok(())
    }

    fn lookup<T: 'static, C: Any + Clone>(
        &self,
        kind: CallbackKind,
        entity: Entity,
        id: &str,
    ) -> Result<C, MessengerError> {
        self.entries
            .get(&Key::new::<T>(entity, id))
            .and_then(|entry| entry.callback.downcast_ref::<C>())
            .cloned()
            .ok_or_else(|| MessengerError::NotFound {
                kind,
                entity: entity.id(),
                id: id.to_string(),
                type_name: type_name::<T>(),
            })
    }

    fn contains<T: 'static>(&self, entity: Entity, id: &str) -> bool {
        self.entries.contains_key(&Key::new::<T>(entity, id))
    }

    fn remove_owner(&mut self, entity: Entity, owner: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, entry| !(key.entity == entity && entry.owner == owner));
        before - self.entries.len()
    }
}

/// Registry of typed callbacks keyed by entity and string id
#[derive(Default)]
pub struct ComponentMessenger {
    outputs: CallbackTable,
    inputs: CallbackTable,
    read_writes: CallbackTable,
}

impl ComponentMessenger {
    /// Create an empty messenger
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a getter for `T` under `(entity, id)`
    pub fn register_output<T: 'static>(
        &mut self,
        entity: Entity,
        owner: &str,
        id: &str,
        getter: impl Fn() -> T + Send + Sync + 'static,
    ) -> Result<(), MessengerError> {
        let getter: Getter<T> = Arc::new(getter);
        self.outputs.insert::<T, _>(CallbackKind::Output, entity, owner, id, getter)
    }

    /// Expose a setter for `T` under `(entity, id)`
    pub fn register_input<T: 'static>(
        &mut self,
        entity: Entity,
        owner: &str,
        id: &str,
        setter: impl Fn(&T) + Send + Sync + 'static,
    ) -> Result<(), MessengerError> {
        let setter: Setter<T> = Arc::new(setter);
        self.inputs.insert::<T, _>(CallbackKind::Input, entity, owner, id, setter)
    }

    /// Expose shared, mutable data for `T` under `(entity, id)`
    pub fn register_read_write<T: Send + Sync + 'static>(
        &mut self,
        entity: Entity,
        owner: &str,
        id: &str,
        data: ReadWrite<T>,
    ) -> Result<(), MessengerError> {
        self.read_writes.insert::<T, _>(CallbackKind::ReadWrite, entity, owner, id, data)
    }

    /// Whether a getter for `T` exists
    pub fn can_get<T: 'static>(&self, entity: Entity, id: &str) -> bool {
        self.outputs.contains::<T>(entity, id)
    }

    /// Whether a setter for `T` exists
    pub fn can_set<T: 'static>(&self, entity: Entity, id: &str) -> bool {
        self.inputs.contains::<T>(entity, id)
    }

    /// Whether read/write data for `T` exists
    pub fn can_rw<T: 'static>(&self, entity: Entity, id: &str) -> bool {
        self.read_writes.contains::<T>(entity, id)
    }

    /// Stable handle to the getter, for consumers polling every frame
    pub fn getter_callback<T: 'static>(&self, entity: Entity, id: &str) -> Result<Getter<T>, MessengerError> {
        self.outputs.lookup::<T, Getter<T>>(CallbackKind::Output, entity, id)
    }

    /// Stable handle to the setter
    pub fn setter_callback<T: 'static>(&self, entity: Entity, id: &str) -> Result<Setter<T>, MessengerError> {
        self.inputs.lookup::<T, Setter<T>>(CallbackKind::Input, entity, id)
    }

    /// Shared handle to read/write data
    pub fn rw_callback<T: Send + Sync + 'static>(
        &self,
        entity: Entity,
        id: &str,
    ) -> Result<ReadWrite<T>, MessengerError> {
        self.read_writes.lookup::<T, ReadWrite<T>>(CallbackKind::ReadWrite, entity, id)
    }

    /// Evaluate the getter for `T`
    pub fn get<T: 'static>(&self, entity: Entity, id: &str) -> Result<T, MessengerError> {
        Ok(self.getter_callback::<T>(entity, id)?())
    }

    /// Push a value through the setter for `T`
    pub fn set<T: 'static>(&self, entity: Entity, id: &str, value: &T) -> Result<(), MessengerError> {
        self.setter_callback::<T>(entity, id)?(value);
        Ok(())
    }

    /// Drop everything `owner` registered for `entity`.
    ///
    /// Returns the number of removed callbacks.
    pub fn unregister_all(&mut self, entity: Entity, owner: &str) -> usize {
        let removed = self.outputs.remove_owner(entity, owner)
            + self.inputs.remove_owner(entity, owner)
            + self.read_writes.remove_owner(entity, owner);
        log::debug!("Unregistered {} callbacks of '{}' for entity {}", removed, owner, entity.id());
        removed
    }
}
