//! Skinning system
//!
//! Owns the skinning components of the world and drives them in two passes
//! per frame: every component computes, then every component commits.

use crate::core::SkinningConfig;
use crate::ecs::{Entity, System, World};
use crate::foundation::collections::{Handle, HandleMap};
use crate::skinning::{SkinningComponent, SkinningError, SkinningType};

/// System driving every [`SkinningComponent`]
pub struct SkinningSystem {
    config: SkinningConfig,
    components: HandleMap<SkinningComponent>,
}

impl SkinningSystem {
    /// Create a system; new components start with `config`
    pub fn new(config: SkinningConfig) -> Self {
        Self {
            config,
            components: HandleMap::new(),
        }
    }

    /// Number of managed components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether no component is managed
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get a component
    pub fn component(&self, handle: Handle) -> Option<&SkinningComponent> {
        self.components.get(handle)
    }

    /// Get a component mutably
    pub fn component_mut(&mut self, handle: Handle) -> Option<&mut SkinningComponent> {
        self.components.get_mut(handle)
    }

    /// Create a skinning component for weights published under `content_id`.
    ///
    /// Binding is attempted right away; if the inputs are not all on the bus
    /// yet, [`System::run`] retries every frame until they are.
    pub fn handle_weights_loading(
        &mut self,
        world: &mut World,
        entity: Entity,
        content_id: &str,
    ) -> Result<Handle, SkinningError> {
        let mut component = SkinningComponent::new(format!("skinning_{content_id}"), entity, &self.config);
        component.handle_weights_loading(content_id, world.messenger_mut())?;
        match component.setup_skinning(world.messenger()) {
            Ok(true) => {}
            Ok(false) => log::debug!("Skinning '{}' deferred until its inputs are published", content_id),
            Err(e) => {
                component.unbind(world.messenger_mut());
                return Err(e);
            }
        }
        Ok(self.components.insert(component))
    }

    /// Remove a component and everything it published
    pub fn remove(&mut self, world: &mut World, handle: Handle) -> Option<SkinningComponent> {
        let mut component = self.components.remove(handle)?;
        component.unbind(world.messenger_mut());
        Some(component)
    }

    /// Switch the algorithm of every component, and of the ones created later
    pub fn set_skinning_type(&mut self, skinning_type: SkinningType) -> Result<(), SkinningError> {
        self.config.skinning_type = skinning_type;
        for component in self.components.values_mut() {
            component.set_skinning_type(skinning_type)?;
        }
        log::info!("Skinning switched to {}", skinning_type);
        Ok(())
    }

    /// Run one frame, reporting the first compute or commit failure.
    ///
    /// Failures are per component: a component whose inputs are inconsistent
    /// stays unbound, one whose compute or commit fails is logged, and every
    /// other component still goes through both phases.
    pub fn update(&mut self, world: &World) -> Result<(), SkinningError> {
        let messenger = world.messenger();
        let mut first_error = None;

        for component in self.components.values_mut().filter(|c| !c.is_ready()) {
            if let Err(e) = component.setup_skinning(messenger) {
                log::warn!("Cannot bind skinning '{}': {}", component.content_id(), e);
            }
        }

        for component in self.components.values_mut().filter(|c| c.is_ready()) {
            if let Err(e) = component.skin(messenger) {
                log::error!("Skinning '{}' failed to compute: {}", component.content_id(), e);
                first_error.get_or_insert(e);
            }
        }

        for component in self.components.values_mut().filter(|c| c.is_ready()) {
            if let Err(e) = component.end_skinning() {
                log::error!("Skinning '{}' failed to commit: {}", component.content_id(), e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl System for SkinningSystem {
    fn name(&self) -> &str {
        "SkinningSystem"
    }

    fn run(&mut self, world: &mut World) {
        if let Err(e) = self.update(world) {
            log::error!("{} frame failed: {}", self.name(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_wait_for_inputs() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut system = SkinningSystem::new(SkinningConfig::default());

        let handle = system.handle_weights_loading(&mut world, entity, "body").unwrap();
        system.run(&mut world);

        assert_eq!(system.len(), 1);
        assert!(!system.component(handle).unwrap().is_ready());
    }

    #[test]
    fn test_set_skinning_type_applies_to_new_components() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut system = SkinningSystem::new(SkinningConfig::default());

        system.set_skinning_type(SkinningType::Dqs).unwrap();
        let handle = system.handle_weights_loading(&mut world, entity, "body").unwrap();

        assert_eq!(system.component(handle).unwrap().skinning_type(), SkinningType::Dqs);
    }

    #[test]
    fn test_remove_unregisters_outputs() {
        let mut world = World::new();
        let entity = world.create_entity();
        let mut system = SkinningSystem::new(SkinningConfig::default());
        let handle = system.handle_weights_loading(&mut world, entity, "body").unwrap();

        assert!(system.remove(&mut world, handle).is_some());

        assert!(system.is_empty());
        assert!(!world.messenger().can_get::<crate::skinning::FrameData>(entity, "body"));
    }
}
