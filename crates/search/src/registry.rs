//! Entity registry
//!
//! The registry is the fixed, ordered set of entities a search fans out
//! over. Registration order is the default presentation order. Adding an
//! entity to federated search means registering one more descriptor.

use crate::descriptor::EntitySearchDescriptor;
use nimbus_core::{Error, Result};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Ordered, name-indexed set of entity descriptors
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Vec<Arc<EntitySearchDescriptor>>,
    index: FxHashMap<String, usize>,
}

impl EntityRegistry {
    /// Start building a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from descriptors in registration order
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntity`] if two descriptors share a name.
    pub fn new(descriptors: impl IntoIterator<Item = EntitySearchDescriptor>) -> Result<Self> {
        let mut registry = EntityRegistry::default();
        for descriptor in descriptors {
            if registry.index.contains_key(descriptor.name()) {
                return Err(Error::DuplicateEntity(descriptor.name().to_string()));
            }
            registry
                .index
                .insert(descriptor.name().to_string(), registry.entities.len());
            registry.entities.push(Arc::new(descriptor));
        }
        Ok(registry)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is registered
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&Arc<EntitySearchDescriptor>> {
        self.index.get(name).map(|&i| &self.entities[i])
    }

    /// Registration position of `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Descriptor at a registration position
    pub fn at(&self, position: usize) -> Option<&Arc<EntitySearchDescriptor>> {
        self.entities.get(position)
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EntitySearchDescriptor>> {
        self.entities.iter()
    }

    /// Entity names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.entities.iter().map(|d| d.name()).collect()
    }
}

/// Incremental [`EntityRegistry`] construction
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<EntitySearchDescriptor>,
}

impl RegistryBuilder {
    /// Register a descriptor after those already added
    pub fn register(mut self, descriptor: EntitySearchDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Finish the registry
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntity`] if two descriptors share a name.
    pub fn build(self) -> Result<EntityRegistry> {
        EntityRegistry::new(self.descriptors)
    }
}
