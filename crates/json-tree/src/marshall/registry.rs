//! The type registry: type-name tokens and Rust types mapped to marshallers.
//!
//! A registry is assembled once at startup through [`TypeRegistryBuilder`]
//! and then frozen behind an `Arc`. Lookups never lock; nothing can be added
//! after [`build`](TypeRegistryBuilder::build).

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::RegistryError;
use crate::marshall::marshaller::{ErasedMarshaller, Marshaller};

type Entry = Arc<dyn ErasedMarshaller>;

/// Maps each registered type name and Rust type to its marshaller.
pub struct TypeRegistry {
    by_name: HashMap<&'static str, Entry>,
    by_type: HashMap<TypeId, Entry>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder {
            registry: TypeRegistry {
                by_name: HashMap::new(),
                by_type: HashMap::new(),
            },
        }
    }

    pub(crate) fn by_name(&self, type_name: &str) -> Option<&Entry> {
        self.by_name.get(type_name)
    }

    pub(crate) fn by_type(&self, type_id: TypeId) -> Option<&Entry> {
        self.by_type.get(&type_id)
    }

    pub fn contains_type_name(&self, type_name: &str) -> bool {
        self.by_name.contains_key(type_name)
    }

    /// The Rust type registered under `type_name`.
    pub fn registered_type(&self, type_name: &str) -> Option<TypeId> {
        self.by_name.get(type_name).map(|entry| entry.rust_type())
    }

    /// The type name `T` was registered under.
    pub fn type_name_of<T: 'static>(&self) -> Option<&'static str> {
        self.type_name_for(TypeId::of::<T>())
    }

    /// The type name registered for the Rust type `type_id`.
    pub fn type_name_for(&self, type_id: TypeId) -> Option<&'static str> {
        self.by_type.get(&type_id).map(|entry| entry.name())
    }

    /// All registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_names()).finish()
    }
}

/// Collects registrations; [`build`](TypeRegistryBuilder::build) freezes them.
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    /// Registers `marshaller` under its type name and value type.
    ///
    /// Registering the same marshaller again is a no-op. A type name already
    /// bound to another type or another marshaller, or a type already bound
    /// to another name, is a configuration error.
    pub fn register<M: Marshaller>(&mut self, marshaller: M) -> Result<&mut Self, RegistryError> {
        let type_name = marshaller.type_name();
        let type_id = TypeId::of::<M::Value>();
        let rust_type = std::any::type_name::<M::Value>();

        if let Some(existing) = self.registry.by_name.get(type_name) {
            if existing.rust_type() != type_id {
                return Err(RegistryError::DuplicateTypeName {
                    type_name,
                    existing: existing.rust_type_name(),
                    rejected: rust_type,
                });
            }
            if existing.marshaller_type() != TypeId::of::<M>() {
                return Err(RegistryError::DuplicateTypeName {
                    type_name,
                    existing: existing.marshaller_type_name(),
                    rejected: std::any::type_name::<M>(),
                });
            }
            debug!(type_name, rust_type, "type already registered");
            return Ok(self);
        }
        if let Some(existing) = self.registry.by_type.get(&type_id) {
            return Err(RegistryError::DuplicateType {
                rust_type,
                existing: existing.name(),
                rejected: type_name,
            });
        }

        let entry: Entry = Arc::new(marshaller);
        self.registry.by_name.insert(type_name, Arc::clone(&entry));
        self.registry.by_type.insert(type_id, entry);
        debug!(type_name, rust_type, "registered marshaller");
        Ok(self)
    }

    pub fn build(self) -> Arc<TypeRegistry> {
        debug!(types = self.registry.len(), "type registry built");
        Arc::new(self.registry)
    }
}
