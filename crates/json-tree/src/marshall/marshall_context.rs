//! Typed values to nodes.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;

use tracing::trace;

use crate::error::MarshallError;
use crate::marshall::marshaller::{wrap_with_type, ErasedMarshaller};
use crate::marshall::registry::TypeRegistry;
use crate::marshall::value::{DynValue, TypedValue};
use crate::marshall::{ENTRY_KEY, ENTRY_VALUE};
use crate::node::Node;

/// Called with each value and the Object node it was marshalled to; the
/// returned node is used in its place.
pub type ObjectPostProcessor =
    Arc<dyn Fn(&dyn TypedValue, Node) -> Result<Node, MarshallError> + Send + Sync>;

/// Resolves marshallers for values through a [`TypeRegistry`].
///
/// A context is an immutable value: cloning it yields another handle to the
/// same instance, and "setting" a processor returns a new context.
#[derive(Clone)]
pub struct MarshallContext {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<TypeRegistry>,
    object_post_processor: Option<ObjectPostProcessor>,
}

impl MarshallContext {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        MarshallContext {
            inner: Arc::new(Inner {
                registry,
                object_post_processor: None,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.inner.registry
    }

    /// Returns a context that runs `processor` over every Object produced by
    /// [`marshall`](MarshallContext::marshall) and its with-type variants.
    ///
    /// Passing the processor this context already holds returns this context.
    pub fn set_object_post_processor(&self, processor: Option<ObjectPostProcessor>) -> Self {
        let unchanged = match (&self.inner.object_post_processor, &processor) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        if unchanged {
            return self.clone();
        }
        MarshallContext {
            inner: Arc::new(Inner {
                registry: Arc::clone(&self.inner.registry),
                object_post_processor: processor,
            }),
        }
    }

    /// Whether both handles refer to the same context instance.
    pub fn ptr_eq(&self, other: &MarshallContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Marshalls `value` with the marshaller registered for `T`.
    pub fn marshall<T: TypedValue>(&self, value: &T) -> Result<Node, MarshallError> {
        let marshaller = self.resolve(TypeId::of::<T>(), std::any::type_name::<T>())?;
        self.marshall_erased(marshaller, value)
    }

    /// `None` becomes `null`.
    pub fn marshall_optional<T: TypedValue>(&self, value: Option<&T>) -> Result<Node, MarshallError> {
        match value {
            None => Ok(Node::null()),
            Some(value) => self.marshall(value),
        }
    }

    /// Marshalls `value`, tagged with its type name unless its encoding is
    /// self-describing.
    pub fn marshall_with_type<T: TypedValue>(&self, value: &T) -> Result<Node, MarshallError> {
        let marshaller = self.resolve(TypeId::of::<T>(), std::any::type_name::<T>())?;
        self.marshall_with_type_erased(marshaller, value)
    }

    pub fn marshall_with_type_optional<T: TypedValue>(
        &self,
        value: Option<&T>,
    ) -> Result<Node, MarshallError> {
        match value {
            None => Ok(Node::null()),
            Some(value) => self.marshall_with_type(value),
        }
    }

    /// [`marshall_with_type`](MarshallContext::marshall_with_type) for a value
    /// whose concrete type is only known at runtime.
    pub fn marshall_with_type_dyn(&self, value: &DynValue) -> Result<Node, MarshallError> {
        let marshaller = self.resolve(value.value_type_id(), value.value_type_name())?;
        self.marshall_with_type_erased(marshaller, value.as_typed())
    }

    /// An array of plainly marshalled elements.
    pub fn marshall_list<T: TypedValue>(&self, values: &[T]) -> Result<Node, MarshallError> {
        self.marshall_elements(values.iter(), |value| self.marshall(value))
    }

    pub fn marshall_set<T, S>(&self, values: &HashSet<T, S>) -> Result<Node, MarshallError>
    where
        T: TypedValue,
        S: BuildHasher,
    {
        self.marshall_elements(values.iter(), |value| self.marshall(value))
    }

    /// An array of `{"key": .., "value": ..}` objects, one per entry.
    pub fn marshall_map<K, V, S>(&self, map: &HashMap<K, V, S>) -> Result<Node, MarshallError>
    where
        K: TypedValue,
        V: TypedValue,
        S: BuildHasher,
    {
        self.marshall_elements(map.iter(), |(key, value)| {
            Ok(entry(self.marshall(key)?, self.marshall(value)?))
        })
    }

    /// An array of individually type-tagged elements.
    pub fn marshall_with_type_list(&self, values: &[DynValue]) -> Result<Node, MarshallError> {
        self.marshall_with_type_collection(values)
    }

    pub fn marshall_with_type_set<S: BuildHasher>(
        &self,
        values: &HashSet<DynValue, S>,
    ) -> Result<Node, MarshallError> {
        self.marshall_with_type_collection(values)
    }

    /// Like [`marshall_map`](MarshallContext::marshall_map) with every key and
    /// value type-tagged.
    pub fn marshall_with_type_map<S: BuildHasher>(
        &self,
        map: &HashMap<DynValue, DynValue, S>,
    ) -> Result<Node, MarshallError> {
        self.marshall_elements(map.iter(), |(key, value)| {
            Ok(entry(
                self.marshall_with_type_dyn(key)?,
                self.marshall_with_type_dyn(value)?,
            ))
        })
    }

    /// Any sequence of values, each tagged with its own type.
    pub fn marshall_with_type_collection<'a, I>(&self, values: I) -> Result<Node, MarshallError>
    where
        I: IntoIterator<Item = &'a DynValue>,
    {
        self.marshall_elements(values.into_iter(), |value| {
            self.marshall_with_type_dyn(value)
        })
    }

    fn marshall_elements<I, F>(&self, elements: I, marshall: F) -> Result<Node, MarshallError>
    where
        I: Iterator,
        F: Fn(I::Item) -> Result<Node, MarshallError>,
    {
        let elements = elements.map(marshall).collect::<Result<Vec<_>, _>>()?;
        Ok(Node::array_from(elements))
    }

    fn resolve(
        &self,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<&Arc<dyn ErasedMarshaller>, MarshallError> {
        let marshaller = self
            .inner
            .registry
            .by_type(type_id)
            .ok_or(MarshallError::UnsupportedType { type_name })?;
        trace!(rust_type = type_name, type_name = marshaller.name(), "resolved marshaller");
        Ok(marshaller)
    }

    fn marshall_erased(
        &self,
        marshaller: &Arc<dyn ErasedMarshaller>,
        value: &dyn TypedValue,
    ) -> Result<Node, MarshallError> {
        let node = marshaller.marshall_any(value.as_any(), self)?;
        match &self.inner.object_post_processor {
            Some(processor) if node.is_object() => {
                trace!(type_name = marshaller.name(), "applying object post-processor");
                processor(value, node)
            }
            _ => Ok(node),
        }
    }

    fn marshall_with_type_erased(
        &self,
        marshaller: &Arc<dyn ErasedMarshaller>,
        value: &dyn TypedValue,
    ) -> Result<Node, MarshallError> {
        let node = self.marshall_erased(marshaller, value)?;
        if marshaller.tagged() {
            Ok(wrap_with_type(marshaller.name(), node))
        } else {
            Ok(node)
        }
    }
}

fn entry(key: Node, value: Node) -> Node {
    Node::object_from([(ENTRY_KEY, key), (ENTRY_VALUE, value)])
}

impl fmt::Debug for MarshallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarshallContext")
            .field("registry", &self.inner.registry)
            .field(
                "object_post_processor",
                &self.inner.object_post_processor.is_some(),
            )
            .finish()
    }
}
