//! Nodes to typed values.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::trace;

use crate::error::{UnmarshallError, UnmarshallErrorKind};
use crate::marshall::marshaller::{narrow, ErasedMarshaller};
use crate::marshall::registry::TypeRegistry;
use crate::marshall::value::{DynValue, TypedValue};
use crate::marshall::{ENTRY_KEY, ENTRY_VALUE, TYPE_PROPERTY, VALUE_PROPERTY};
use crate::node::Node;
use crate::types::NodeValue;

/// Called with each Object node about to be decoded and the type name of the
/// marshaller that will decode it; the returned node is decoded instead.
pub type PreProcessor =
    Arc<dyn Fn(&Node, &'static str) -> Result<Node, UnmarshallError> + Send + Sync>;

/// Resolves marshallers for nodes through a [`TypeRegistry`].
///
/// Like [`MarshallContext`](crate::marshall::MarshallContext), an immutable
/// value shared by cheap clones.
#[derive(Clone)]
pub struct UnmarshallContext {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<TypeRegistry>,
    pre_processor: Option<PreProcessor>,
}

impl UnmarshallContext {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        UnmarshallContext {
            inner: Arc::new(Inner {
                registry,
                pre_processor: None,
            }),
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.inner.registry
    }

    /// Returns a context that passes every Object through `processor` before
    /// its marshaller sees it, e.g. to upgrade documents written by an older
    /// schema.
    ///
    /// Passing the processor this context already holds returns this context.
    pub fn set_pre_processor(&self, processor: Option<PreProcessor>) -> Self {
        let unchanged = match (&self.inner.pre_processor, &processor) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        if unchanged {
            return self.clone();
        }
        UnmarshallContext {
            inner: Arc::new(Inner {
                registry: Arc::clone(&self.inner.registry),
                pre_processor: processor,
            }),
        }
    }

    pub fn ptr_eq(&self, other: &UnmarshallContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The Rust type registered under `type_name`.
    pub fn registered_type(&self, type_name: &str) -> Option<TypeId> {
        self.inner.registry.registered_type(type_name)
    }

    /// The type name `T` is registered under.
    pub fn registered_type_name<T: 'static>(&self) -> Option<&'static str> {
        self.inner.registry.type_name_of::<T>()
    }

    /// Decodes `node` as a `T`; `null` yields `None`.
    pub fn unmarshall<T: TypedValue + Clone>(&self, node: &Node) -> Result<Option<T>, UnmarshallError> {
        if node.is_null() {
            return Ok(None);
        }
        self.unmarshall_non_null(node).map(Some)
    }

    /// Decodes an array of plainly marshalled elements. `null` yields an
    /// empty list.
    pub fn unmarshall_list<T: TypedValue + Clone>(&self, node: &Node) -> Result<Vec<T>, UnmarshallError> {
        self.elements(node)?
            .iter()
            .map(|element| self.unmarshall_element(element))
            .collect()
    }

    pub fn unmarshall_set<T>(&self, node: &Node) -> Result<HashSet<T>, UnmarshallError>
    where
        T: TypedValue + Clone + Eq + Hash,
    {
        self.elements(node)?
            .iter()
            .map(|element| self.unmarshall_element(element))
            .collect()
    }

    /// Decodes an array of `{"key": .., "value": ..}` entries.
    pub fn unmarshall_map<K, V>(&self, node: &Node) -> Result<HashMap<K, V>, UnmarshallError>
    where
        K: TypedValue + Clone + Eq + Hash,
        V: TypedValue + Clone,
    {
        self.elements(node)?
            .iter()
            .map(|entry| {
                let (key, value) = entry_parts(entry)?;
                Ok((self.unmarshall_element(&key)?, self.unmarshall_element(&value)?))
            })
            .collect()
    }

    /// Decodes a value whose type is given by the node itself.
    ///
    /// Booleans, numbers and strings decode to `bool`, `f64` and `String`.
    /// Objects must be exactly `{"type": <type name>, "value": <value>}`.
    /// Arrays never hold a single typed value and always fail.
    pub fn unmarshall_with_type(&self, node: &Node) -> Result<Option<DynValue>, UnmarshallError> {
        match node.value() {
            NodeValue::Null => Ok(None),
            NodeValue::Boolean(value) => Ok(Some(DynValue::new(value))),
            NodeValue::Number(value) => Ok(Some(DynValue::new(value))),
            NodeValue::String(value) => Ok(Some(DynValue::new(value.to_string()))),
            NodeValue::Array(_) => Err(UnmarshallError::new(UnmarshallErrorKind::ArrayNotTyped, node)),
            NodeValue::Object(properties) => {
                let mut type_name = None;
                let mut value = None;
                for (name, property) in properties {
                    match name.as_str() {
                        TYPE_PROPERTY => type_name = Some(property),
                        VALUE_PROPERTY => value = Some(property),
                        _ => return Err(UnmarshallError::unknown_property_present(name.as_str(), node)),
                    }
                }
                let type_name = type_name
                    .ok_or_else(|| UnmarshallError::required_property_missing(TYPE_PROPERTY, node))?;
                let value = value
                    .ok_or_else(|| UnmarshallError::required_property_missing(VALUE_PROPERTY, node))?;
                let marshaller = self.resolve_type_name(&type_name, node)?;
                if value.is_null() {
                    return Ok(None);
                }
                self.unmarshall_erased(marshaller, &value).map(Some)
            }
        }
    }

    /// Decodes an array whose elements each carry their own type.
    pub fn unmarshall_with_type_list(&self, node: &Node) -> Result<Vec<DynValue>, UnmarshallError> {
        self.elements(node)?
            .iter()
            .map(|element| self.unmarshall_with_type_element(element))
            .collect()
    }

    pub fn unmarshall_with_type_set(&self, node: &Node) -> Result<HashSet<DynValue>, UnmarshallError> {
        self.elements(node)?
            .iter()
            .map(|element| self.unmarshall_with_type_element(element))
            .collect()
    }

    pub fn unmarshall_with_type_map(
        &self,
        node: &Node,
    ) -> Result<HashMap<DynValue, DynValue>, UnmarshallError> {
        self.elements(node)?
            .iter()
            .map(|entry| {
                let (key, value) = entry_parts(entry)?;
                Ok((
                    self.unmarshall_with_type_element(&key)?,
                    self.unmarshall_with_type_element(&value)?,
                ))
            })
            .collect()
    }

    /// Decodes `node` as the type named by the string property `property` of
    /// `source`, for documents that keep the type name beside the value
    /// instead of wrapping it.
    pub fn unmarshall_with_type_property(
        &self,
        property: &str,
        source: &Node,
        node: &Node,
    ) -> Result<Option<DynValue>, UnmarshallError> {
        let type_name = source
            .get(property)
            .map_err(|cause| UnmarshallError::required_property_missing(property, source).with_source(cause))?;
        let marshaller = self.resolve_type_name(&type_name, source)?;
        if node.is_null() {
            return Ok(None);
        }
        self.unmarshall_erased(marshaller, node).map(Some)
    }

    fn unmarshall_non_null<T: TypedValue + Clone>(&self, node: &Node) -> Result<T, UnmarshallError> {
        let marshaller = self
            .inner
            .registry
            .by_type(TypeId::of::<T>())
            .ok_or_else(|| {
                UnmarshallError::new(
                    UnmarshallErrorKind::UnsupportedType(std::any::type_name::<T>()),
                    node,
                )
            })?;
        trace!(type_name = marshaller.name(), "resolved marshaller");
        self.unmarshall_erased(marshaller, node)?
            .downcast::<T>()
            .ok_or_else(|| UnmarshallError::type_mismatch(marshaller.name(), node))
    }

    fn unmarshall_element<T: TypedValue + Clone>(&self, element: &Node) -> Result<T, UnmarshallError> {
        if element.is_null() {
            return Err(UnmarshallError::new(UnmarshallErrorKind::NullElement, element));
        }
        self.unmarshall_non_null(element)
    }

    fn unmarshall_with_type_element(&self, element: &Node) -> Result<DynValue, UnmarshallError> {
        self.unmarshall_with_type(element)?
            .ok_or_else(|| UnmarshallError::new(UnmarshallErrorKind::NullElement, element))
    }

    fn unmarshall_erased(
        &self,
        marshaller: &Arc<dyn ErasedMarshaller>,
        node: &Node,
    ) -> Result<DynValue, UnmarshallError> {
        match &self.inner.pre_processor {
            Some(processor) if node.is_object() => {
                trace!(type_name = marshaller.name(), "applying pre-processor");
                let node = processor(node, marshaller.name())?;
                marshaller.unmarshall_any(&node, self)
            }
            _ => marshaller.unmarshall_any(node, self),
        }
    }

    fn resolve_type_name(
        &self,
        type_name: &Node,
        source: &Node,
    ) -> Result<&Arc<dyn ErasedMarshaller>, UnmarshallError> {
        let type_name = type_name
            .as_str()
            .ok_or_else(|| UnmarshallError::new(UnmarshallErrorKind::InvalidTypeName, source))?;
        let marshaller = self.inner.registry.by_name(type_name).ok_or_else(|| {
            UnmarshallError::new(UnmarshallErrorKind::UnknownType(type_name.to_string()), source)
        })?;
        trace!(type_name, "resolved marshaller");
        Ok(marshaller)
    }

    /// The elements of a collection node; `null` is the empty collection.
    fn elements(&self, node: &Node) -> Result<Vec<Node>, UnmarshallError> {
        if node.is_null() {
            return Ok(Vec::new());
        }
        narrow(node.array_or_fail(), "Array", node)
    }
}

/// Splits a map entry object into its key and value nodes.
fn entry_parts(entry: &Node) -> Result<(Node, Node), UnmarshallError> {
    let properties = narrow(entry.object_or_fail(), "Object", entry)?;
    if let Some(unknown) = properties
        .keys()
        .find(|name| !matches!(name.as_str(), ENTRY_KEY | ENTRY_VALUE))
    {
        return Err(UnmarshallError::unknown_property_present(unknown.as_str(), entry));
    }
    let part = |name: &str| {
        properties
            .get(name)
            .cloned()
            .ok_or_else(|| UnmarshallError::required_property_missing(name, entry))
    };
    Ok((part(ENTRY_KEY)?, part(ENTRY_VALUE)?))
}

impl fmt::Debug for UnmarshallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmarshallContext")
            .field("registry", &self.inner.registry)
            .field("pre_processor", &self.inner.pre_processor.is_some())
            .finish()
    }
}
