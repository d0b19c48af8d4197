//! The per-type conversion contract.

use std::any::{Any, TypeId};

use crate::error::{MarshallError, NodeError, RegistryError, UnmarshallError};
use crate::marshall::marshall_context::MarshallContext;
use crate::marshall::registry::TypeRegistryBuilder;
use crate::marshall::unmarshall_context::UnmarshallContext;
use crate::marshall::value::{DynValue, TypedValue};
use crate::marshall::{TYPE_PROPERTY, VALUE_PROPERTY};
use crate::node::Node;

/// Converts values of one concrete type to and from nodes.
///
/// Implementors supply the non-null encoders; absence (`None` / `null`) is
/// handled once by the provided methods, independent of the type.
pub trait Marshaller: Send + Sync + 'static {
    type Value: TypedValue + Clone;

    /// The stable discriminator written into type-tagged documents.
    /// Changing it breaks every document persisted with the old name.
    fn type_name(&self) -> &'static str;

    /// Whether the plain encoding is ambiguous without a type tag.
    /// Self-describing encodings (booleans, doubles, strings) return `false`.
    fn requires_type_name(&self) -> bool {
        true
    }

    fn marshall_non_null(
        &self,
        value: &Self::Value,
        context: &MarshallContext,
    ) -> Result<Node, MarshallError>;

    fn unmarshall_non_null(
        &self,
        node: &Node,
        context: &UnmarshallContext,
    ) -> Result<Self::Value, UnmarshallError>;

    fn marshall(
        &self,
        value: Option<&Self::Value>,
        context: &MarshallContext,
    ) -> Result<Node, MarshallError> {
        match value {
            None => Ok(Node::null()),
            Some(value) => self.marshall_non_null(value, context),
        }
    }

    /// Like [`marshall`](Marshaller::marshall), wrapped as
    /// `{"type": <type_name>, "value": <plain>}` when the type requires a tag.
    fn marshall_with_type(
        &self,
        value: Option<&Self::Value>,
        context: &MarshallContext,
    ) -> Result<Node, MarshallError> {
        let node = self.marshall(value, context)?;
        if node.is_null() || !self.requires_type_name() {
            return Ok(node);
        }
        Ok(wrap_with_type(self.type_name(), node))
    }

    fn unmarshall(
        &self,
        node: &Node,
        context: &UnmarshallContext,
    ) -> Result<Option<Self::Value>, UnmarshallError> {
        if node.is_null() {
            return Ok(None);
        }
        self.unmarshall_non_null(node, context).map(Some)
    }

    /// Inverse of [`marshall_with_type`](Marshaller::marshall_with_type). The
    /// tag is resolved through the context's registry and must name a type
    /// whose values are `Self::Value`.
    fn unmarshall_with_type(
        &self,
        node: &Node,
        context: &UnmarshallContext,
    ) -> Result<Option<Self::Value>, UnmarshallError> {
        match context.unmarshall_with_type(node)? {
            None => Ok(None),
            Some(value) => value
                .downcast::<Self::Value>()
                .map(Some)
                .ok_or_else(|| UnmarshallError::type_mismatch(self.type_name(), node)),
        }
    }

    /// Adds this marshaller to a registry under construction.
    fn register(self, builder: &mut TypeRegistryBuilder) -> Result<(), RegistryError>
    where
        Self: Sized,
    {
        builder.register(self).map(|_| ())
    }
}

pub(crate) fn wrap_with_type(type_name: &str, value: Node) -> Node {
    Node::object_from([
        (TYPE_PROPERTY, Node::string(type_name)),
        (VALUE_PROPERTY, value),
    ])
}

/// Wraps a node-level narrowing failure as a decode failure on `node`.
pub(crate) fn narrow<T>(
    result: Result<T, NodeError>,
    expected: &'static str,
    node: &Node,
) -> Result<T, UnmarshallError> {
    result.map_err(|cause| UnmarshallError::type_mismatch(expected, node).with_source(cause))
}

/// Object-safe view of a [`Marshaller`], as stored in the registry.
pub(crate) trait ErasedMarshaller: Send + Sync {
    fn name(&self) -> &'static str;

    fn tagged(&self) -> bool;

    fn rust_type(&self) -> TypeId;

    fn rust_type_name(&self) -> &'static str;

    /// The implementing marshaller's own type, telling apart two
    /// marshallers bound to the same (type name, value type) pair.
    fn marshaller_type(&self) -> TypeId;

    fn marshaller_type_name(&self) -> &'static str;

    fn marshall_any(&self, value: &dyn Any, context: &MarshallContext)
        -> Result<Node, MarshallError>;

    fn unmarshall_any(
        &self,
        node: &Node,
        context: &UnmarshallContext,
    ) -> Result<DynValue, UnmarshallError>;
}

impl<M: Marshaller> ErasedMarshaller for M {
    fn name(&self) -> &'static str {
        self.type_name()
    }

    fn tagged(&self) -> bool {
        self.requires_type_name()
    }

    fn rust_type(&self) -> TypeId {
        TypeId::of::<M::Value>()
    }

    fn rust_type_name(&self) -> &'static str {
        std::any::type_name::<M::Value>()
    }

    fn marshaller_type(&self) -> TypeId {
        TypeId::of::<M>()
    }

    fn marshaller_type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }

    fn marshall_any(
        &self,
        value: &dyn Any,
        context: &MarshallContext,
    ) -> Result<Node, MarshallError> {
        let value = value
            .downcast_ref::<M::Value>()
            .ok_or(MarshallError::UnsupportedType {
                type_name: std::any::type_name::<M::Value>(),
            })?;
        self.marshall_non_null(value, context)
    }

    fn unmarshall_any(
        &self,
        node: &Node,
        context: &UnmarshallContext,
    ) -> Result<DynValue, UnmarshallError> {
        self.unmarshall_non_null(node, context).map(DynValue::new)
    }
}
