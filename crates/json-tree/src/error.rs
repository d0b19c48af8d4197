//! Error types for node edits, parsing, marshalling and registry setup.
//!
//! Each failure kind gets its own type so callers can tell a bad call
//! ([`NodeError`]) from bad data ([`UnmarshallError`]) from a startup
//! misconfiguration ([`RegistryError`]). [`JsonError`] unifies them for code
//! that just wants to propagate with `?`.

use std::fmt;

use thiserror::Error;

use crate::node::Node;

/// Errors raised synchronously by node operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    /// An argument was outside the domain the operation accepts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An array element was addressed past the end of the array.
    #[error("Index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The node is not the variant the operation requires.
    /// `node` holds the canonical rendering of the offending node.
    #[error("Node is not a JSON {expected}={node}")]
    InvalidNode { expected: &'static str, node: String },

    /// A failing property lookup on an object.
    #[error("Unknown property {property:?} in {node}")]
    UnknownProperty { property: String, node: String },
}

impl NodeError {
    pub(crate) fn invalid_node(expected: &'static str, node: &Node) -> Self {
        NodeError::InvalidNode {
            expected,
            node: node.to_text(),
        }
    }
}

/// Errors raised while converting a typed value into a node.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarshallError {
    /// No marshaller is registered for the value's runtime type.
    #[error("Unsupported type {type_name}")]
    UnsupportedType { type_name: &'static str },

    /// A marshaller or object post-processor rejected the value.
    #[error("Marshall failed: {message}")]
    Invalid { message: String },
}

/// What went wrong while decoding a node.
#[derive(Debug, Clone, PartialEq)]
pub enum UnmarshallErrorKind {
    /// The requested runtime type has no registered marshaller.
    UnsupportedType(&'static str),
    /// A type tag named a type that is not in the registry.
    UnknownType(String),
    /// The type tag property was present but not a string.
    InvalidTypeName,
    RequiredPropertyMissing(String),
    UnknownProperty(String),
    /// The node variant does not match what the marshaller decodes.
    TypeMismatch { expected: &'static str },
    /// A number could not be represented exactly in the integral target type.
    NumericLoss { value: f64, target: &'static str },
    /// Arrays never hold a single type-tagged value.
    ArrayNotTyped,
    /// A collection element or map entry was `null`.
    NullElement,
    Invalid(String),
}

impl fmt::Display for UnmarshallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmarshallErrorKind::UnsupportedType(t) => write!(f, "Unsupported type {t}"),
            UnmarshallErrorKind::UnknownType(t) => write!(f, "Unknown type {t:?}"),
            UnmarshallErrorKind::InvalidTypeName => f.write_str("Invalid type name"),
            UnmarshallErrorKind::RequiredPropertyMissing(p) => {
                write!(f, "Required property {p:?} missing")
            }
            UnmarshallErrorKind::UnknownProperty(p) => write!(f, "Unknown property {p:?}"),
            UnmarshallErrorKind::TypeMismatch { expected } => {
                write!(f, "Expected {expected}")
            }
            UnmarshallErrorKind::NumericLoss { value, target } => {
                write!(f, "Numeric loss converting {value} to {target}")
            }
            UnmarshallErrorKind::ArrayNotTyped => f.write_str("arrays never hold typed values"),
            UnmarshallErrorKind::NullElement => f.write_str("Collections cannot hold null"),
            UnmarshallErrorKind::Invalid(message) => f.write_str(message),
        }
    }
}

/// A decode failure, carrying the offending node and the underlying cause.
#[derive(Error, Debug, Clone)]
#[error("{kind}={node}")]
pub struct UnmarshallError {
    kind: UnmarshallErrorKind,
    node: Node,
    #[source]
    source: Option<std::sync::Arc<dyn std::error::Error + Send + Sync>>,
}

impl UnmarshallError {
    pub fn new(kind: UnmarshallErrorKind, node: &Node) -> Self {
        UnmarshallError {
            kind,
            node: node.clone(),
            source: None,
        }
    }

    /// Attaches the lower-level error that triggered this failure.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(std::sync::Arc::new(source));
        self
    }

    /// Reports a required property absent from an object being decoded.
    pub fn required_property_missing(property: &str, node: &Node) -> Self {
        Self::new(
            UnmarshallErrorKind::RequiredPropertyMissing(property.to_string()),
            node,
        )
    }

    /// Reports a property a strict decoder does not recognise.
    pub fn unknown_property_present(property: &str, node: &Node) -> Self {
        Self::new(UnmarshallErrorKind::UnknownProperty(property.to_string()), node)
    }

    pub fn type_mismatch(expected: &'static str, node: &Node) -> Self {
        Self::new(UnmarshallErrorKind::TypeMismatch { expected }, node)
    }

    pub fn numeric_loss(value: f64, target: &'static str, node: &Node) -> Self {
        Self::new(UnmarshallErrorKind::NumericLoss { value, target }, node)
    }

    pub fn invalid(message: impl Into<String>, node: &Node) -> Self {
        Self::new(UnmarshallErrorKind::Invalid(message.into()), node)
    }

    pub fn kind(&self) -> &UnmarshallErrorKind {
        &self.kind
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn is_numeric_loss(&self) -> bool {
        matches!(self.kind, UnmarshallErrorKind::NumericLoss { .. })
    }
}

/// Configuration errors detected while building a [`TypeRegistry`](crate::marshall::TypeRegistry).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Type name {type_name:?} already registered for {existing}, cannot register {rejected}")]
    DuplicateTypeName {
        type_name: &'static str,
        existing: &'static str,
        rejected: &'static str,
    },

    #[error("Type {rust_type} already registered as {existing:?}, cannot register as {rejected:?}")]
    DuplicateType {
        rust_type: &'static str,
        existing: &'static str,
        rejected: &'static str,
    },
}

/// Any error produced by json-tree.
#[derive(Error, Debug)]
pub enum JsonError {
    /// The input text was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Marshall(#[from] MarshallError),

    #[error(transparent)]
    Unmarshall(#[from] UnmarshallError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Convenience alias used throughout json-tree.
pub type Result<T> = std::result::Result<T, JsonError>;
