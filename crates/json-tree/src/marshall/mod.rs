//! Conversion between typed Rust values and [`Node`](crate::Node) trees.
//!
//! Every convertible type has a [`Marshaller`] registered in a
//! [`TypeRegistry`] under a short, stable type name. Contexts resolve
//! marshallers through the registry, so a marshaller for a compound type can
//! hand its parts back to the context and nest to any depth.
//!
//! # Type tags
//!
//! Values whose plain encoding is ambiguous are written "with type" as
//!
//! ```json
//! {"type": "long", "value": "9007199254740993"}
//! ```
//!
//! Booleans, doubles and strings describe themselves and are never wrapped.
//! Maps are written as an array of `{"key": .., "value": ..}` entries, so keys
//! need not be strings.
//!
//! ```
//! use json_tree::marshall::{basic_registry, DynValue, MarshallContext, UnmarshallContext};
//!
//! let registry = basic_registry().unwrap();
//! let marshall = MarshallContext::new(registry.clone());
//! let unmarshall = UnmarshallContext::new(registry);
//!
//! let node = marshall.marshall_with_type(&42_i64).unwrap();
//! assert_eq!(node.to_text(), r#"{"type": "long", "value": "42"}"#);
//!
//! let value = unmarshall.unmarshall_with_type(&node).unwrap();
//! assert_eq!(value, Some(DynValue::new(42_i64)));
//! ```

use std::sync::Arc;

use crate::error::RegistryError;

mod basic;
mod expression;
mod marshall_context;
mod marshaller;
mod number;
mod registry;
mod unmarshall_context;
mod value;

pub use basic::{
    BooleanMarshaller, CharacterMarshaller, DoubleMarshaller, InvalidLocale, Locale,
    LocaleMarshaller, StringMarshaller, StringName, StringNameMarshaller,
};
pub use expression::{
    register_expressions, AddExpression, BigIntegerExpression, BinaryExpressionMarshaller,
    BooleanExpression, CallExpression, CallExpressionMarshaller, Expression,
    MultiplyExpression, NamedFunctionExpression, NegativeExpression, NotExpression,
    SubtractExpression, TextExpression, UnaryExpressionMarshaller, ValueExpressionMarshaller,
    CALLABLE_PROPERTY, PARAMETERS_PROPERTY,
};
pub use marshall_context::{MarshallContext, ObjectPostProcessor};
pub use marshaller::Marshaller;
pub use number::{
    BigIntegerMarshaller, ByteMarshaller, FloatMarshaller, IntMarshaller, LongMarshaller,
    ShortMarshaller,
};
pub use registry::{TypeRegistry, TypeRegistryBuilder};
pub use unmarshall_context::{PreProcessor, UnmarshallContext};
pub use value::{DynValue, TypedValue};

/// Property of a type-tagged object holding the type name.
pub const TYPE_PROPERTY: &str = "type";

/// Property of a type-tagged object holding the plain encoding.
pub const VALUE_PROPERTY: &str = "value";

/// Property of a map entry holding the key.
pub const ENTRY_KEY: &str = "key";

/// Property of a map entry holding the value.
pub const ENTRY_VALUE: &str = "value";

/// Registers every built-in marshaller: scalars, numbers, locales, names
/// and the expression tree.
pub fn register_basic(builder: &mut TypeRegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register(BooleanMarshaller)?
        .register(DoubleMarshaller)?
        .register(StringMarshaller)?
        .register(CharacterMarshaller)?
        .register(ByteMarshaller)?
        .register(ShortMarshaller)?
        .register(IntMarshaller)?
        .register(FloatMarshaller)?
        .register(LongMarshaller)?
        .register(BigIntegerMarshaller)?
        .register(LocaleMarshaller)?
        .register(StringNameMarshaller)?;
    register_expressions(builder)
}

/// A registry holding only the built-in marshallers.
///
/// Applications with their own types call [`register_basic`] on their own
/// builder instead, then add their marshallers before building.
pub fn basic_registry() -> Result<Arc<TypeRegistry>, RegistryError> {
    let mut builder = TypeRegistry::builder();
    register_basic(&mut builder)?;
    Ok(builder.build())
}
