//! Marshallers for fixed-width numbers.
//!
//! Narrow integers and `f32` travel as JSON numbers and always need a type
//! tag to be told apart from a `double`. `long` and `big-integer` do not fit
//! an f64 exactly, so they travel as decimal strings; integral JSON numbers
//! are still accepted on input.

use crate::error::{MarshallError, UnmarshallError};
use crate::marshall::marshaller::{narrow, Marshaller};
use crate::marshall::{MarshallContext, UnmarshallContext};
use crate::node::Node;

/// Converts an f64 to a signed integer type whose range is
/// `[MIN, -MIN)`, failing on a fraction or an out-of-range value.
macro_rules! integral {
    ($value:expr, $ty:ty, $target:expr, $node:expr) => {{
        let value: f64 = $value;
        let min = <$ty>::MIN as f64;
        if value.fract() == 0.0 && value >= min && value < -min {
            Ok(value as $ty)
        } else {
            Err(UnmarshallError::numeric_loss(value, $target, $node))
        }
    }};
}

macro_rules! number_marshaller {
    ($(#[$doc:meta])* $marshaller:ident, $ty:ty, $type_name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $marshaller;

        impl Marshaller for $marshaller {
            type Value = $ty;

            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn marshall_non_null(&self, value: &$ty, _: &MarshallContext) -> Result<Node, MarshallError> {
                Ok(Node::number(f64::from(*value)))
            }

            fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<$ty, UnmarshallError> {
                let value = narrow(node.number_or_fail(), "Number", node)?;
                integral!(value, $ty, $type_name, node)
            }
        }
    };
}

number_marshaller!(
    /// An `i8` as a tagged JSON number.
    ByteMarshaller, i8, "byte"
);
number_marshaller!(ShortMarshaller, i16, "short");
number_marshaller!(IntMarshaller, i32, "int");

/// An `f32` as a tagged JSON number. Finite values beyond the `f32` range
/// fail; precision below it is rounded away.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatMarshaller;

impl Marshaller for FloatMarshaller {
    type Value = f32;

    fn type_name(&self) -> &'static str {
        "float"
    }

    fn marshall_non_null(&self, value: &f32, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::number(f64::from(*value)))
    }

    fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<f32, UnmarshallError> {
        let value = narrow(node.number_or_fail(), "Number", node)?;
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return Err(UnmarshallError::numeric_loss(value, "float", node));
        }
        Ok(value as f32)
    }
}

macro_rules! string_number_marshaller {
    ($(#[$doc:meta])* $marshaller:ident, $ty:ty, $type_name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $marshaller;

        impl Marshaller for $marshaller {
            type Value = $ty;

            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn marshall_non_null(&self, value: &$ty, _: &MarshallContext) -> Result<Node, MarshallError> {
                Ok(Node::string(value.to_string()))
            }

            fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<$ty, UnmarshallError> {
                if let Some(value) = node.as_f64() {
                    return integral!(value, $ty, $type_name, node);
                }
                let text = narrow(node.string_or_fail(), "String or Number", node)?;
                text.parse::<$ty>().map_err(|cause| {
                    UnmarshallError::invalid(format!("Invalid {} {text:?}", $type_name), node)
                        .with_source(cause)
                })
            }
        }
    };
}

string_number_marshaller!(
    /// An `i64` as its decimal string.
    LongMarshaller, i64, "long"
);
string_number_marshaller!(
    /// An `i128` as its decimal string.
    BigIntegerMarshaller, i128, "big-integer"
);
