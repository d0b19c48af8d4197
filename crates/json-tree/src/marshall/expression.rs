//! A small expression tree and its marshallers.
//!
//! Each node kind is its own Rust type with its own type name, so a document
//! can hold any mix of them and still be decoded with
//! [`UnmarshallContext::unmarshall_with_type`]. Operands are always written
//! with their type tag, which is what lets the tree nest to any depth.
//!
//! ```
//! use json_tree::marshall::{
//!     basic_registry, AddExpression, BigIntegerExpression, Expression, MarshallContext,
//!     UnmarshallContext,
//! };
//!
//! let registry = basic_registry().unwrap();
//! let sum = AddExpression::new(
//!     Expression::from(BigIntegerExpression(1)),
//!     Expression::from(BigIntegerExpression(2)),
//! );
//!
//! let node = MarshallContext::new(registry.clone()).marshall_with_type(&sum).unwrap();
//! assert_eq!(
//!     node.to_text(),
//!     r#"{"type": "add-expression", "value": [{"type": "big-integer-expression", "value": "1"}, {"type": "big-integer-expression", "value": "2"}]}"#
//! );
//!
//! let decoded = UnmarshallContext::new(registry).unmarshall_with_type(&node).unwrap();
//! assert_eq!(decoded.and_then(|value| value.downcast::<AddExpression>()), Some(sum));
//! ```

use crate::error::{MarshallError, RegistryError, UnmarshallError};
use crate::marshall::basic::{BooleanMarshaller, StringMarshaller, StringName, StringNameMarshaller};
use crate::marshall::marshaller::{narrow, Marshaller};
use crate::marshall::number::BigIntegerMarshaller;
use crate::marshall::registry::TypeRegistryBuilder;
use crate::marshall::value::{DynValue, TypedValue};
use crate::marshall::{MarshallContext, UnmarshallContext};
use crate::node::Node;

/// Property of a call expression holding the expression being called.
pub const CALLABLE_PROPERTY: &str = "callable";

/// Property of a call expression holding the argument array.
pub const PARAMETERS_PROPERTY: &str = "parameters";

/// Any expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    BigInteger(BigIntegerExpression),
    Boolean(BooleanExpression),
    Text(TextExpression),
    NamedFunction(NamedFunctionExpression),
    Negative(NegativeExpression),
    Not(NotExpression),
    Add(AddExpression),
    Subtract(SubtractExpression),
    Multiply(MultiplyExpression),
    Call(CallExpression),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigIntegerExpression(pub i128);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BooleanExpression(pub bool);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextExpression(pub String);

/// A reference to a function by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedFunctionExpression(pub StringName);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NegativeExpression(pub Box<Expression>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotExpression(pub Box<Expression>);

macro_rules! binary_expression {
    ($($name:ident),+) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, Hash)]
            pub struct $name {
                pub left: Box<Expression>,
                pub right: Box<Expression>,
            }

            impl $name {
                pub fn new(left: Expression, right: Expression) -> Self {
                    $name {
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
            }
        )+
    };
}

binary_expression!(AddExpression, SubtractExpression, MultiplyExpression);

/// `callable(parameters...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallExpression {
    pub callable: Box<Expression>,
    pub parameters: Vec<Expression>,
}

impl CallExpression {
    pub fn new(callable: Expression, parameters: Vec<Expression>) -> Self {
        CallExpression {
            callable: Box::new(callable),
            parameters,
        }
    }
}

crate::impl_typed_value!(
    BigIntegerExpression,
    BooleanExpression,
    TextExpression,
    NamedFunctionExpression,
    NegativeExpression,
    NotExpression,
    AddExpression,
    SubtractExpression,
    MultiplyExpression,
    CallExpression,
);

macro_rules! expression_variants {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(expression: $ty) -> Self {
                    Expression::$variant(expression)
                }
            }
        )+

        impl Expression {
            /// The expression held by a type-erased value, if it holds one.
            pub fn from_dyn(value: &DynValue) -> Option<Expression> {
                $(
                    if let Some(expression) = value.downcast_ref::<$ty>() {
                        return Some(Expression::$variant(expression.clone()));
                    }
                )+
                None
            }

            pub fn to_dyn(&self) -> DynValue {
                match self {
                    $(Expression::$variant(expression) => DynValue::new(expression.clone()),)+
                }
            }
        }
    };
}

expression_variants!(
    BigInteger(BigIntegerExpression),
    Boolean(BooleanExpression),
    Text(TextExpression),
    NamedFunction(NamedFunctionExpression),
    Negative(NegativeExpression),
    Not(NotExpression),
    Add(AddExpression),
    Subtract(SubtractExpression),
    Multiply(MultiplyExpression),
    Call(CallExpression),
);

/// Encodes an operand with its type tag.
fn marshall_operand(operand: &Expression, context: &MarshallContext) -> Result<Node, MarshallError> {
    context.marshall_with_type_dyn(&operand.to_dyn())
}

/// Decodes a type-tagged operand, which must be some expression.
fn unmarshall_operand(node: &Node, context: &UnmarshallContext) -> Result<Expression, UnmarshallError> {
    context
        .unmarshall_with_type(node)?
        .as_ref()
        .and_then(Expression::from_dyn)
        .ok_or_else(|| UnmarshallError::type_mismatch("Expression", node))
}

/// Wraps a single value, marshalled plainly with the marshaller registered
/// for `V`.
pub struct ValueExpressionMarshaller<E, V> {
    type_name: &'static str,
    new: fn(V) -> E,
    value: fn(&E) -> &V,
}

impl<E, V> ValueExpressionMarshaller<E, V> {
    pub fn new(type_name: &'static str, new: fn(V) -> E, value: fn(&E) -> &V) -> Self {
        ValueExpressionMarshaller {
            type_name,
            new,
            value,
        }
    }
}

impl<E, V> Marshaller for ValueExpressionMarshaller<E, V>
where
    E: TypedValue + Clone,
    V: TypedValue + Clone,
{
    type Value = E;

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn marshall_non_null(&self, value: &E, context: &MarshallContext) -> Result<Node, MarshallError> {
        context.marshall((self.value)(value))
    }

    fn unmarshall_non_null(&self, node: &Node, context: &UnmarshallContext) -> Result<E, UnmarshallError> {
        let value = context
            .unmarshall::<V>(node)?
            .ok_or_else(|| UnmarshallError::type_mismatch(self.type_name, node))?;
        Ok((self.new)(value))
    }
}

/// One operand, written with its type tag.
pub struct UnaryExpressionMarshaller<E> {
    type_name: &'static str,
    new: fn(Expression) -> E,
    operand: fn(&E) -> &Expression,
}

impl<E> UnaryExpressionMarshaller<E> {
    pub fn new(type_name: &'static str, new: fn(Expression) -> E, operand: fn(&E) -> &Expression) -> Self {
        UnaryExpressionMarshaller {
            type_name,
            new,
            operand,
        }
    }
}

impl<E: TypedValue + Clone> Marshaller for UnaryExpressionMarshaller<E> {
    type Value = E;

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn marshall_non_null(&self, value: &E, context: &MarshallContext) -> Result<Node, MarshallError> {
        marshall_operand((self.operand)(value), context)
    }

    fn unmarshall_non_null(&self, node: &Node, context: &UnmarshallContext) -> Result<E, UnmarshallError> {
        unmarshall_operand(node, context).map(self.new)
    }
}

/// Two operands, written as a two-element array of tagged values.
pub struct BinaryExpressionMarshaller<E> {
    type_name: &'static str,
    new: fn(Expression, Expression) -> E,
    operands: fn(&E) -> (&Expression, &Expression),
}

impl<E> BinaryExpressionMarshaller<E> {
    pub fn new(
        type_name: &'static str,
        new: fn(Expression, Expression) -> E,
        operands: fn(&E) -> (&Expression, &Expression),
    ) -> Self {
        BinaryExpressionMarshaller {
            type_name,
            new,
            operands,
        }
    }
}

impl<E: TypedValue + Clone> Marshaller for BinaryExpressionMarshaller<E> {
    type Value = E;

    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn marshall_non_null(&self, value: &E, context: &MarshallContext) -> Result<Node, MarshallError> {
        let (left, right) = (self.operands)(value);
        Ok(Node::array_from([
            marshall_operand(left, context)?,
            marshall_operand(right, context)?,
        ]))
    }

    fn unmarshall_non_null(&self, node: &Node, context: &UnmarshallContext) -> Result<E, UnmarshallError> {
        match narrow(node.array_or_fail(), "Array", node)?.as_slice() {
            [left, right] => Ok((self.new)(
                unmarshall_operand(left, context)?,
                unmarshall_operand(right, context)?,
            )),
            _ => Err(UnmarshallError::invalid("Expected 2 operands", node)),
        }
    }
}

/// `{"callable": <tagged expression>, "parameters": [<tagged expression>...]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallExpressionMarshaller;

impl Marshaller for CallExpressionMarshaller {
    type Value = CallExpression;

    fn type_name(&self) -> &'static str {
        "call-expression"
    }

    fn marshall_non_null(
        &self,
        value: &CallExpression,
        context: &MarshallContext,
    ) -> Result<Node, MarshallError> {
        let parameters = value
            .parameters
            .iter()
            .map(|parameter| marshall_operand(parameter, context))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::object_from([
            (CALLABLE_PROPERTY, marshall_operand(&value.callable, context)?),
            (PARAMETERS_PROPERTY, Node::array_from(parameters)),
        ]))
    }

    fn unmarshall_non_null(
        &self,
        node: &Node,
        context: &UnmarshallContext,
    ) -> Result<CallExpression, UnmarshallError> {
        let mut callable = None;
        let mut parameters = None;
        for (name, property) in narrow(node.object_or_fail(), "Object", node)? {
            match name.as_str() {
                CALLABLE_PROPERTY => callable = Some(unmarshall_operand(&property, context)?),
                PARAMETERS_PROPERTY => {
                    parameters = Some(
                        narrow(property.array_or_fail(), "Array", &property)?
                            .iter()
                            .map(|parameter| unmarshall_operand(parameter, context))
                            .collect::<Result<Vec<_>, _>>()?,
                    )
                }
                _ => return Err(UnmarshallError::unknown_property_present(name.as_str(), node)),
            }
        }
        let callable = callable
            .ok_or_else(|| UnmarshallError::required_property_missing(CALLABLE_PROPERTY, node))?;
        let parameters = parameters
            .ok_or_else(|| UnmarshallError::required_property_missing(PARAMETERS_PROPERTY, node))?;
        Ok(CallExpression::new(callable, parameters))
    }
}

/// Registers every expression marshaller, along with the value marshallers
/// the leaf expressions delegate to.
pub fn register_expressions(builder: &mut TypeRegistryBuilder) -> Result<(), RegistryError> {
    builder
        .register(BigIntegerMarshaller)?
        .register(BooleanMarshaller)?
        .register(StringMarshaller)?
        .register(StringNameMarshaller)?
        .register(ValueExpressionMarshaller::new(
            "big-integer-expression",
            BigIntegerExpression,
            |e: &BigIntegerExpression| &e.0,
        ))?
        .register(ValueExpressionMarshaller::new(
            "boolean-expression",
            BooleanExpression,
            |e: &BooleanExpression| &e.0,
        ))?
        .register(ValueExpressionMarshaller::new(
            "text-expression",
            TextExpression,
            |e: &TextExpression| &e.0,
        ))?
        .register(ValueExpressionMarshaller::new(
            "named-function-expression",
            NamedFunctionExpression,
            |e: &NamedFunctionExpression| &e.0,
        ))?
        .register(UnaryExpressionMarshaller::new(
            "negative-expression",
            |operand| NegativeExpression(Box::new(operand)),
            |e: &NegativeExpression| &*e.0,
        ))?
        .register(UnaryExpressionMarshaller::new(
            "not-expression",
            |operand| NotExpression(Box::new(operand)),
            |e: &NotExpression| &*e.0,
        ))?
        .register(BinaryExpressionMarshaller::new(
            "add-expression",
            AddExpression::new,
            |e: &AddExpression| (&*e.left, &*e.right),
        ))?
        .register(BinaryExpressionMarshaller::new(
            "subtract-expression",
            SubtractExpression::new,
            |e: &SubtractExpression| (&*e.left, &*e.right),
        ))?
        .register(BinaryExpressionMarshaller::new(
            "multiply-expression",
            MultiplyExpression::new,
            |e: &MultiplyExpression| (&*e.left, &*e.right),
        ))?
        .register(CallExpressionMarshaller)?;
    Ok(())
}
