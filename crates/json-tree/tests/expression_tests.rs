//! Expression trees: nesting, wire shapes and malformed documents.
use json_tree::marshall::{
    basic_registry, AddExpression, BigIntegerExpression, BooleanExpression, CallExpression,
    DynValue, Expression, MarshallContext, MultiplyExpression, NamedFunctionExpression,
    NegativeExpression, NotExpression, StringName, SubtractExpression, TextExpression,
    UnmarshallContext,
};
use json_tree::{Node, UnmarshallErrorKind};

fn contexts() -> (MarshallContext, UnmarshallContext) {
    let registry = basic_registry().unwrap();
    (
        MarshallContext::new(registry.clone()),
        UnmarshallContext::new(registry),
    )
}

fn int(value: i128) -> Expression {
    Expression::from(BigIntegerExpression(value))
}

fn round_trip(expression: Expression) -> Node {
    let (marshall, unmarshall) = contexts();
    let node = marshall.marshall_with_type_dyn(&expression.to_dyn()).unwrap();
    let decoded = unmarshall.unmarshall_with_type(&node).unwrap().unwrap();
    assert_eq!(Expression::from_dyn(&decoded), Some(expression));
    node
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn leaves_round_trip() {
    round_trip(int(-5));
    round_trip(Expression::from(BooleanExpression(false)));
    round_trip(Expression::from(TextExpression("hi".into())));
    round_trip(Expression::from(NamedFunctionExpression(StringName::new("sum"))));
}

#[test]
fn nested_arithmetic_round_trips() {
    // -(1 + 2) * (3 - 4)
    let expression = Expression::from(MultiplyExpression::new(
        Expression::from(NegativeExpression(Box::new(Expression::from(
            AddExpression::new(int(1), int(2)),
        )))),
        Expression::from(SubtractExpression::new(int(3), int(4))),
    ));
    round_trip(expression);
}

#[test]
fn not_expression_wraps_its_operand() {
    let node = round_trip(Expression::from(NotExpression(Box::new(Expression::from(
        BooleanExpression(true),
    )))));
    assert_eq!(
        node.to_text(),
        r#"{"type": "not-expression", "value": {"type": "boolean-expression", "value": true}}"#
    );
}

#[test]
fn call_expression_shape() {
    let call = CallExpression::new(
        Expression::from(NamedFunctionExpression(StringName::new("max"))),
        vec![int(1), Expression::from(TextExpression("x".into()))],
    );
    let node = round_trip(Expression::from(call));
    assert_eq!(
        node.get("value").unwrap().to_text(),
        concat!(
            r#"{"callable": {"type": "named-function-expression", "value": "max"}, "#,
            r#""parameters": [{"type": "big-integer-expression", "value": "1"}, "#,
            r#"{"type": "text-expression", "value": "x"}]}"#
        )
    );
}

#[test]
fn call_without_parameters() {
    round_trip(Expression::from(CallExpression::new(
        Expression::from(NamedFunctionExpression(StringName::new("now"))),
        Vec::new(),
    )));
}

#[test]
fn plain_marshall_omits_outer_tag() {
    let (marshall, unmarshall) = contexts();
    let sum = AddExpression::new(int(1), int(2));
    let node = marshall.marshall(&sum).unwrap();
    assert!(node.is_array());
    assert_eq!(unmarshall.unmarshall::<AddExpression>(&node).unwrap(), Some(sum));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn binary_expression_needs_two_operands() {
    let (_, unmarshall) = contexts();
    let node = Node::parse(
        r#"{"type":"add-expression","value":[{"type":"big-integer-expression","value":"1"}]}"#,
    )
    .unwrap();
    let err = unmarshall.unmarshall_with_type(&node).unwrap_err();
    assert_eq!(
        err.kind(),
        &UnmarshallErrorKind::Invalid("Expected 2 operands".to_string())
    );
}

#[test]
fn operand_must_be_an_expression() {
    let (_, unmarshall) = contexts();
    let node = Node::parse(r#"[{"type":"int","value":1},{"type":"int","value":2}]"#).unwrap();
    let err = unmarshall.unmarshall::<AddExpression>(&node).unwrap_err();
    assert!(matches!(
        err.kind(),
        UnmarshallErrorKind::TypeMismatch {
            expected: "Expression"
        }
    ));
}

#[test]
fn call_expression_is_strict() {
    let (_, unmarshall) = contexts();

    let missing = Node::parse(
        r#"{"callable":{"type":"named-function-expression","value":"f"}}"#,
    )
    .unwrap();
    let err = unmarshall.unmarshall::<CallExpression>(&missing).unwrap_err();
    assert_eq!(
        err.kind(),
        &UnmarshallErrorKind::RequiredPropertyMissing("parameters".to_string())
    );

    let extra = Node::parse(
        r#"{"callable":{"type":"named-function-expression","value":"f"},"parameters":[],"x":1}"#,
    )
    .unwrap();
    let err = unmarshall.unmarshall::<CallExpression>(&extra).unwrap_err();
    assert_eq!(err.kind(), &UnmarshallErrorKind::UnknownProperty("x".to_string()));
}

#[test]
fn from_dyn_ignores_non_expressions() {
    assert_eq!(Expression::from_dyn(&DynValue::new(1_i32)), None);
}
