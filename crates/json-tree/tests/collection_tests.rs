//! Lists, sets and maps, plain and with per-element type tags.
use std::collections::{HashMap, HashSet};

use json_tree::marshall::{basic_registry, DynValue, Locale, MarshallContext, UnmarshallContext};
use json_tree::{Node, UnmarshallErrorKind};

fn contexts() -> (MarshallContext, UnmarshallContext) {
    let registry = basic_registry().unwrap();
    (
        MarshallContext::new(registry.clone()),
        UnmarshallContext::new(registry),
    )
}

// ============================================================================
// Plain
// ============================================================================

#[test]
fn list_round_trip() {
    let (marshall, unmarshall) = contexts();
    let list = vec![1_i32, 2, 3];
    let node = marshall.marshall_list(&list).unwrap();
    assert_eq!(node.to_text(), "[1, 2, 3]");
    assert_eq!(unmarshall.unmarshall_list::<i32>(&node).unwrap(), list);
}

#[test]
fn set_round_trip() {
    let (marshall, unmarshall) = contexts();
    let set: HashSet<String> = HashSet::from([String::from("only")]);
    let node = marshall.marshall_set(&set).unwrap();
    assert_eq!(node.to_text(), r#"["only"]"#);
    assert_eq!(unmarshall.unmarshall_set::<String>(&node).unwrap(), set);
}

#[test]
fn map_uses_entry_array() {
    let (marshall, unmarshall) = contexts();
    let map: HashMap<i64, String> = HashMap::from([(7, String::from("seven"))]);
    let node = marshall.marshall_map(&map).unwrap();
    assert_eq!(node.to_text(), r#"[{"key": "7", "value": "seven"}]"#);
    assert_eq!(unmarshall.unmarshall_map::<i64, String>(&node).unwrap(), map);
}

#[test]
fn map_with_non_string_keys() {
    let (marshall, unmarshall) = contexts();
    let en: Locale = "en".parse().unwrap();
    let map: HashMap<Locale, bool> = HashMap::from([(en, true)]);
    let node = marshall.marshall_map(&map).unwrap();
    assert_eq!(unmarshall.unmarshall_map::<Locale, bool>(&node).unwrap(), map);
}

#[test]
fn null_collection_is_empty() {
    let (_, unmarshall) = contexts();
    assert!(unmarshall.unmarshall_list::<i32>(&Node::null()).unwrap().is_empty());
    assert!(unmarshall
        .unmarshall_map::<i64, i64>(&Node::null())
        .unwrap()
        .is_empty());
}

#[test]
fn null_element_fails() {
    let (_, unmarshall) = contexts();
    let err = unmarshall
        .unmarshall_list::<f64>(&Node::parse("[1, null]").unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), &UnmarshallErrorKind::NullElement);
    assert!(err.node().is_null());
    assert_eq!(err.node().index(), Some(1));
}

#[test]
fn list_from_non_array_fails() {
    let (_, unmarshall) = contexts();
    let err = unmarshall
        .unmarshall_list::<f64>(&Node::object())
        .unwrap_err();
    assert!(matches!(err.kind(), UnmarshallErrorKind::TypeMismatch { expected: "Array" }));
}

#[test]
fn map_entry_missing_value_fails() {
    let (_, unmarshall) = contexts();
    let node = Node::parse(r#"[{"key":"1"}]"#).unwrap();
    let err = unmarshall.unmarshall_map::<i64, i64>(&node).unwrap_err();
    assert_eq!(
        err.kind(),
        &UnmarshallErrorKind::RequiredPropertyMissing("value".to_string())
    );
}

#[test]
fn map_entry_with_extra_property_fails() {
    let (_, unmarshall) = contexts();
    let node = Node::parse(r#"[{"key":"1","value":"2","other":3}]"#).unwrap();
    let err = unmarshall.unmarshall_map::<i64, i64>(&node).unwrap_err();
    assert_eq!(
        err.kind(),
        &UnmarshallErrorKind::UnknownProperty("other".to_string())
    );
}

// ============================================================================
// With type
// ============================================================================

#[test]
fn heterogeneous_list_round_trip() {
    let (marshall, unmarshall) = contexts();
    let list = vec![
        DynValue::new(1_i64),
        DynValue::new(true),
        DynValue::new('x'),
        DynValue::new(0.5_f64),
    ];
    let node = marshall.marshall_with_type_list(&list).unwrap();
    assert_eq!(
        node.to_text(),
        r#"[{"type": "long", "value": "1"}, true, {"type": "character", "value": "x"}, 0.5]"#
    );
    assert_eq!(unmarshall.unmarshall_with_type_list(&node).unwrap(), list);
}

#[test]
fn with_type_set_round_trip() {
    let (marshall, unmarshall) = contexts();
    let set = HashSet::from([DynValue::new(3_i16)]);
    let node = marshall.marshall_with_type_set(&set).unwrap();
    assert_eq!(node.to_text(), r#"[{"type": "short", "value": 3}]"#);
    assert_eq!(unmarshall.unmarshall_with_type_set(&node).unwrap(), set);
}

#[test]
fn with_type_map_round_trip() {
    let (marshall, unmarshall) = contexts();
    let map = HashMap::from([(DynValue::new(1_i32), DynValue::new(String::from("one")))]);
    let node = marshall.marshall_with_type_map(&map).unwrap();
    assert_eq!(
        node.to_text(),
        r#"[{"key": {"type": "int", "value": 1}, "value": "one"}]"#
    );
    assert_eq!(unmarshall.unmarshall_with_type_map(&node).unwrap(), map);
}

#[test]
fn with_type_collection_accepts_any_iterator() {
    let (marshall, _) = contexts();
    let values = [DynValue::new(1_i8), DynValue::new(2_i8)];
    let node = marshall.marshall_with_type_collection(values.iter().rev()).unwrap();
    assert_eq!(
        node.to_text(),
        r#"[{"type": "byte", "value": 2}, {"type": "byte", "value": 1}]"#
    );
}

#[test]
fn with_type_null_element_fails() {
    let (_, unmarshall) = contexts();
    let err = unmarshall
        .unmarshall_with_type_list(&Node::parse("[null]").unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), &UnmarshallErrorKind::NullElement);
}
