//! Structural versus positional equality.
use json_tree::Node;

fn parse(text: &str) -> Node {
    Node::parse(text).unwrap()
}

#[test]
fn structural_equality_ignores_attachment() {
    let fresh = Node::object().set("a", Node::number(1.0)).unwrap();
    let attached = Node::object()
        .set("outer", fresh.clone())
        .unwrap()
        .get("outer")
        .unwrap();
    assert!(fresh.structural_eq(&attached));
    assert!(attached.structural_eq(&fresh));
}

#[test]
fn structural_equality_is_reflexive() {
    let node = parse(r#"{"a":[1,{"b":null}],"c":"x"}"#);
    assert!(node.structural_eq(&node));
}

#[test]
fn structural_equality_compares_keys() {
    assert!(!parse(r#"{"a":1}"#).structural_eq(&parse(r#"{"b":1}"#)));
}

#[test]
fn structural_equality_ignores_property_order() {
    assert!(parse(r#"{"a":1,"b":2}"#).structural_eq(&parse(r#"{"b":2,"a":1}"#)));
}

#[test]
fn structural_equality_respects_element_order() {
    assert!(!parse("[1,2]").structural_eq(&parse("[2,1]")));
}

#[test]
fn different_variants_are_never_equal() {
    assert!(!Node::null().structural_eq(&Node::boolean(false)));
    assert!(!Node::number(0.0).structural_eq(&Node::string("0")));
    assert!(!Node::array().structural_eq(&Node::object()));
}

#[test]
fn detached_node_is_structurally_but_not_positionally_equal() {
    let tree = parse(r#"{"a":{"x":1}}"#);
    let attached = tree.get("a").unwrap();
    let detached = attached.remove_parent();

    assert!(detached.structural_eq(&attached));
    assert!(!detached.positional_eq(&attached));
    assert_ne!(detached, attached);
}

#[test]
fn positional_equality_across_separately_built_trees() {
    let one = parse(r#"{"a":{"x":1}}"#).get("a").unwrap();
    let two = parse(r#"{"a":{"x":1}}"#).get("a").unwrap();
    assert!(one.positional_eq(&two));
    assert_eq!(one, two);
}

#[test]
fn positional_equality_sees_ancestor_differences() {
    let one = parse(r#"{"a":{"x":1},"b":1}"#).get("a").unwrap();
    let two = parse(r#"{"a":{"x":1},"b":2}"#).get("a").unwrap();
    assert!(one.structural_eq(&two));
    assert!(!one.positional_eq(&two));
}

#[test]
fn positional_equality_compares_names() {
    let one = Node::number(1.0).set_name("one");
    let two = Node::number(1.0).set_name("two");
    assert!(one.structural_eq(&two));
    assert_ne!(one, two);
}

#[test]
fn positional_implies_structural() {
    let tree = parse(r#"[{"k":[true]}]"#);
    let a = tree.get(0).unwrap().get("k").unwrap();
    let b = tree.get(0).unwrap().get("k").unwrap();
    assert!(a.positional_eq(&b));
    assert!(a.structural_eq(&b));
}
