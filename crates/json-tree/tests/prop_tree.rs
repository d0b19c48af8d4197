/// Property-based tests for the node tree and the marshalling engine.
///
/// Uses `proptest` to generate random documents and values and check that:
/// - printing then parsing yields a structurally equal tree
/// - editing one child leaves the original tree untouched and shares every
///   sibling's content with it
/// - plain and with-type marshalling round trip for the numeric and string
///   types
use proptest::prelude::*;
use serde_json::{Map, Number, Value};

use json_tree::marshall::{basic_registry, MarshallContext, UnmarshallContext};
use json_tree::Node;

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z_][a-zA-Z0-9_]{0,11}").unwrap()
}

fn arb_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,20}",
        Just(String::new()),
        Just("say \"hi\"".to_string()),
        Just("line1\nline2\ttab".to_string()),
        Just("back\\slash".to_string()),
        Just("caf\u{00e9} \u{4f60}\u{597d}".to_string()),
        Just("\u{1}\u{1f}".to_string()),
    ]
}

/// Integers and short decimals; both print back to the same `f64`.
fn arb_number() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-1_000_000_i64..1_000_000).prop_map(|n| Value::Number(Number::from(n))),
        (-10_000_000_i64..10_000_000, 1_u32..4).prop_filter_map(
            "finite",
            |(mantissa, decimals)| Number::from_f64(mantissa as f64 / 10f64.powi(decimals as i32))
                .map(Value::Number),
        ),
    ]
}

fn arb_primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        arb_string().prop_map(Value::String),
        arb_number(),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

/// Arbitrary documents up to four levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    arb_primitive().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6).prop_map(|pairs| {
                let mut map = Map::new();
                for (key, value) in pairs {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}

fn contexts() -> (MarshallContext, UnmarshallContext) {
    let registry = basic_registry().unwrap();
    (
        MarshallContext::new(registry.clone()),
        UnmarshallContext::new(registry),
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// parse(print(tree)) is structurally equal to tree.
    #[test]
    fn print_parse_round_trip(value in arb_json()) {
        let node = Node::from(value);
        let text = node.to_text();
        let again = Node::parse(&text).unwrap();
        prop_assert!(again.structural_eq(&node), "text: {}", text);
        prop_assert_eq!(again.to_text(), text);
    }

    /// Structural equality ignores object property order.
    #[test]
    fn reordered_object_is_structurally_equal(
        pairs in prop::collection::btree_map(arb_key(), arb_primitive(), 0..8)
    ) {
        let forward = Node::object_from(
            pairs.iter().map(|(k, v)| (k.as_str(), Node::from(v.clone())))
        );
        let backward = Node::object_from(
            pairs.iter().rev().map(|(k, v)| (k.as_str(), Node::from(v.clone())))
        );
        prop_assert!(forward.structural_eq(&backward));
    }

    /// Editing one element copies the path to the root and nothing else.
    #[test]
    fn edit_copies_only_the_path(
        values in prop::collection::vec(-1000_i32..1000, 1..12),
        pick in any::<prop::sample::Index>(),
        replacement in any::<bool>(),
    ) {
        let before = Node::array_from(values.iter().map(|n| Node::from(*n)));
        let index = pick.index(values.len());

        let edited = before.set(index, replacement).unwrap();

        prop_assert_eq!(before.child_count(), values.len());
        prop_assert_eq!(before.get(index).unwrap().as_f64(), Some(f64::from(values[index])));
        prop_assert_eq!(edited.get(index).unwrap().as_bool(), Some(replacement));
        for (i, old) in before.children().iter().enumerate() {
            if i != index {
                prop_assert!(edited.get(i).unwrap().shares_content(old));
            }
        }
    }

    /// Leaf edits deep in a document rebuild a new root with the same shape.
    #[test]
    fn deep_leaf_edit_reaches_root(depth in 1_usize..6, value in -1e6_f64..1e6) {
        let mut node = Node::number(0.0);
        for _ in 0..depth {
            node = Node::object_from([("inner", node), ("other", Node::boolean(true))]);
        }
        let mut leaf = node.clone();
        for _ in 0..depth {
            leaf = leaf.get("inner").unwrap();
        }

        let root = leaf.set_number(value).unwrap().root();

        let mut check = root.clone();
        for _ in 0..depth {
            prop_assert!(check.get("other").unwrap().as_bool() == Some(true));
            check = check.get("inner").unwrap();
        }
        prop_assert_eq!(check.as_f64(), Some(value));
        prop_assert!(!root.structural_eq(&node) || value == 0.0);
    }

    #[test]
    fn int_round_trips_with_type(value in any::<i32>()) {
        let (marshall, unmarshall) = contexts();
        let node = marshall.marshall_with_type(&value).unwrap();
        let decoded = unmarshall.unmarshall_with_type(&node).unwrap().unwrap();
        prop_assert_eq!(decoded.downcast::<i32>(), Some(value));
    }

    #[test]
    fn long_round_trips_with_type(value in any::<i64>()) {
        let (marshall, unmarshall) = contexts();
        let node = marshall.marshall_with_type(&value).unwrap();
        let decoded = unmarshall.unmarshall_with_type(&node).unwrap().unwrap();
        prop_assert_eq!(decoded.downcast::<i64>(), Some(value));
    }

    #[test]
    fn double_round_trips(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        let (marshall, unmarshall) = contexts();
        let node = marshall.marshall(&value).unwrap();
        prop_assert_eq!(unmarshall.unmarshall::<f64>(&node).unwrap(), Some(value));
    }

    #[test]
    fn string_round_trips_through_text(value in arb_string()) {
        let (marshall, unmarshall) = contexts();
        let text = marshall.marshall_with_type(&value).unwrap().to_text();
        let node = Node::parse(&text).unwrap();
        let decoded = unmarshall.unmarshall_with_type(&node).unwrap().unwrap();
        prop_assert_eq!(decoded.downcast::<String>(), Some(value));
    }
}
