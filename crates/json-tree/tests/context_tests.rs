//! Context identity, processors and custom marshallers.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use json_tree::marshall::{
    basic_registry, register_basic, MarshallContext, Marshaller, ObjectPostProcessor,
    PreProcessor, TypeRegistry, TypedValue, UnmarshallContext,
};
use json_tree::{MarshallError, Node, UnmarshallError, UnmarshallErrorKind};

/// A caller-defined type with a strict object encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Point {
    x: i32,
    y: i32,
}

json_tree::impl_typed_value!(Point);

struct PointMarshaller;

impl Marshaller for PointMarshaller {
    type Value = Point;

    fn type_name(&self) -> &'static str {
        "point"
    }

    fn marshall_non_null(&self, value: &Point, context: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::object_from([
            ("x", context.marshall(&value.x)?),
            ("y", context.marshall(&value.y)?),
        ]))
    }

    fn unmarshall_non_null(&self, node: &Node, context: &UnmarshallContext) -> Result<Point, UnmarshallError> {
        let mut x = None;
        let mut y = None;
        for child in node.children() {
            match child.name().as_str() {
                "x" => x = context.unmarshall::<i32>(&child)?,
                "y" => y = context.unmarshall::<i32>(&child)?,
                other => return Err(UnmarshallError::unknown_property_present(other, node)),
            }
        }
        Ok(Point {
            x: x.ok_or_else(|| UnmarshallError::required_property_missing("x", node))?,
            y: y.ok_or_else(|| UnmarshallError::required_property_missing("y", node))?,
        })
    }
}

fn registry() -> Arc<TypeRegistry> {
    let mut builder = TypeRegistry::builder();
    register_basic(&mut builder).unwrap();
    PointMarshaller.register(&mut builder).unwrap();
    builder.build()
}

// ============================================================================
// Custom marshaller
// ============================================================================

#[test]
fn custom_type_round_trips_with_type() {
    let registry = registry();
    let marshall = MarshallContext::new(registry.clone());
    let unmarshall = UnmarshallContext::new(registry);

    let point = Point { x: 1, y: -2 };
    let node = marshall.marshall_with_type(&point).unwrap();
    assert_eq!(
        node.to_text(),
        r#"{"type": "point", "value": {"x": 1, "y": -2}}"#
    );
    let decoded = unmarshall.unmarshall_with_type(&node).unwrap().unwrap();
    assert_eq!(decoded.downcast_ref::<Point>(), Some(&point));
}

#[test]
fn custom_type_reports_missing_and_unknown_properties() {
    let unmarshall = UnmarshallContext::new(registry());

    let err = unmarshall
        .unmarshall::<Point>(&Node::parse(r#"{"x":1}"#).unwrap())
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &UnmarshallErrorKind::RequiredPropertyMissing("y".to_string())
    );
    assert_eq!(err.to_string(), r#"Required property "y" missing={"x": 1}"#);

    let err = unmarshall
        .unmarshall::<Point>(&Node::parse(r#"{"x":1,"y":2,"z":3}"#).unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), &UnmarshallErrorKind::UnknownProperty("z".to_string()));
}

// ============================================================================
// Pre-processor
// ============================================================================

#[test]
fn pre_processor_rewrites_objects_before_decoding() {
    // Older documents spelled the properties "left" and "top".
    let upgrade: PreProcessor = Arc::new(|node: &Node, type_name: &'static str| {
        assert_eq!(type_name, "point");
        let mut renamed = Vec::new();
        for child in node.children() {
            let name = match child.name().as_str() {
                "left" => "x",
                "top" => "y",
                other => other,
            };
            renamed.push(child.set_name(name));
        }
        Ok(Node::object().set_children(renamed).unwrap())
    });
    let unmarshall = UnmarshallContext::new(registry()).set_pre_processor(Some(upgrade));

    let point = unmarshall
        .unmarshall::<Point>(&Node::parse(r#"{"left":3,"top":4}"#).unwrap())
        .unwrap();
    assert_eq!(point, Some(Point { x: 3, y: 4 }));
}

#[test]
fn pre_processor_skips_non_objects() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let processor: PreProcessor = Arc::new(move |node: &Node, _: &'static str| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(node.clone())
    });
    let unmarshall = UnmarshallContext::new(registry()).set_pre_processor(Some(processor));

    unmarshall.unmarshall::<i64>(&Node::string("5")).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    unmarshall
        .unmarshall::<Point>(&Node::parse(r#"{"x":1,"y":2}"#).unwrap())
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn pre_processor_failure_propagates() {
    let processor: PreProcessor =
        Arc::new(|node: &Node, _: &'static str| Err(UnmarshallError::invalid("rejected", node)));
    let unmarshall = UnmarshallContext::new(registry()).set_pre_processor(Some(processor));
    let err = unmarshall
        .unmarshall::<Point>(&Node::parse(r#"{"x":1,"y":2}"#).unwrap())
        .unwrap_err();
    assert_eq!(err.kind(), &UnmarshallErrorKind::Invalid("rejected".to_string()));
}

#[test]
fn setting_same_pre_processor_returns_same_context() {
    let processor: PreProcessor = Arc::new(|node: &Node, _: &'static str| Ok(node.clone()));
    let context = UnmarshallContext::new(registry()).set_pre_processor(Some(processor.clone()));

    assert!(context.set_pre_processor(Some(processor)).ptr_eq(&context));
    assert!(!context.set_pre_processor(None).ptr_eq(&context));

    let plain = UnmarshallContext::new(registry());
    assert!(plain.set_pre_processor(None).ptr_eq(&plain));
}

// ============================================================================
// Object post-processor
// ============================================================================

#[test]
fn post_processor_rewrites_marshalled_objects() {
    let stamp: ObjectPostProcessor = Arc::new(|value: &dyn TypedValue, node: Node| {
        assert!(value.as_any().is::<Point>());
        node.set("version", 2).map_err(|e| MarshallError::Invalid {
            message: e.to_string(),
        })
    });
    let marshall = MarshallContext::new(registry()).set_object_post_processor(Some(stamp));

    let node = marshall.marshall(&Point { x: 0, y: 0 }).unwrap();
    assert_eq!(node.to_text(), r#"{"x": 0, "y": 0, "version": 2}"#);

    // Scalars are not objects and pass through untouched.
    assert_eq!(marshall.marshall(&5_i32).unwrap().to_text(), "5");
}

#[test]
fn post_processor_runs_before_type_wrapping() {
    let stamp: ObjectPostProcessor = Arc::new(|_: &dyn TypedValue, node: Node| {
        node.set("seen", true).map_err(|e| MarshallError::Invalid {
            message: e.to_string(),
        })
    });
    let marshall = MarshallContext::new(registry()).set_object_post_processor(Some(stamp));
    let node = marshall.marshall_with_type(&Point { x: 1, y: 1 }).unwrap();
    assert_eq!(
        node.to_text(),
        r#"{"type": "point", "value": {"x": 1, "y": 1, "seen": true}}"#
    );
}

#[test]
fn setting_same_post_processor_returns_same_context() {
    let processor: ObjectPostProcessor = Arc::new(|_: &dyn TypedValue, node: Node| Ok(node));
    let context = MarshallContext::new(registry()).set_object_post_processor(Some(processor.clone()));
    assert!(context
        .set_object_post_processor(Some(processor))
        .ptr_eq(&context));
    assert!(!context.set_object_post_processor(None).ptr_eq(&context));
}

#[test]
fn clones_are_the_same_context() {
    let context = MarshallContext::new(basic_registry().unwrap());
    assert!(context.clone().ptr_eq(&context));
    assert!(!MarshallContext::new(basic_registry().unwrap()).ptr_eq(&context));
}

// ============================================================================
// Type-name property
// ============================================================================

#[test]
fn with_type_property_reads_sibling_type_name() {
    let unmarshall = UnmarshallContext::new(registry());
    let source = Node::parse(r#"{"kind":"point","data":{"x":5,"y":6}}"#).unwrap();
    let data = source.get("data").unwrap();

    let value = unmarshall
        .unmarshall_with_type_property("kind", &source, &data)
        .unwrap()
        .unwrap();
    assert_eq!(value.downcast::<Point>(), Some(Point { x: 5, y: 6 }));
}

#[test]
fn with_type_property_missing_or_unknown() {
    let unmarshall = UnmarshallContext::new(registry());
    let source = Node::parse(r#"{"kind":"nope"}"#).unwrap();

    let err = unmarshall
        .unmarshall_with_type_property("other", &source, &Node::number(1.0))
        .unwrap_err();
    assert_eq!(
        err.kind(),
        &UnmarshallErrorKind::RequiredPropertyMissing("other".to_string())
    );

    let err = unmarshall
        .unmarshall_with_type_property("kind", &source, &Node::number(1.0))
        .unwrap_err();
    assert_eq!(err.kind(), &UnmarshallErrorKind::UnknownType("nope".to_string()));
}

#[test]
fn registered_type_lookups() {
    let unmarshall = UnmarshallContext::new(registry());
    assert_eq!(unmarshall.registered_type_name::<Point>(), Some("point"));
    assert_eq!(
        unmarshall.registered_type("point"),
        Some(std::any::TypeId::of::<Point>())
    );
    assert_eq!(unmarshall.registered_type("missing"), None);
}
