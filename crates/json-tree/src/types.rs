//! Node content shared between tree snapshots, and the borrowed value view.
//!
//! `NodeData` is the immutable payload behind every [`Node`] handle. It knows
//! nothing about parents, so one allocation can sit in any number of trees at
//! once; that is what makes path copying share untouched subtrees.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::name::NodeName;
use crate::node::Node;

pub(crate) type ObjectChildren = IndexMap<NodeName, Arc<NodeData>>;

#[derive(Debug)]
pub(crate) enum NodeData {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Arc<NodeData>>),
    /// Properties in insertion order; keys are unique.
    Object(ObjectChildren),
}

impl NodeData {
    /// Name given to a node of this variant when it has no parent.
    pub(crate) fn default_name(&self) -> NodeName {
        NodeName::new(match self {
            NodeData::Null => NodeName::NULL,
            NodeData::Boolean(_) => NodeName::BOOLEAN,
            NodeData::Number(_) => NodeName::NUMBER,
            NodeData::String(_) => NodeName::STRING,
            NodeData::Array(_) => NodeName::ARRAY,
            NodeData::Object(_) => NodeName::OBJECT,
        })
    }

    pub(crate) fn variant(&self) -> &'static str {
        match self {
            NodeData::Null => "Null",
            NodeData::Boolean(_) => "Boolean",
            NodeData::Number(_) => "Number",
            NodeData::String(_) => "String",
            NodeData::Array(_) => "Array",
            NodeData::Object(_) => "Object",
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            NodeData::Array(elements) => elements.len(),
            NodeData::Object(properties) => properties.len(),
            _ => 0,
        }
    }

    /// A copy of this container with the child at `index` swapped for `child`.
    /// Siblings are shared, not cloned.
    pub(crate) fn with_child(&self, index: usize, child: Arc<NodeData>) -> NodeData {
        match self {
            NodeData::Array(elements) => {
                let mut elements = elements.clone();
                elements[index] = child;
                NodeData::Array(elements)
            }
            NodeData::Object(properties) => {
                let mut properties = properties.clone();
                if let Some((_, slot)) = properties.get_index_mut(index) {
                    *slot = child;
                }
                NodeData::Object(properties)
            }
            // Leaves have no slots; a parent link always points at a container.
            leaf => leaf.shallow_clone(),
        }
    }

    fn shallow_clone(&self) -> NodeData {
        match self {
            NodeData::Null => NodeData::Null,
            NodeData::Boolean(b) => NodeData::Boolean(*b),
            NodeData::Number(n) => NodeData::Number(*n),
            NodeData::String(s) => NodeData::String(s.clone()),
            NodeData::Array(elements) => NodeData::Array(elements.clone()),
            NodeData::Object(properties) => NodeData::Object(properties.clone()),
        }
    }
}

/// Content equality. Reference-identical subtrees short-circuit.
pub(crate) fn content_eq(a: &Arc<NodeData>, b: &Arc<NodeData>) -> bool {
    Arc::ptr_eq(a, b) || **a == **b
}

/// Content equality that also requires object properties in the same order,
/// so both sides print identically.
pub(crate) fn ordered_eq(a: &Arc<NodeData>, b: &Arc<NodeData>) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    match (&**a, &**b) {
        (NodeData::Array(a), NodeData::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| ordered_eq(a, b))
        }
        (NodeData::Object(a), NodeData::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, a), (kb, b))| ka == kb && ordered_eq(a, b))
        }
        (a, b) => a == b,
    }
}

impl PartialEq for NodeData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeData::Null, NodeData::Null) => true,
            (NodeData::Boolean(a), NodeData::Boolean(b)) => a == b,
            (NodeData::Number(a), NodeData::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (NodeData::String(a), NodeData::String(b)) => a == b,
            (NodeData::Array(a), NodeData::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| content_eq(a, b))
            }
            (NodeData::Object(a), NodeData::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, a)| b.get(key).is_some_and(|b| content_eq(a, b)))
            }
            _ => false,
        }
    }
}

/// The payload of a node: a scalar, or child handles for containers.
///
/// Children are attached to the node they were read from, so walking
/// `parent()` from any of them leads back to it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue<'a> {
    Null,
    Boolean(bool),
    Number(f64),
    String(&'a str),
    Array(Vec<Node>),
    Object(IndexMap<NodeName, Node>),
}
