//! The immutable JSON node tree.
//!
//! A [`Node`] is a handle made of two parts: shared, parent-free content
//! (`Arc<NodeData>`) and a placement that is either "root with this name" or
//! a link to the parent handle plus the slot's name and index. Every edit
//! returns a new handle; the receiver is never touched.
//!
//! # Path copying
//!
//! Editing a node that sits inside a tree rebuilds each ancestor up to the
//! root, one allocation per level. Siblings along the way are carried over by
//! reference, so unrelated subtrees are shared between the old and the new
//! tree:
//!
//! ```
//! use json_tree::Node;
//!
//! let tree = Node::parse(r#"{"a":{"x":1},"b":{"y":2}}"#).unwrap();
//! let x = tree.get("a").unwrap().get("x").unwrap();
//!
//! let edited = x.replace(Node::number(10.0));
//! let new_root = edited.root();
//!
//! assert_eq!(new_root.to_text(), r#"{"a": {"x": 10}, "b": {"y": 2}}"#);
//! // "b" was not on the edit path, so it is the very same allocation.
//! assert!(new_root.get("b").unwrap().shares_content(&tree.get("b").unwrap()));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::NodeError;
use crate::name::NodeName;
use crate::slot::{Slot, SlotKey};
use crate::types::{content_eq, ordered_eq, NodeData, NodeValue};

/// One value in an immutable JSON tree.
///
/// Cloning is cheap: it copies two reference-counted pointers.
#[derive(Clone)]
pub struct Node {
    data: Arc<NodeData>,
    place: Place,
}

#[derive(Clone)]
enum Place {
    Root(NodeName),
    Child(Arc<Link>),
}

/// Where a child sits: the parent snapshot it was read from or attached to.
struct Link {
    parent: Node,
    name: NodeName,
    index: usize,
}

impl Node {
    pub fn null() -> Node {
        Node::from_data(Arc::new(NodeData::Null))
    }

    pub fn boolean(value: bool) -> Node {
        Node::from_data(Arc::new(NodeData::Boolean(value)))
    }

    pub fn number(value: f64) -> Node {
        Node::from_data(Arc::new(NodeData::Number(value)))
    }

    pub fn string(value: impl Into<String>) -> Node {
        Node::from_data(Arc::new(NodeData::String(value.into())))
    }

    /// An empty array.
    pub fn array() -> Node {
        Node::from_data(Arc::new(NodeData::Array(Vec::new())))
    }

    /// An empty object.
    pub fn object() -> Node {
        Node::from_data(Arc::new(NodeData::Object(IndexMap::new())))
    }

    /// An array holding `elements` in order.
    pub fn array_from<I>(elements: I) -> Node
    where
        I: IntoIterator<Item = Node>,
    {
        let elements = elements.into_iter().map(|element| element.data).collect();
        Node::from_data(Arc::new(NodeData::Array(elements)))
    }

    /// An object holding `properties` in order. A repeated key keeps its
    /// first position and its last value.
    pub fn object_from<K, I>(properties: I) -> Node
    where
        K: Into<NodeName>,
        I: IntoIterator<Item = (K, Node)>,
    {
        let properties = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.data))
            .collect();
        Node::from_data(Arc::new(NodeData::Object(properties)))
    }

    pub(crate) fn from_data(data: Arc<NodeData>) -> Node {
        let name = data.default_name();
        Node {
            data,
            place: Place::Root(name),
        }
    }

    pub(crate) fn data(&self) -> &NodeData {
        &self.data
    }

    fn attach(parent: &Node, name: NodeName, index: usize, data: &Arc<NodeData>) -> Node {
        Node {
            data: Arc::clone(data),
            place: Place::Child(Arc::new(Link {
                parent: parent.clone(),
                name,
                index,
            })),
        }
    }

    // name, index, parent ...........................................................

    pub fn name(&self) -> &NodeName {
        match &self.place {
            Place::Root(name) => name,
            Place::Child(link) => &link.name,
        }
    }

    /// Returns a node with the given name.
    ///
    /// Only the handle changes: the parent, if any, is left as it was. The
    /// name matters again when the node is placed into an object with
    /// [`set_children`](Node::set_children), which keys children by name.
    pub fn set_name(&self, name: impl Into<NodeName>) -> Node {
        let name = name.into();
        if *self.name() == name {
            return self.clone();
        }
        let place = match &self.place {
            Place::Root(_) => Place::Root(name),
            Place::Child(link) => Place::Child(Arc::new(Link {
                parent: link.parent.clone(),
                name,
                index: link.index,
            })),
        };
        Node {
            data: Arc::clone(&self.data),
            place,
        }
    }

    /// Position among siblings, `None` for a root.
    pub fn index(&self) -> Option<usize> {
        match &self.place {
            Place::Root(_) => None,
            Place::Child(link) => Some(link.index),
        }
    }

    pub fn parent(&self) -> Option<Node> {
        match &self.place {
            Place::Root(_) => None,
            Place::Child(link) => Some(link.parent.clone()),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.place, Place::Root(_))
    }

    /// The top of the tree snapshot this node belongs to.
    pub fn root(&self) -> Node {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Detaches this node from its parent.
    ///
    /// A child loses its slot name and index and takes its variant's default
    /// name; a root is returned unchanged.
    pub fn remove_parent(&self) -> Node {
        match &self.place {
            Place::Root(_) => self.clone(),
            Place::Child(_) => Node::from_data(Arc::clone(&self.data)),
        }
    }

    /// Puts `node` in this node's slot, rebuilding every ancestor.
    ///
    /// Returns the replacement attached at the same slot, so `root()` on the
    /// result reaches the new tree. Replacing a root returns `node` detached.
    pub fn replace(&self, node: Node) -> Node {
        match &self.place {
            Place::Root(_) => node.remove_parent(),
            Place::Child(_) if ordered_eq(&self.data, &node.data) => self.clone(),
            Place::Child(_) => self.rebuild(node.data),
        }
    }

    /// Returns this node's slot holding `data`, with new ancestors up to the root.
    fn rebuild(&self, data: Arc<NodeData>) -> Node {
        match &self.place {
            Place::Root(name) => Node {
                data,
                place: Place::Root(name.clone()),
            },
            Place::Child(link) => {
                let parent_data = link.parent.data.with_child(link.index, Arc::clone(&data));
                let parent = link.parent.rebuild(Arc::new(parent_data));
                Node::attach(&parent, link.name.clone(), link.index, &data)
            }
        }
    }

    // variant checks .................................................................

    pub fn is_null(&self) -> bool {
        matches!(*self.data, NodeData::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(*self.data, NodeData::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(*self.data, NodeData::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(*self.data, NodeData::String(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(*self.data, NodeData::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(*self.data, NodeData::Object(_))
    }

    /// Name of this node's variant, e.g. `"Number"`.
    pub fn variant(&self) -> &'static str {
        self.data.variant()
    }

    // values ............................................................................

    pub fn value(&self) -> NodeValue<'_> {
        match &*self.data {
            NodeData::Null => NodeValue::Null,
            NodeData::Boolean(b) => NodeValue::Boolean(*b),
            NodeData::Number(n) => NodeValue::Number(*n),
            NodeData::String(s) => NodeValue::String(s),
            NodeData::Array(_) => NodeValue::Array(self.children()),
            NodeData::Object(_) => NodeValue::Object(self.properties()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self.data {
            NodeData::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self.data {
            NodeData::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &*self.data {
            NodeData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn boolean_or_fail(&self) -> Result<bool, NodeError> {
        self.as_bool()
            .ok_or_else(|| NodeError::invalid_node("Boolean", self))
    }

    pub fn number_or_fail(&self) -> Result<f64, NodeError> {
        self.as_f64()
            .ok_or_else(|| NodeError::invalid_node("Number", self))
    }

    pub fn string_or_fail(&self) -> Result<&str, NodeError> {
        self.as_str()
            .ok_or_else(|| NodeError::invalid_node("String", self))
    }

    /// The elements of an array, each attached to this node.
    pub fn array_or_fail(&self) -> Result<Vec<Node>, NodeError> {
        if self.is_array() {
            Ok(self.children())
        } else {
            Err(NodeError::invalid_node("Array", self))
        }
    }

    /// The properties of an object in insertion order, each attached to this node.
    pub fn object_or_fail(&self) -> Result<IndexMap<NodeName, Node>, NodeError> {
        if self.is_object() {
            Ok(self.properties())
        } else {
            Err(NodeError::invalid_node("Object", self))
        }
    }

    /// Replaces the payload of a Boolean node.
    pub fn set_boolean(&self, value: bool) -> Result<Node, NodeError> {
        match *self.data {
            NodeData::Boolean(b) if b == value => Ok(self.clone()),
            NodeData::Boolean(_) => Ok(self.rebuild(Arc::new(NodeData::Boolean(value)))),
            _ => Err(NodeError::invalid_node("Boolean", self)),
        }
    }

    /// Replaces the payload of a Number node.
    pub fn set_number(&self, value: f64) -> Result<Node, NodeError> {
        match *self.data {
            NodeData::Number(n) if n == value => Ok(self.clone()),
            NodeData::Number(_) => Ok(self.rebuild(Arc::new(NodeData::Number(value)))),
            _ => Err(NodeError::invalid_node("Number", self)),
        }
    }

    /// Replaces the payload of a String node.
    pub fn set_string(&self, value: impl Into<String>) -> Result<Node, NodeError> {
        let value = value.into();
        match &*self.data {
            NodeData::String(s) if *s == value => Ok(self.clone()),
            NodeData::String(_) => Ok(self.rebuild(Arc::new(NodeData::String(value)))),
            _ => Err(NodeError::invalid_node("String", self)),
        }
    }

    // children ...........................................................................

    pub fn child_count(&self) -> usize {
        self.data.len()
    }

    /// Children in order, attached to this node. Empty for leaves.
    pub fn children(&self) -> Vec<Node> {
        match &*self.data {
            NodeData::Array(elements) => elements
                .iter()
                .enumerate()
                .map(|(i, child)| Node::attach(self, NodeName::index(i), i, child))
                .collect(),
            NodeData::Object(properties) => properties
                .iter()
                .enumerate()
                .map(|(i, (key, child))| Node::attach(self, key.clone(), i, child))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn properties(&self) -> IndexMap<NodeName, Node> {
        match &*self.data {
            NodeData::Object(properties) => properties
                .iter()
                .enumerate()
                .map(|(i, (key, child))| (key.clone(), Node::attach(self, key.clone(), i, child)))
                .collect(),
            _ => IndexMap::new(),
        }
    }

    /// The child at `slot`, attached to this node.
    ///
    /// Fails with [`NodeError::IndexOutOfRange`] for a missing array element,
    /// [`NodeError::UnknownProperty`] for a missing object key, and
    /// [`NodeError::InvalidNode`] when the slot kind does not fit the variant.
    pub fn get<S: Slot>(&self, slot: S) -> Result<Node, NodeError> {
        match (slot.key(), &*self.data) {
            (SlotKey::Index(index), NodeData::Array(elements)) => elements
                .get(index)
                .map(|child| Node::attach(self, NodeName::index(index), index, child))
                .ok_or(NodeError::IndexOutOfRange {
                    index,
                    len: elements.len(),
                }),
            (SlotKey::Property(key), NodeData::Object(properties)) => properties
                .get_full(key)
                .map(|(i, name, child)| Node::attach(self, name.clone(), i, child))
                .ok_or_else(|| NodeError::UnknownProperty {
                    property: key.to_string(),
                    node: self.to_text(),
                }),
            (SlotKey::Index(_), _) => Err(NodeError::invalid_node("Array", self)),
            (SlotKey::Property(_), _) => Err(NodeError::invalid_node("Object", self)),
        }
    }

    /// Like [`get`](Node::get) but absent for any failure.
    pub fn child<S: Slot>(&self, slot: S) -> Option<Node> {
        self.get(slot).ok()
    }

    /// Sets the child at `slot`, returning the new container.
    ///
    /// An object key that is new is appended; an existing key keeps its
    /// position. An array index past the end pads the gap with `null`
    /// elements first, like assigning past the end of a JavaScript array.
    /// Setting a value equal to the current one returns this same node.
    pub fn set<S: Slot>(&self, slot: S, value: impl Into<Node>) -> Result<Node, NodeError> {
        let value = value.into();
        match (slot.key(), &*self.data) {
            (SlotKey::Index(index), NodeData::Array(elements)) => {
                if let Some(existing) = elements.get(index) {
                    if ordered_eq(existing, &value.data) {
                        return Ok(self.clone());
                    }
                }
                let mut elements = elements.clone();
                if index < elements.len() {
                    elements[index] = value.data;
                } else {
                    elements.resize(index, Arc::new(NodeData::Null));
                    elements.push(value.data);
                }
                Ok(self.rebuild(Arc::new(NodeData::Array(elements))))
            }
            (SlotKey::Property(key), NodeData::Object(properties)) => {
                if let Some(existing) = properties.get(key) {
                    if ordered_eq(existing, &value.data) {
                        return Ok(self.clone());
                    }
                }
                let mut properties = properties.clone();
                properties.insert(NodeName::from(key), value.data);
                Ok(self.rebuild(Arc::new(NodeData::Object(properties))))
            }
            (SlotKey::Index(_), _) => Err(NodeError::invalid_node("Array", self)),
            (SlotKey::Property(_), _) => Err(NodeError::invalid_node("Object", self)),
        }
    }

    /// Removes the child at `slot`.
    ///
    /// Later array elements shift down one index. Removing an absent object
    /// key returns this same node; an absent array index fails.
    pub fn remove<S: Slot>(&self, slot: S) -> Result<Node, NodeError> {
        match (slot.key(), &*self.data) {
            (SlotKey::Index(index), NodeData::Array(elements)) => {
                if index >= elements.len() {
                    return Err(NodeError::IndexOutOfRange {
                        index,
                        len: elements.len(),
                    });
                }
                let mut elements = elements.clone();
                elements.remove(index);
                Ok(self.rebuild(Arc::new(NodeData::Array(elements))))
            }
            (SlotKey::Property(key), NodeData::Object(properties)) => {
                if !properties.contains_key(key) {
                    return Ok(self.clone());
                }
                let mut properties = properties.clone();
                properties.shift_remove(key);
                Ok(self.rebuild(Arc::new(NodeData::Object(properties))))
            }
            (SlotKey::Index(_), _) => Err(NodeError::invalid_node("Array", self)),
            (SlotKey::Property(_), _) => Err(NodeError::invalid_node("Object", self)),
        }
    }

    /// Appends an element to an array.
    pub fn append_child(&self, value: impl Into<Node>) -> Result<Node, NodeError> {
        match &*self.data {
            NodeData::Array(elements) => {
                let mut elements = elements.clone();
                elements.push(value.into().data);
                Ok(self.rebuild(Arc::new(NodeData::Array(elements))))
            }
            _ => Err(NodeError::invalid_node("Array", self)),
        }
    }

    /// Truncates or pads an array with `null` to exactly `length` elements.
    pub fn set_length(&self, length: usize) -> Result<Node, NodeError> {
        match &*self.data {
            NodeData::Array(elements) if elements.len() == length => Ok(self.clone()),
            NodeData::Array(elements) => {
                let mut elements = elements.clone();
                elements.resize(length, Arc::new(NodeData::Null));
                Ok(self.rebuild(Arc::new(NodeData::Array(elements))))
            }
            _ => Err(NodeError::invalid_node("Array", self)),
        }
    }

    /// Replaces all children at once.
    ///
    /// Arrays take the nodes in order. Objects key each node by its
    /// [`name`](Node::name) and reject duplicate names.
    pub fn set_children<I>(&self, children: I) -> Result<Node, NodeError>
    where
        I: IntoIterator<Item = Node>,
    {
        let data = match &*self.data {
            NodeData::Array(_) => {
                NodeData::Array(children.into_iter().map(|child| child.data).collect())
            }
            NodeData::Object(_) => {
                let mut properties = IndexMap::new();
                for child in children {
                    let name = child.name().clone();
                    if properties.insert(name.clone(), child.data).is_some() {
                        return Err(NodeError::InvalidArgument(format!(
                            "Duplicate property {name:?}"
                        )));
                    }
                }
                NodeData::Object(properties)
            }
            _ => return Err(NodeError::invalid_node("Array or Object", self)),
        };
        let data = Arc::new(data);
        if ordered_eq(&data, &self.data) {
            return Ok(self.clone());
        }
        Ok(self.rebuild(data))
    }

    // equality .........................................................................

    /// Equal content, ignoring where either node is attached.
    ///
    /// Compares variant, value and children; object children are compared
    /// with their keys. The nodes' own names and parents are not considered.
    pub fn structural_eq(&self, other: &Node) -> bool {
        content_eq(&self.data, &other.data)
    }

    /// Equal content at an equal position: same name and index, and parents
    /// that are themselves positionally equal, all the way to the root.
    pub fn positional_eq(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.name() != other.name()
            || self.index() != other.index()
            || !self.structural_eq(other)
        {
            return false;
        }
        match (&self.place, &other.place) {
            (Place::Root(_), Place::Root(_)) => true,
            (Place::Child(a), Place::Child(b)) => a.parent.positional_eq(&b.parent),
            _ => false,
        }
    }

    /// The same instance: identical content allocation and placement.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            && match (&self.place, &other.place) {
                (Place::Root(a), Place::Root(b)) => a == b,
                (Place::Child(a), Place::Child(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }

    /// Both handles point at the same content allocation, wherever attached.
    pub fn shares_content(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.positional_eq(other)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", self.name())
            .field("index", &self.index())
            .field("value", &format_args!("{self}"))
            .finish()
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::boolean(value)
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::number(value)
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::number(f64::from(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::string(value)
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Self {
        node.clone()
    }
}
