//! Open-ended traversal callbacks over a node tree.

use crate::node::Node;
use crate::types::NodeData;

/// Returned from the `start_*` callbacks to continue into a subtree or skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visiting {
    Continue,
    Skip,
}

/// Receives callbacks from [`Node::accept`]. Every method has a no-op default,
/// so implementors override only what they need.
///
/// For each node, `start_visit` runs first; if it returns
/// [`Visiting::Skip`] the variant callback is not called. Containers then get
/// `start_visit_array`/`start_visit_object`, and their children are visited in
/// order unless that also returned `Skip`. `end_visit` always runs last.
pub trait NodeVisitor {
    fn start_visit(&mut self, _node: &Node) -> Visiting {
        Visiting::Continue
    }

    fn end_visit(&mut self, _node: &Node) {}

    fn visit_null(&mut self, _node: &Node) {}

    fn visit_boolean(&mut self, _node: &Node, _value: bool) {}

    fn visit_number(&mut self, _node: &Node, _value: f64) {}

    fn visit_string(&mut self, _node: &Node, _value: &str) {}

    fn start_visit_array(&mut self, _node: &Node) -> Visiting {
        Visiting::Continue
    }

    fn end_visit_array(&mut self, _node: &Node) {}

    fn start_visit_object(&mut self, _node: &Node) -> Visiting {
        Visiting::Continue
    }

    fn end_visit_object(&mut self, _node: &Node) {}
}

impl Node {
    /// Walks this node and its descendants depth-first, in child order.
    pub fn accept<V: NodeVisitor + ?Sized>(&self, visitor: &mut V) {
        if visitor.start_visit(self) == Visiting::Continue {
            match self.data() {
                NodeData::Null => visitor.visit_null(self),
                NodeData::Boolean(b) => visitor.visit_boolean(self, *b),
                NodeData::Number(n) => visitor.visit_number(self, *n),
                NodeData::String(s) => visitor.visit_string(self, s),
                NodeData::Array(_) => {
                    if visitor.start_visit_array(self) == Visiting::Continue {
                        for child in self.children() {
                            child.accept(visitor);
                        }
                    }
                    visitor.end_visit_array(self);
                }
                NodeData::Object(_) => {
                    if visitor.start_visit_object(self) == Visiting::Continue {
                        for child in self.children() {
                            child.accept(visitor);
                        }
                    }
                    visitor.end_visit_object(self);
                }
            }
        }
        visitor.end_visit(self);
    }
}
