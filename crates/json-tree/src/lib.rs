//! # json-tree
//!
//! An immutable JSON document tree with structural sharing, and a registry
//! driven engine that converts typed Rust values to and from it.
//!
//! Every edit returns a new [`Node`]; the original is never touched, so trees
//! can be shared freely between threads. Edits rebuild only the path from the
//! edited slot up to the root and share everything else.
//!
//! ## Quick start
//!
//! ```rust
//! use json_tree::Node;
//!
//! let doc = Node::parse(r#"{"a":1,"b":[true,null,"x"]}"#).unwrap();
//! assert_eq!(doc.to_text(), r#"{"a": 1, "b": [true, null, "x"]}"#);
//!
//! // Edit a nested element; `root()` reaches the new document.
//! let edited = doc.get("b").unwrap().set(1, "y").unwrap().root();
//! assert_eq!(edited.to_text(), r#"{"a": 1, "b": [true, "y", "x"]}"#);
//!
//! // The original is unchanged.
//! assert!(doc.get("b").unwrap().get(1).unwrap().is_null());
//! ```
//!
//! ## Modules
//!
//! - [`node`]: the [`Node`] handle, navigation and path-copying edits
//! - [`marshall`]: marshallers, the type registry and the two contexts
//! - [`visitor`]: callback traversal with [`NodeVisitor`]
//! - [`error`]: error types for edits, parsing and marshalling
//!
//! Parsing goes through `serde_json`; printing produces the canonical form
//! with `", "` and `": "` separators.

pub mod error;
pub mod marshall;
mod name;
pub mod node;
mod parser;
mod printer;
mod slot;
mod types;
pub mod visitor;

pub use error::{
    JsonError, MarshallError, NodeError, RegistryError, Result, UnmarshallError,
    UnmarshallErrorKind,
};
pub use name::NodeName;
pub use node::Node;
pub use slot::Slot;
pub use types::NodeValue;
pub use visitor::{NodeVisitor, Visiting};
