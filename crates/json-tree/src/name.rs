//! Node names: object property keys, array positions, and per-variant defaults.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// The name of a [`Node`](crate::Node).
///
/// Object children are named by their property key and array children by
/// their decimal index. A root carries the default name of its variant
/// (e.g. `$number`) unless renamed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName(Arc<str>);

impl NodeName {
    pub const NULL: &'static str = "$null";
    pub const BOOLEAN: &'static str = "$boolean";
    pub const NUMBER: &'static str = "$number";
    pub const STRING: &'static str = "$string";
    pub const ARRAY: &'static str = "$array";
    pub const OBJECT: &'static str = "$object";

    pub fn new(name: impl Into<Arc<str>>) -> Self {
        NodeName(name.into())
    }

    /// The positional name of an array element.
    pub fn index(index: usize) -> Self {
        NodeName(index.to_string().into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Borrow<str> for NodeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeName {
    fn from(name: &str) -> Self {
        NodeName::new(name)
    }
}

impl From<String> for NodeName {
    fn from(name: String) -> Self {
        NodeName::new(name)
    }
}

impl PartialEq<str> for NodeName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
