//! The parse boundary and `serde` interop.
//!
//! Tokenizing is delegated to `serde_json` (built with `preserve_order`, so
//! object properties keep their source order). The resulting
//! `serde_json::Value` is converted into node content in one pass.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::Result;
use crate::name::NodeName;
use crate::node::Node;
use crate::types::NodeData;

impl Node {
    /// Parses JSON text into a root node.
    ///
    /// Fails with [`JsonError::Parse`](crate::JsonError::Parse) on malformed
    /// input. When an object repeats a key the last value wins.
    pub fn parse(text: &str) -> Result<Node> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Node::from(&value))
    }

    /// Converts this node and its descendants into a `serde_json::Value`.
    /// Non-finite numbers become `Value::Null`.
    pub fn to_json_value(&self) -> Value {
        data_to_value(self.data())
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        Node::from_data(value_to_data(value))
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from(&value)
    }
}

fn value_to_data(value: &Value) -> Arc<NodeData> {
    Arc::new(match value {
        Value::Null => NodeData::Null,
        Value::Bool(b) => NodeData::Boolean(*b),
        Value::Number(n) => NodeData::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => NodeData::String(s.clone()),
        Value::Array(elements) => NodeData::Array(elements.iter().map(value_to_data).collect()),
        Value::Object(map) => NodeData::Object(
            map.iter()
                .map(|(key, value)| (NodeName::new(key.as_str()), value_to_data(value)))
                .collect::<IndexMap<_, _>>(),
        ),
    })
}

fn data_to_value(data: &NodeData) -> Value {
    match data {
        NodeData::Null => Value::Null,
        NodeData::Boolean(b) => Value::Bool(*b),
        NodeData::Number(n) => number_value(*n),
        NodeData::String(s) => Value::String(s.clone()),
        NodeData::Array(elements) => {
            Value::Array(elements.iter().map(|e| data_to_value(e)).collect())
        }
        NodeData::Object(properties) => {
            let mut map = Map::with_capacity(properties.len());
            for (key, value) in properties {
                map.insert(key.to_string(), data_to_value(value));
            }
            Value::Object(map)
        }
    }
}

/// Integral doubles become JSON integers so `1.0` prints as `1`.
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        DataRef(self.data()).serialize(serializer)
    }
}

struct DataRef<'a>(&'a NodeData);

impl Serialize for DataRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            NodeData::Null => serializer.serialize_unit(),
            NodeData::Boolean(b) => serializer.serialize_bool(*b),
            NodeData::Number(n) => number_value(*n).serialize(serializer),
            NodeData::String(s) => serializer.serialize_str(s),
            NodeData::Array(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(&DataRef(element))?;
                }
                seq.end()
            }
            NodeData::Object(properties) => {
                let mut map = serializer.serialize_map(Some(properties.len()))?;
                for (key, value) in properties {
                    map.serialize_entry(key.as_str(), &DataRef(value))?;
                }
                map.end()
            }
        }
    }
}
