//! Canonical JSON text for a node tree.
//!
//! The canonical form is single-line JSON with `, ` between entries and
//! `: ` between a key and its value:
//!
//! ```
//! use json_tree::Node;
//!
//! let node = Node::parse(r#"{"a":1,"b":[true,null,"x"]}"#).unwrap();
//! assert_eq!(node.to_text(), r#"{"a": 1, "b": [true, null, "x"]}"#);
//! ```
//!
//! - Integral numbers drop the fractional part (`1.0` → `1`)
//! - Non-finite numbers have no JSON form and print as `null`
//! - Strings use standard JSON escapes; other control characters use `\uXXXX`

use std::fmt::{self, Write};

use crate::node::Node;
use crate::types::NodeData;

impl Node {
    /// Writes the canonical form of this node and its descendants to `out`.
    pub fn print_json<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        print_data(self.data(), out)
    }

    /// The canonical form as a `String`.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.print_json(&mut out);
        out
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print_json(f)
    }
}

fn print_data<W: Write + ?Sized>(data: &NodeData, out: &mut W) -> fmt::Result {
    match data {
        NodeData::Null => out.write_str("null"),
        NodeData::Boolean(b) => out.write_str(if *b { "true" } else { "false" }),
        NodeData::Number(n) => out.write_str(&format_number(*n)),
        NodeData::String(s) => print_string(s, out),
        NodeData::Array(elements) => {
            out.write_char('[')?;
            let mut separator = "";
            for element in elements {
                out.write_str(separator)?;
                separator = ", ";
                print_data(element, out)?;
            }
            out.write_char(']')
        }
        NodeData::Object(properties) => {
            out.write_char('{')?;
            let mut separator = "";
            for (key, value) in properties {
                out.write_str(separator)?;
                separator = ", ";
                print_string(key.as_str(), out)?;
                out.write_str(": ")?;
                print_data(value, out)?;
            }
            out.write_char('}')
        }
    }
}

/// Format a double in its shortest JSON form:
/// - Integral values print without a fraction (`3.0` → `3`)
/// - Negative zero normalizes to `0`
/// - NaN and infinities print as `null`
pub(crate) fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    let n = if n == 0.0 { 0.0 } else { n };
    // Below 2^53 every integral double converts to i64 exactly.
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return (n as i64).to_string();
    }
    n.to_string()
}

/// Emit a quoted string with JSON escapes.
fn print_string<W: Write + ?Sized>(s: &str, out: &mut W) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{08}' => out.write_str("\\b")?,
            '\u{0c}' => out.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
