//! Marshallers for scalars and small domain types that encode as a single
//! JSON value.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::{MarshallError, UnmarshallError};
use crate::marshall::marshaller::{narrow, Marshaller};
use crate::marshall::{MarshallContext, UnmarshallContext};
use crate::node::Node;

/// `true`/`false`, untagged even in with-type mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanMarshaller;

impl Marshaller for BooleanMarshaller {
    type Value = bool;

    fn type_name(&self) -> &'static str {
        "boolean"
    }

    fn requires_type_name(&self) -> bool {
        false
    }

    fn marshall_non_null(&self, value: &bool, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::boolean(*value))
    }

    fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<bool, UnmarshallError> {
        narrow(node.boolean_or_fail(), "Boolean", node)
    }
}

/// Plain JSON numbers, untagged even in with-type mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleMarshaller;

impl Marshaller for DoubleMarshaller {
    type Value = f64;

    fn type_name(&self) -> &'static str {
        "double"
    }

    fn requires_type_name(&self) -> bool {
        false
    }

    fn marshall_non_null(&self, value: &f64, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::number(*value))
    }

    fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<f64, UnmarshallError> {
        narrow(node.number_or_fail(), "Number", node)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringMarshaller;

impl Marshaller for StringMarshaller {
    type Value = String;

    fn type_name(&self) -> &'static str {
        "string"
    }

    fn requires_type_name(&self) -> bool {
        false
    }

    fn marshall_non_null(&self, value: &String, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::string(value.as_str()))
    }

    fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<String, UnmarshallError> {
        narrow(node.string_or_fail(), "String", node).map(str::to_string)
    }
}

/// A `char` as a one-character string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterMarshaller;

impl Marshaller for CharacterMarshaller {
    type Value = char;

    fn type_name(&self) -> &'static str {
        "character"
    }

    fn marshall_non_null(&self, value: &char, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::string(value.to_string()))
    }

    fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<char, UnmarshallError> {
        let text = narrow(node.string_or_fail(), "String", node)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(UnmarshallError::invalid(
                "Character string must have exactly one character",
                node,
            )),
        }
    }
}

/// A plain name made of any text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringName(String);

impl StringName {
    pub fn new(value: impl Into<String>) -> Self {
        StringName(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

crate::impl_typed_value!(StringName);

#[derive(Debug, Clone, Copy, Default)]
pub struct StringNameMarshaller;

impl Marshaller for StringNameMarshaller {
    type Value = StringName;

    fn type_name(&self) -> &'static str {
        "string-name"
    }

    fn marshall_non_null(&self, value: &StringName, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::string(value.as_str()))
    }

    fn unmarshall_non_null(
        &self,
        node: &Node,
        _: &UnmarshallContext,
    ) -> Result<StringName, UnmarshallError> {
        narrow(node.string_or_fail(), "String", node).map(StringName::new)
    }
}

/// Rejected language tag text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid locale {0:?}")]
pub struct InvalidLocale(String);

/// A language tag such as `en-AU` or `zh-Hant-TW`.
///
/// Parsing accepts `-` or `_` separators and normalises case: language
/// lowercase, script title case, region uppercase, variants lowercase.
///
/// ```
/// use json_tree::marshall::Locale;
///
/// let locale: Locale = "ZH_hant_tw".parse().unwrap();
/// assert_eq!(locale.to_string(), "zh-Hant-TW");
/// assert_eq!(locale.region(), Some("TW"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    script: Option<String>,
    region: Option<String>,
    variants: Vec<String>,
}

impl Locale {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidLocale(text.to_string());
        let mut subtags = text.split(|c: char| c == '-' || c == '_').peekable();

        let language = subtags
            .next()
            .filter(|s| (2..=8).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphabetic()))
            .ok_or_else(invalid)?
            .to_ascii_lowercase();

        let script = subtags
            .next_if(|s| s.len() == 4 && s.bytes().all(|b| b.is_ascii_alphabetic()))
            .map(|s| {
                let (first, rest) = s.split_at(1);
                first.to_ascii_uppercase() + &rest.to_ascii_lowercase()
            });

        let region = subtags
            .next_if(|s| {
                (s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic()))
                    || (s.len() == 3 && s.bytes().all(|b| b.is_ascii_digit()))
            })
            .map(str::to_ascii_uppercase);

        let variants = subtags
            .map(|s| {
                let alphanumeric = s.bytes().all(|b| b.is_ascii_alphanumeric());
                let long = (5..=8).contains(&s.len());
                let digit_led = s.len() == 4 && s.as_bytes()[0].is_ascii_digit();
                if alphanumeric && (long || digit_led) {
                    Ok(s.to_ascii_lowercase())
                } else {
                    Err(invalid())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Locale {
            language,
            script,
            region,
            variants,
        })
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        for subtag in self.script.iter().chain(&self.region).chain(&self.variants) {
            write!(f, "-{subtag}")?;
        }
        Ok(())
    }
}

crate::impl_typed_value!(Locale);

/// A [`Locale`] as its language tag string.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleMarshaller;

impl Marshaller for LocaleMarshaller {
    type Value = Locale;

    fn type_name(&self) -> &'static str {
        "locale"
    }

    fn marshall_non_null(&self, value: &Locale, _: &MarshallContext) -> Result<Node, MarshallError> {
        Ok(Node::string(value.to_string()))
    }

    fn unmarshall_non_null(&self, node: &Node, _: &UnmarshallContext) -> Result<Locale, UnmarshallError> {
        narrow(node.string_or_fail(), "String", node)?
            .parse()
            .map_err(|cause: InvalidLocale| UnmarshallError::invalid(cause.to_string(), node).with_source(cause))
    }
}
