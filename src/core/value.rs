//! Structured value produced by every dissector.
//!
//! A `StructuredValue` is a closed tagged union: an ordered `Container` of
//! named fields, an ordered `Sequence`, or an atomic `Scalar`. Children are
//! owned, so every value is an acyclic tree built bottom-up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Atomic leaf value.
///
/// There is no mutating API; a scalar is fixed once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Raw byte string
    Bytes(#[serde(with = "hex::serde")] Vec<u8>),
    /// Text string
    Text(String),
}

impl Scalar {
    /// Canonical human-readable form.
    ///
    /// Byte strings render verbatim when every byte is printable ASCII or
    /// text whitespace, otherwise as `0x`-prefixed lowercase hex. Printable
    /// bytes that themselves start with `0x` also take the hex form, so the
    /// two renderings never collide.
    pub fn textual_form(&self) -> String {
        self.to_string()
    }
}

/// Prefix of the hex rendering of a byte string.
pub const HEX_PREFIX: &str = "0x";

/// Control characters that still count as text: tab, newline, carriage return.
pub fn is_text_whitespace(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
}

fn renders_as_text(data: &[u8]) -> bool {
    !data.starts_with(HEX_PREFIX.as_bytes())
        && data
            .iter()
            .all(|&b| matches!(b, 0x20..=0x7e) || is_text_whitespace(char::from(b)))
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::UInt(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Bool(v) => write!(f, "{}", v),
            Scalar::Bytes(data) if renders_as_text(data) => {
                // Every byte is ASCII, so this is the identity conversion.
                f.write_str(&String::from_utf8_lossy(data))
            }
            Scalar::Bytes(data) => write!(f, "{}{}", HEX_PREFIX, hex::encode(data)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v.into())
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::UInt(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::UInt(v.into())
    }
}

impl From<u16> for Scalar {
    fn from(v: u16) -> Self {
        Scalar::UInt(v.into())
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(v: Vec<u8>) -> Self {
        Scalar::Bytes(v)
    }
}

impl From<&[u8]> for Scalar {
    fn from(v: &[u8]) -> Self {
        Scalar::Bytes(v.to_vec())
    }
}

/// Ordered mapping from field name to value.
///
/// Insertion order reflects on-disk field order. Names starting with `_` are
/// private metadata and are never displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Container {
    fields: Vec<(String, StructuredValue)>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<StructuredValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Appends a field. An existing field of the same name is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StructuredValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&StructuredValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StructuredValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Returns true for field names reserved for private metadata.
pub fn is_private_name(name: &str) -> bool {
    name.starts_with('_')
}

/// Generic parsed-data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructuredValue {
    Container(Container),
    Sequence(Vec<StructuredValue>),
    Scalar(Scalar),
}

impl StructuredValue {
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            StructuredValue::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[StructuredValue]> {
        match self {
            StructuredValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            StructuredValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a field when this value is a container.
    pub fn field(&self, name: &str) -> Option<&StructuredValue> {
        self.as_container().and_then(|c| c.get(name))
    }

    pub fn to_json_string(&self) -> crate::error::Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::error::DissectError::Serialization(format!("JSON serialization error: {}", e))
        })
    }

    pub fn from_json_str(json_str: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json_str).map_err(|e| {
            crate::error::DissectError::Serialization(format!(
                "JSON deserialization error: {}",
                e
            ))
        })
    }
}

impl From<Container> for StructuredValue {
    fn from(c: Container) -> Self {
        StructuredValue::Container(c)
    }
}

impl From<Vec<StructuredValue>> for StructuredValue {
    fn from(items: Vec<StructuredValue>) -> Self {
        StructuredValue::Sequence(items)
    }
}

impl From<Scalar> for StructuredValue {
    fn from(s: Scalar) -> Self {
        StructuredValue::Scalar(s)
    }
}

macro_rules! scalar_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StructuredValue {
                fn from(v: $ty) -> Self {
                    StructuredValue::Scalar(Scalar::from(v))
                }
            }
        )*
    };
}

scalar_value_from!(i64, i32, u64, u32, u16, f64, bool, &str, String, Vec<u8>, &[u8]);
