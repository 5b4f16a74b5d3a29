//! Scalar property kinds and values
//!
//! The small set of value kinds a schema field may hold, plus the
//! loosely-typed carrier used by raw records before resolution. The carrier
//! knows its own kind so the raw builder can reject loader bugs early.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scalar value kind a field may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Text,
    Integer,
    Boolean,
    Decimal,
}

impl PropertyType {
    /// All built-in scalar kinds, in seed order
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Text,
        PropertyType::Integer,
        PropertyType::Boolean,
        PropertyType::Decimal,
    ];

    /// Lowercase label used in schema declarations and exports
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Integer => "integer",
            PropertyType::Boolean => "boolean",
            PropertyType::Decimal => "decimal",
        }
    }

    /// Name of the seeded type sketch for this kind (e.g. `TypText`)
    pub fn sketch_name(&self) -> &'static str {
        match self {
            PropertyType::Text => "TypText",
            PropertyType::Integer => "TypInteger",
            PropertyType::Boolean => "TypBoolean",
            PropertyType::Decimal => "TypDecimal",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(PropertyType::Text),
            "integer" => Ok(PropertyType::Integer),
            "boolean" => Ok(PropertyType::Boolean),
            "decimal" => Ok(PropertyType::Decimal),
            other => Err(format!("unknown property type `{other}`")),
        }
    }
}

/// A scalar value carried by a raw record
///
/// Weakly typed on purpose: loaders produce these from text sources, and the
/// raw builder checks the runtime kind against the declared field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl PropertyValue {
    /// The kind this value actually holds
    pub fn kind(&self) -> PropertyType {
        match self {
            PropertyValue::Text(_) => PropertyType::Text,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Boolean(_) => PropertyType::Boolean,
            PropertyValue::Decimal(_) => PropertyType::Decimal,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            PropertyValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<f64> for PropertyValue {
    fn from(d: f64) -> Self {
        PropertyValue::Decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind_roundtrip() {
        assert_eq!(PropertyValue::from("x").kind(), PropertyType::Text);
        assert_eq!(PropertyValue::from(3i64).kind(), PropertyType::Integer);
        assert_eq!(PropertyValue::from(true).kind(), PropertyType::Boolean);
        assert_eq!(PropertyValue::from(1.5f64).kind(), PropertyType::Decimal);
    }

    #[test]
    fn test_label_parse() {
        for ty in PropertyType::ALL {
            assert_eq!(ty.label().parse::<PropertyType>().unwrap(), ty);
        }
        assert!("float".parse::<PropertyType>().is_err());
    }
}
