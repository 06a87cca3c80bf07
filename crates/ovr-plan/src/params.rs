//! Node-specific parameters

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known parameter carrying a node's estimated output size in bytes
pub const ESTIMATED_BYTES: &str = "estimated_bytes";

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Absent value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer constant
    Int(i64),
    /// Floating point constant
    Float(f64),
    /// String constant or identifier
    Str(String),
    /// List of values, e.g. join keys
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Get as integer if this is one
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as a non-negative integer
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// Get as string if this is one
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Get as boolean if this is one
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Ordered parameter map of a node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeParams(IndexMap<String, ParamValue>);

impl NodeParams {
    /// Create an empty parameter map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Get a parameter
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no parameters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_keep_insertion_order() {
        let mut params = NodeParams::new();
        params.insert("keys", vec!["a", "b"]);
        params.insert(ESTIMATED_BYTES, 1024_i64);
        assert_eq!(params.to_string(), "keys=[a, b], estimated_bytes=1024");
        assert_eq!(params.get(ESTIMATED_BYTES).and_then(ParamValue::as_u64), Some(1024));
    }

    #[test]
    fn negative_sizes_are_not_unsigned() {
        assert_eq!(ParamValue::Int(-1).as_u64(), None);
    }

    #[test]
    fn untagged_json() {
        let params: NodeParams =
            serde_json::from_str(r#"{"value": 1.5, "name": "x", "flag": true, "none": null}"#)
                .unwrap();
        assert_eq!(params.get("value"), Some(&ParamValue::Float(1.5)));
        assert_eq!(params.get("name").and_then(ParamValue::as_str), Some("x"));
        assert_eq!(params.get("flag").and_then(ParamValue::as_bool), Some(true));
        assert_eq!(params.get("none"), Some(&ParamValue::Null));
    }
}
