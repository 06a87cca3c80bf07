//! Node kinds and classes

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a plan node's operator, e.g. `Acos` or `HashJoin`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKind(String);

impl NodeKind {
    /// Create a node kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Get as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeKind {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeKind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for NodeKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl PartialEq<str> for NodeKind {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeKind {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Broad category of a plan node
///
/// Expressions compute values inside an operator; execs are the operators
/// that move batches of rows between each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    /// Scalar or aggregate expression
    Expression,
    /// Physical operator
    Exec,
}

impl NodeClass {
    /// Name used in diagnostics and configuration keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expression => "Expression",
            Self::Exec => "Exec",
        }
    }

    /// Prefix of per-operator configuration keys
    #[must_use]
    pub const fn config_prefix(self) -> &'static str {
        match self {
            Self::Expression => "sql.expression",
            Self::Exec => "sql.exec",
        }
    }
}

impl fmt::Display for NodeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn kind_borrows_as_str() {
        let mut map = HashMap::new();
        map.insert(NodeKind::new("Acos"), 1);
        assert_eq!(map.get("Acos"), Some(&1));
        assert_eq!(NodeKind::from("Acos"), "Acos");
    }

    #[test]
    fn class_keys() {
        assert_eq!(NodeClass::Exec.config_prefix(), "sql.exec");
        assert_eq!(NodeClass::Expression.to_string(), "Expression");
    }
}
