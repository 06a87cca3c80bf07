//! Support matrix documentation
//!
//! For every registered rule and every type tag, whether the accelerated
//! operator supports it (`S`), only the host does (`NS`), or the type
//! does not apply to the operator at all (`NA`).

use crate::registry::RuleRegistry;
use indexmap::IndexMap;
use ovr_plan::{NodeClass, NodeKind};
use ovr_sig::TypeTag;
use serde::Serialize;
use std::fmt::Write as _;

/// Support level of one operator for one type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Support {
    /// Supported on the accelerator
    #[serde(rename = "S")]
    Supported,
    /// Supported on the host only
    #[serde(rename = "NS")]
    NotSupported,
    /// Not applicable to this operator
    #[serde(rename = "NA")]
    NotApplicable,
}

impl Support {
    /// Table cell text
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supported => "S",
            Self::NotSupported => "NS",
            Self::NotApplicable => "NA",
        }
    }
}

/// Support of one operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportRow {
    /// Node kind
    pub kind: NodeKind,
    /// Node class
    pub class: NodeClass,
    /// Rule description
    pub description: String,
    /// Compatibility note, if the operator is restricted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Support per type tag, in [`TypeTag::ALL`] order
    pub support: IndexMap<TypeTag, Support>,
}

/// Support of every registered operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportMatrix {
    /// Rows in registration order
    pub rows: Vec<SupportRow>,
}

impl SupportMatrix {
    /// Build the matrix for `registry`
    #[must_use]
    pub fn from_registry(registry: &RuleRegistry) -> Self {
        let rows = registry
            .rules()
            .map(|rule| {
                let support = TypeTag::ALL
                    .into_iter()
                    .map(|tag| {
                        let level = if rule.accelerated_sig().supports_tag(tag) {
                            Support::Supported
                        } else if rule.host_sig().supports_tag(tag) {
                            Support::NotSupported
                        } else {
                            Support::NotApplicable
                        };
                        (tag, level)
                    })
                    .collect();
                SupportRow {
                    kind: rule.kind().clone(),
                    class: rule.class(),
                    description: rule.description().to_string(),
                    notes: rule.compat().note().map(str::to_string),
                    support,
                }
            })
            .collect();
        Self { rows }
    }

    /// Row for `kind`
    #[must_use]
    pub fn row(&self, kind: &str) -> Option<&SupportRow> {
        self.rows.iter().find(|r| r.kind == kind)
    }

    /// Render as a Markdown table
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("| Operator | Class | Description | Notes |");
        for tag in TypeTag::ALL {
            let _ = write!(out, " {tag} |");
        }
        out.push_str("\n|---|---|---|---|");
        for _ in TypeTag::ALL {
            out.push_str("---|");
        }
        out.push('\n');
        for row in &self.rows {
            let _ = write!(
                out,
                "| {} | {} | {} | {} |",
                row.kind,
                row.class,
                row.description,
                row.notes.as_deref().unwrap_or("None")
            );
            for level in row.support.values() {
                let _ = write!(out, " {} |", level.as_str());
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;

    #[test]
    fn math_rows() {
        let matrix = RegistryBuilder::with_defaults().unwrap().build().support_matrix();
        let acos = matrix.row("Acos").unwrap();
        assert_eq!(acos.support[&TypeTag::Double], Support::Supported);
        assert_eq!(acos.support[&TypeTag::String], Support::NotApplicable);
        assert_eq!(acos.support.len(), TypeTag::ALL.len());

        let scan = matrix.row("Scan").unwrap();
        assert_eq!(scan.support[&TypeTag::Binary], Support::NotSupported);
        assert_eq!(scan.support[&TypeTag::Struct], Support::Supported);
    }

    #[test]
    fn markdown_has_header_and_rows() {
        let matrix = RegistryBuilder::with_defaults().unwrap().build().support_matrix();
        let md = matrix.to_markdown();
        let mut lines = md.lines();
        assert!(lines.next().unwrap().starts_with("| Operator | Class |"));
        assert!(md.contains("| Upper | Expression | upper case | case conversion"));
        assert_eq!(md.lines().count(), matrix.rows.len() + 2);
    }

    #[test]
    fn json_uses_short_codes() {
        let matrix = RegistryBuilder::with_defaults().unwrap().build().support_matrix();
        let json = serde_json::to_value(matrix.row("Acos").unwrap()).unwrap();
        assert_eq!(json["support"]["DOUBLE"], "S");
        assert_eq!(json["support"]["STRING"], "NA");
    }
}
