//! Runtime configuration
//!
//! Every setting has a dotted key (`sql.enabled`, `sql.exec.Sort`, ...).
//! Settings come from TOML tables, whose nesting spells the same keys, or
//! from `key=value` strings given on a command line, applied in order so
//! later settings win.

use crate::error::ConfigError;
use indexmap::{IndexMap, IndexSet};
use ovr_plan::{NodeClass, NodeKind, DEFAULT_MAX_PLAN_DEPTH};
use ovr_registry::{TagContext, DEFAULT_MEMORY_BUDGET_BYTES};
use ovr_tagger::{ExplainMode, TagConfig};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Test-mode settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestModeConfig {
    /// Fail when a node unexpectedly stays on the host
    pub enabled: bool,
    /// Kinds permitted to stay on the host in test mode
    pub allowed_non_accelerated: IndexSet<NodeKind>,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideConfig {
    /// Master switch (`sql.enabled`)
    pub enabled: bool,
    /// Strict arithmetic (`sql.ansi.enabled`)
    pub ansi_enabled: bool,
    /// Memory budget in bytes (`sql.memoryBudget`)
    pub memory_budget_bytes: u64,
    /// Allow incompatible operators (`sql.incompatibleOps.enabled`)
    pub incompatible_ops: bool,
    /// Explain output (`sql.explain`)
    pub explain: ExplainMode,
    /// Expression-fallback fusion (`sql.expressionFallback.fuse`)
    pub fuse_expression_fallback: bool,
    /// Depth ceiling (`sql.maxPlanDepth`)
    pub max_plan_depth: usize,
    /// Test mode (`sql.test.*`)
    pub test: TestModeConfig,
    /// Per-operator switches (`sql.expression.<Kind>`, `sql.exec.<Kind>`)
    pub operators: IndexMap<NodeKind, bool>,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ansi_enabled: false,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            incompatible_ops: false,
            explain: ExplainMode::None,
            fuse_expression_fallback: true,
            max_plan_depth: DEFAULT_MAX_PLAN_DEPTH,
            test: TestModeConfig::default(),
            operators: IndexMap::new(),
        }
    }
}

impl OverrideConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With the master switch
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With strict arithmetic
    #[inline]
    #[must_use]
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.ansi_enabled = enabled;
        self
    }

    /// With memory budget
    #[inline]
    #[must_use]
    pub fn with_memory_budget(mut self, bytes: u64) -> Self {
        self.memory_budget_bytes = bytes;
        self
    }

    /// With incompatible operators allowed or not
    #[inline]
    #[must_use]
    pub fn with_incompatible_ops(mut self, allowed: bool) -> Self {
        self.incompatible_ops = allowed;
        self
    }

    /// With explain mode
    #[inline]
    #[must_use]
    pub fn with_explain(mut self, mode: ExplainMode) -> Self {
        self.explain = mode;
        self
    }

    /// With expression-fallback fusion
    #[inline]
    #[must_use]
    pub fn with_expression_fusion(mut self, fuse: bool) -> Self {
        self.fuse_expression_fallback = fuse;
        self
    }

    /// With depth ceiling
    #[inline]
    #[must_use]
    pub fn with_max_plan_depth(mut self, depth: usize) -> Self {
        self.max_plan_depth = depth;
        self
    }

    /// With test mode, allowing `allowed` kinds to stay on the host
    #[must_use]
    pub fn with_test_mode<I, K>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<NodeKind>,
    {
        self.test.enabled = true;
        self.test.allowed_non_accelerated = allowed.into_iter().map(Into::into).collect();
        self
    }

    /// With a per-operator switch
    #[must_use]
    pub fn with_operator(mut self, kind: impl Into<NodeKind>, enabled: bool) -> Self {
        self.operators.insert(kind.into(), enabled);
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on bad syntax; key and value errors as in
    /// [`OverrideConfig::set`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = text.parse()?;
        Self::from_table(&table)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`OverrideConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Apply every setting of a TOML table on top of the defaults
    ///
    /// # Errors
    /// As [`OverrideConfig::set`].
    pub fn from_table(table: &toml::Table) -> Result<Self, ConfigError> {
        let mut settings = Vec::new();
        flatten("", table, &mut settings)?;
        let mut config = Self::default();
        for (key, value) in settings {
            config.set(&key, &value)?;
        }
        Ok(config)
    }

    /// Apply one `key=value` setting
    ///
    /// # Errors
    /// [`ConfigError::MalformedSetting`] without `=`, otherwise as
    /// [`OverrideConfig::set`].
    pub fn apply_setting(&mut self, setting: &str) -> Result<(), ConfigError> {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedSetting(setting.to_string()))?;
        self.set(key.trim(), value.trim())
    }

    /// Set one key
    ///
    /// # Errors
    /// [`ConfigError::UnknownKey`] for keys outside the `sql.` namespace
    /// described in the module docs, [`ConfigError::InvalidValue`] when
    /// the value does not parse.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "sql.enabled" => self.enabled = parse_bool(key, value)?,
            "sql.ansi.enabled" => self.ansi_enabled = parse_bool(key, value)?,
            "sql.memoryBudget" => self.memory_budget_bytes = parse_bytes(key, value)?,
            "sql.incompatibleOps.enabled" => self.incompatible_ops = parse_bool(key, value)?,
            "sql.explain" => {
                self.explain = value
                    .parse()
                    .map_err(|e: ovr_tagger::ExplainModeParseError| {
                        invalid(key, value, e.to_string())
                    })?;
            }
            "sql.expressionFallback.fuse" => {
                self.fuse_expression_fallback = parse_bool(key, value)?;
            }
            "sql.maxPlanDepth" => {
                self.max_plan_depth = value
                    .parse()
                    .map_err(|_| invalid(key, value, "expected a non-negative integer"))?;
            }
            "sql.test.enabled" => self.test.enabled = parse_bool(key, value)?,
            "sql.test.allowedNonAccelerated" => {
                self.test.allowed_non_accelerated = value
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(NodeKind::from)
                    .collect();
            }
            _ => {
                let kind = operator_kind(key).ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
                let enabled = parse_bool(key, value)?;
                self.operators.insert(NodeKind::from(kind), enabled);
            }
        }
        Ok(())
    }

    /// Extra-check context for the tagger
    #[must_use]
    pub fn tag_context(&self) -> TagContext {
        TagContext::default()
            .with_ansi_strict(self.ansi_enabled)
            .with_memory_budget(self.memory_budget_bytes)
    }

    /// Tagger configuration
    #[must_use]
    pub fn tag_config(&self) -> TagConfig {
        let mut config = TagConfig::new()
            .with_enabled(self.enabled)
            .with_context(self.tag_context())
            .with_incompatible_ops(self.incompatible_ops)
            .with_expression_fusion(self.fuse_expression_fallback)
            .with_max_depth(self.max_plan_depth);
        for (kind, &enabled) in &self.operators {
            config = if enabled {
                config.enable(kind.clone())
            } else {
                config.disable(kind.clone())
            };
        }
        config
    }
}

impl<'de> Deserialize<'de> for OverrideConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = toml::Table::deserialize(deserializer)?;
        Self::from_table(&table).map_err(serde::de::Error::custom)
    }
}

/// Kind named by a per-operator key
fn operator_kind(key: &str) -> Option<&str> {
    [NodeClass::Expression, NodeClass::Exec]
        .into_iter()
        .find_map(|class| {
            key.strip_prefix(class.config_prefix())
                .and_then(|rest| rest.strip_prefix('.'))
        })
        .filter(|kind| !kind.is_empty() && !kind.contains('.'))
}

/// Collect `(dotted.key, value)` pairs, tables first to last
fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut Vec<(String, String)>,
) -> Result<(), ConfigError> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten(&key, inner, out)?,
            toml::Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(|item| scalar(&key, item))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(",");
                out.push((key, joined));
            }
            other => {
                let text = scalar(&key, other)?;
                out.push((key, text));
            }
        }
    }
    Ok(())
}

fn scalar(key: &str, value: &toml::Value) -> Result<String, ConfigError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(invalid(
            key,
            &other.to_string(),
            format!("unsupported {} value", other.type_str()),
        )),
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value, "expected true or false")),
    }
}

/// Byte count with an optional `k`, `m` or `g` suffix (powers of 1024)
fn parse_bytes(key: &str, value: &str) -> Result<u64, ConfigError> {
    let lower = value.trim().to_ascii_lowercase();
    let (digits, shift) = match lower.char_indices().last() {
        Some((i, 'k')) => (&lower[..i], 10),
        Some((i, 'm')) => (&lower[..i], 20),
        Some((i, 'g')) => (&lower[..i], 30),
        _ => (lower.as_str(), 0),
    };
    let count: u64 = digits
        .trim()
        .parse()
        .map_err(|_| invalid(key, value, "expected a byte count such as 512m"))?;
    count
        .checked_mul(1_u64 << shift)
        .ok_or_else(|| invalid(key, value, "byte count overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_accept_suffixes() {
        assert_eq!(parse_bytes("k", "512").unwrap(), 512);
        assert_eq!(parse_bytes("k", "4k").unwrap(), 4096);
        assert_eq!(parse_bytes("k", "512M").unwrap(), 512 << 20);
        assert_eq!(parse_bytes("k", "2g").unwrap(), 2 << 30);
        assert!(parse_bytes("k", "lots").is_err());
        assert!(parse_bytes("k", "").is_err());
    }

    #[test]
    fn operator_keys_name_one_kind() {
        assert_eq!(operator_kind("sql.exec.Sort"), Some("Sort"));
        assert_eq!(operator_kind("sql.expression.Upper"), Some("Upper"));
        assert_eq!(operator_kind("sql.exec."), None);
        assert_eq!(operator_kind("sql.exec.a.b"), None);
        assert_eq!(operator_kind("sql.other.Sort"), None);
    }

    #[test]
    fn settings_apply_in_order() {
        let mut config = OverrideConfig::new();
        config.apply_setting("sql.enabled=false").unwrap();
        config.apply_setting("sql.enabled = true").unwrap();
        config.apply_setting("sql.explain=not_on_gpu").unwrap();
        config.apply_setting("sql.exec.CollectLimit=true").unwrap();
        config.apply_setting("sql.expression.Acos=false").unwrap();
        assert!(config.enabled);
        assert_eq!(config.explain, ExplainMode::NotOnAccelerator);

        let tag = config.tag_config();
        assert!(tag.is_explicitly_enabled("CollectLimit"));
        assert!(tag.is_disabled("Acos"));
    }

    #[test]
    fn bad_settings_are_reported() {
        let mut config = OverrideConfig::new();
        assert!(matches!(
            config.apply_setting("sql.enabled"),
            Err(ConfigError::MalformedSetting(_))
        ));
        assert!(matches!(
            config.set("sql.unknown", "1"),
            Err(ConfigError::UnknownKey(k)) if k == "sql.unknown"
        ));
        assert!(matches!(
            config.set("sql.enabled", "yes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set("sql.explain", "VERBOSE"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn tag_config_carries_context() {
        let config = OverrideConfig::new()
            .with_ansi(true)
            .with_memory_budget(1024)
            .with_max_plan_depth(8);
        let tag = config.tag_config();
        assert!(tag.context.ansi_strict);
        assert_eq!(tag.context.memory_budget_bytes, 1024);
        assert_eq!(tag.max_depth, 8);
        assert!(tag.fuse_expression_fallback);
    }
}
