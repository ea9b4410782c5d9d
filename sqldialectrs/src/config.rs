//! Configuration system for the dialect layer.
//!
//! Supports TOML-based configuration with global defaults and per-dialect overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::QueryContext;
use crate::dialect::{Dialect, DialectKind, QueryAdapter};
use crate::error::{DialectError, Result};
use crate::models::TimeGranularity;
use crate::refresh::RefreshKeyPolicy;
use crate::time_series::{TimeDimension, DEFAULT_MAX_BUCKETS};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlDialectConfig {
    /// Global defaults applied to all dialects unless overridden.
    pub defaults: GlobalDefaults,

    /// Per-dialect configuration overrides (keyed by dialect name).
    #[serde(default)]
    pub dialects: HashMap<String, DialectOverrides>,
}

/// Global default settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalDefaults {
    pub query: QueryConfig,
    pub time_series: TimeSeriesConfig,
    pub refresh: RefreshConfig,
}

/// Query compilation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Database type used to pick a dialect (default: "postgres").
    pub db_type: String,
    /// Timezone queries are converted to; unset means no conversion.
    pub timezone: Option<String>,
}

/// Gap-filling series configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeSeriesConfig {
    /// Maximum buckets in one generated series (default: 50000).
    pub max_buckets: usize,
}

/// Refresh key policy overrides. Unset fields use the dialect defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub renewal_threshold_secs: Option<u64>,
    /// Interval spec such as "5 minutes".
    pub every: Option<String>,
}

/// Per-dialect configuration (can override globals).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectOverrides {
    pub query: Option<QueryConfig>,
    pub time_series: Option<TimeSeriesConfig>,
    pub refresh: Option<RefreshConfig>,
}

// Default implementations

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            db_type: "postgres".to_string(),
            timezone: None,
        }
    }
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            max_buckets: DEFAULT_MAX_BUCKETS,
        }
    }
}

impl SqlDialectConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| DialectError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `SQLDIALECT_CONFIG` environment variable
    /// 2. `./sqldialect.toml` (current directory)
    /// 3. `~/.config/sqldialect/config.toml` (user config dir)
    /// 4. Built-in defaults
    ///
    /// A candidate that exists but cannot be loaded is skipped with a warning.
    pub fn load_default() -> Self {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var("SQLDIALECT_CONFIG") {
            let path = PathBuf::from(path);
            if !path.exists() {
                tracing::warn!(
                    path = %path.display(),
                    "SQLDIALECT_CONFIG points to a missing file"
                );
            }
            candidates.push(path);
        }
        candidates.push(PathBuf::from("sqldialect.toml"));
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("sqldialect").join("config.toml"));
        }

        Self::load_first(&candidates).unwrap_or_else(|| {
            tracing::debug!("no config file found, using defaults");
            Self::default()
        })
    }

    /// First candidate that loads cleanly. Missing files are skipped silently.
    fn load_first(candidates: &[PathBuf]) -> Option<Self> {
        for path in candidates {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "loaded config");
                    return Some(cfg);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring config file")
                }
            }
        }
        None
    }

    /// Dialect selected by `defaults.query.db_type`.
    pub fn default_dialect(&self) -> Result<&'static dyn Dialect> {
        Ok(self.defaults.query.db_type.parse::<DialectKind>()?.dialect())
    }

    /// Get resolved config for a specific dialect (merges global defaults).
    ///
    /// Override sections may be keyed by any alias of the dialect (`trino`,
    /// `presto`, `postgresql`); an exact key match wins.
    pub fn for_dialect(&self, name: &str) -> ResolvedDialectConfig {
        let overrides = self.dialects.get(name).or_else(|| {
            let kind = name.parse::<DialectKind>().ok()?;
            self.dialects
                .iter()
                .filter(|(key, _)| key.parse::<DialectKind>().ok() == Some(kind))
                .min_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, overrides)| overrides)
        });
        ResolvedDialectConfig::merge(&self.defaults, overrides)
    }
}

/// Fully resolved configuration for a dialect (no optional sections).
#[derive(Debug, Clone)]
pub struct ResolvedDialectConfig {
    pub query: QueryConfig,
    pub time_series: TimeSeriesConfig,
    pub refresh: RefreshConfig,
}

impl ResolvedDialectConfig {
    fn merge(defaults: &GlobalDefaults, override_cfg: Option<&DialectOverrides>) -> Self {
        match override_cfg {
            Some(d) => Self {
                query: d.query.clone().unwrap_or_else(|| defaults.query.clone()),
                time_series: d
                    .time_series
                    .clone()
                    .unwrap_or_else(|| defaults.time_series.clone()),
                refresh: d.refresh.clone().unwrap_or_else(|| defaults.refresh.clone()),
            },
            None => Self {
                query: defaults.query.clone(),
                time_series: defaults.time_series.clone(),
                refresh: defaults.refresh.clone(),
            },
        }
    }

    /// Query context carrying the configured timezone.
    pub fn query_context(&self) -> QueryContext {
        match &self.query.timezone {
            Some(tz) => QueryContext::new().with_timezone(tz.clone()),
            None => QueryContext::new(),
        }
    }

    /// Time dimension bounded by the configured bucket cap.
    pub fn time_dimension(
        &self,
        dimension: impl Into<String>,
        granularity: TimeGranularity,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> TimeDimension {
        TimeDimension::new(dimension, granularity, from, to)
            .with_max_buckets(self.time_series.max_buckets)
    }

    pub fn refresh_policy(&self, adapter: &dyn QueryAdapter) -> Result<RefreshKeyPolicy> {
        RefreshKeyPolicy::resolve(Some(&self.refresh), adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = SqlDialectConfig::default();
        assert_eq!(cfg.defaults.query.db_type, "postgres");
        assert_eq!(cfg.defaults.query.timezone, None);
        assert_eq!(cfg.defaults.time_series.max_buckets, 50_000);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[defaults.query]
db_type = "prestodb"
timezone = "America/Los_Angeles"

[dialects.prestodb.refresh]
renewal_threshold_secs = 300
every = "5 minutes"
"#;
        let cfg = SqlDialectConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.defaults.query.db_type, "prestodb");

        let resolved = cfg.for_dialect("prestodb");
        assert_eq!(resolved.refresh.renewal_threshold_secs, Some(300));
        assert_eq!(
            resolved.query_context().timezone(),
            Some("America/Los_Angeles")
        );
    }

    #[test]
    fn test_dialect_override() {
        let toml = r#"
[defaults.time_series]
max_buckets = 1000

[dialects.duckdb.time_series]
max_buckets = 20
"#;
        let cfg = SqlDialectConfig::from_toml(toml).unwrap();

        let default_resolved = cfg.for_dialect("postgres");
        assert_eq!(default_resolved.time_series.max_buckets, 1000);

        let duck_resolved = cfg.for_dialect("duckdb");
        assert_eq!(duck_resolved.time_series.max_buckets, 20);
        let td =
            duck_resolved.time_dimension("d", TimeGranularity::Day, "2020-01-01", "2020-01-31");
        assert_eq!(td.max_buckets, 20);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqldialect.toml");
        std::fs::write(&path, "[defaults.query]\ndb_type = \"duckdb\"\n").unwrap();
        let cfg = SqlDialectConfig::from_file(&path).unwrap();
        assert_eq!(cfg.defaults.query.db_type, "duckdb");

        assert!(matches!(
            SqlDialectConfig::from_file(dir.path().join("missing.toml")),
            Err(DialectError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            SqlDialectConfig::from_toml("[defaults.query\n"),
            Err(DialectError::Config(_))
        ));
    }

    #[cfg(feature = "presto")]
    #[test]
    fn test_refresh_policy_from_config() {
        let toml = r#"
[defaults.refresh]
every = "1 hour"
"#;
        let cfg = SqlDialectConfig::from_toml(toml).unwrap();
        let dialect = "prestodb".parse::<DialectKind>().unwrap().dialect();
        let policy = cfg
            .for_dialect("prestodb")
            .refresh_policy(dialect.query_adapter())
            .unwrap();
        assert_eq!(policy.renewal_threshold_secs, 120);
        assert_eq!(policy.every.to_string(), "1 hour");
    }

    #[test]
    fn test_malformed_candidate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[defaults.query\n").unwrap();
        std::fs::write(&valid, "[defaults.query]\ndb_type = \"duckdb\"\n").unwrap();

        let candidates = vec![dir.path().join("missing.toml"), broken.clone(), valid];
        let cfg = SqlDialectConfig::load_first(&candidates).unwrap();
        assert_eq!(cfg.defaults.query.db_type, "duckdb");
        assert!(SqlDialectConfig::load_first(&[broken]).is_none());
    }

    #[cfg(feature = "presto")]
    #[test]
    fn test_overrides_keyed_by_alias() {
        let toml = r#"
[dialects.trino.refresh]
every = "5 minutes"
"#;
        let cfg = SqlDialectConfig::from_toml(toml).unwrap();
        let dialect = crate::dialect_for("trino").unwrap();
        let policy = cfg
            .for_dialect(dialect.name())
            .refresh_policy(dialect.query_adapter())
            .unwrap();
        assert_eq!(policy.every.to_string(), "5 minutes");
        assert_eq!(cfg.for_dialect("presto").refresh.every.as_deref(), Some("5 minutes"));
        assert_eq!(cfg.for_dialect("unknown").refresh.every, None);
    }

    #[cfg(feature = "presto")]
    #[test]
    fn test_exact_override_key_wins_over_alias() {
        let toml = r#"
[dialects.trino.time_series]
max_buckets = 10

[dialects.prestodb.time_series]
max_buckets = 20
"#;
        let cfg = SqlDialectConfig::from_toml(toml).unwrap();
        assert_eq!(cfg.for_dialect("prestodb").time_series.max_buckets, 20);
        assert_eq!(cfg.for_dialect("trino").time_series.max_buckets, 10);
    }
}
