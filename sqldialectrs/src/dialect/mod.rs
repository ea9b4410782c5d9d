//! Dialect adapters for different database engines.
//!
//! The generic compiler builds an abstract query and, at every point where
//! syntax differs between engines, asks the dialect for a SQL fragment.
//! Those points are split across two traits:
//! - [`QueryAdapter`]: time handling, intervals, gap-filling series,
//!   approximate distinct counts, pagination and function templates
//! - [`FilterAdapter`]: case-insensitive matching and parameter casts
//!
//! Default method bodies render the base (ANSI/Postgres flavoured) syntax;
//! each dialect overrides only what its engine does differently. Dialects are
//! stateless unit structs, so a single `&'static dyn Dialect` can be shared by
//! any number of concurrent compilations.
//!
//! Each dialect is implemented in its own file and gated behind a feature flag.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::context::QueryContext;
use crate::error::{DialectError, Result};
use crate::interval::IntervalSpec;
use crate::models::{FilterDescriptor, LikeMatchType, TimeGranularity};
use crate::templates::SqlTemplates;
use crate::time_series::TimeSeriesSource;

/// Positional placeholder the compiler later binds a parameter to.
pub const PARAM_PLACEHOLDER: &str = "?";

/// Renders every dialect-variable fragment that is not a predicate.
pub trait QueryAdapter: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Binds an ISO-8601 string parameter as a timestamp.
    fn timestamp_param(&self) -> String {
        self.cast_timestamp_literal(PARAM_PLACEHOLDER)
    }

    fn cast_timestamp_literal(&self, value: &str) -> String {
        format!("{value}::timestamptz")
    }

    fn cast_datetime_literal(&self, value: &str) -> String {
        format!("{value}::timestamp")
    }

    /// Reinterprets `field` in the query timezone, keeping its timestamp type.
    /// Identity when the context has no timezone.
    fn convert_tz(&self, ctx: &QueryContext, field: &str) -> String {
        match ctx.timezone() {
            Some(tz) => format!("({field}::timestamptz AT TIME ZONE {})", quote_literal(tz)),
            None => field.to_string(),
        }
    }

    /// Truncation unit for a granularity.
    fn granularity_unit(&self, granularity: TimeGranularity) -> Result<&'static str> {
        Ok(granularity.as_str())
    }

    fn time_grouped_column(&self, granularity: &str, dimension: &str) -> Result<String> {
        let unit = self.granularity_unit(granularity.parse()?)?;
        Ok(format!("date_trunc('{unit}', {dimension})"))
    }

    fn subtract_interval(&self, date: &str, interval: &str) -> Result<String> {
        let spec: IntervalSpec = interval.parse()?;
        Ok(format!("{date} - interval '{spec}'"))
    }

    fn add_interval(&self, date: &str, interval: &str) -> Result<String> {
        let spec: IntervalSpec = interval.parse()?;
        Ok(format!("{date} + interval '{spec}'"))
    }

    /// Derived table with one `(date_from, date_to)` row per bucket, in order.
    fn series_sql(&self, source: &dyn TimeSeriesSource) -> Result<String> {
        let values = collect_series(self.name(), source)?
            .iter()
            .map(|(from, to)| format!("({}, {})", quote_literal(from), quote_literal(to)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "SELECT date_from::timestamp AS \"date_from\", date_to::timestamp AS \"date_to\" \
             FROM (VALUES {values}) AS dates (date_from, date_to)"
        ))
    }

    fn unix_timestamp_sql(&self, ctx: &QueryContext) -> String {
        format!("EXTRACT(EPOCH FROM {})", ctx.now_timestamp_sql())
    }

    /// Refresh renewal threshold used when no policy is configured.
    fn default_refresh_renewal_threshold(&self) -> u64 {
        10
    }

    /// Polling interval used when no policy is configured.
    fn default_every_refresh_key(&self) -> IntervalSpec {
        IntervalSpec::fixed(10, "seconds")
    }

    /// Raw values to a storable sketch.
    fn hll_init(&self, _sql: &str) -> Result<String> {
        Err(DialectError::unsupported(self.name(), "approximate distinct sketch init"))
    }

    /// Pre-computed sketches to a cardinality estimate.
    fn hll_merge(&self, _sql: &str) -> Result<String> {
        Err(DialectError::unsupported(self.name(), "approximate distinct sketch merge"))
    }

    /// Raw values to a cardinality estimate in one step.
    fn count_distinct_approx(&self, _sql: &str) -> Result<String> {
        Err(DialectError::unsupported(self.name(), "approximate distinct count"))
    }

    /// ` LIMIT n OFFSET m` for the context's pagination.
    fn group_by_dimension_limit(&self, ctx: &QueryContext) -> Result<String> {
        let pagination = ctx.pagination();
        Ok(format!(
            "{}{}",
            pagination.limit_clause(),
            pagination.offset_clause()?
        ))
    }

    /// Dialect-specific function templates layered over the base registry.
    fn function_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn sql_templates(&self, base: &SqlTemplates) -> Result<SqlTemplates> {
        base.with_overlay(self.function_templates())
    }
}

/// Renders predicate fragments whose syntax varies by dialect.
pub trait FilterAdapter: Send + Sync + fmt::Debug {
    /// Case-insensitive pattern match of `column` against the bound `param`.
    fn like_ignore_case(
        &self,
        column: &str,
        negate: bool,
        param: &str,
        match_type: LikeMatchType,
    ) -> String {
        let prefix = if match_type.leading_wildcard() { "'%' || " } else { "" };
        let suffix = if match_type.trailing_wildcard() { " || '%'" } else { "" };
        format!(
            "{column}{} ILIKE {prefix}{param}{suffix} ESCAPE '\\'",
            not_keyword(negate)
        )
    }

    /// Parameter placeholder, cast according to the filter's declared type.
    fn cast_parameter(&self, _filter: &FilterDescriptor) -> String {
        PARAM_PLACEHOLDER.to_string()
    }
}

/// A complete dialect: both adapter roles for one engine.
pub trait Dialect: QueryAdapter + FilterAdapter {
    fn query_adapter(&self) -> &dyn QueryAdapter;
    fn filter_adapter(&self) -> &dyn FilterAdapter;
}

impl<T: QueryAdapter + FilterAdapter> Dialect for T {
    fn query_adapter(&self) -> &dyn QueryAdapter {
        self
    }

    fn filter_adapter(&self) -> &dyn FilterAdapter {
        self
    }
}

/// Quote a string literal with single quotes.
pub(crate) fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub(crate) fn not_keyword(negate: bool) -> &'static str {
    if negate {
        " NOT"
    } else {
        ""
    }
}

/// An empty derived table is not valid SQL in any dialect.
pub(crate) fn collect_series(
    dialect: &'static str,
    source: &dyn TimeSeriesSource,
) -> Result<Vec<(String, String)>> {
    let series = source.time_series()?;
    if series.is_empty() {
        return Err(DialectError::Config(format!(
            "{dialect}: cannot render an empty time series"
        )));
    }
    Ok(series)
}

// Feature-gated dialect implementations
#[cfg(feature = "presto")]
mod presto;
#[cfg(feature = "presto")]
pub use presto::PrestoDialect;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::PostgresDialect;

#[cfg(feature = "duckdb")]
mod duckdb;
#[cfg(feature = "duckdb")]
pub use duckdb::DuckDbDialect;

/// Dialects compiled into this build, resolvable by database type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    #[cfg(feature = "presto")]
    Presto,
    #[cfg(feature = "postgres")]
    Postgres,
    #[cfg(feature = "duckdb")]
    DuckDb,
}

impl DialectKind {
    pub fn all() -> &'static [DialectKind] {
        &[
            #[cfg(feature = "presto")]
            DialectKind::Presto,
            #[cfg(feature = "postgres")]
            DialectKind::Postgres,
            #[cfg(feature = "duckdb")]
            DialectKind::DuckDb,
        ]
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        match *self {
            #[cfg(feature = "presto")]
            DialectKind::Presto => &PrestoDialect,
            #[cfg(feature = "postgres")]
            DialectKind::Postgres => &PostgresDialect,
            #[cfg(feature = "duckdb")]
            DialectKind::DuckDb => &DuckDbDialect,
        }
    }
}

impl FromStr for DialectKind {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            #[cfg(feature = "presto")]
            "prestodb" | "presto" | "trino" => Ok(DialectKind::Presto),
            #[cfg(feature = "postgres")]
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            #[cfg(feature = "duckdb")]
            "duckdb" => Ok(DialectKind::DuckDb),
            _ => Err(DialectError::UnknownDialect(s.to_string())),
        }
    }
}
