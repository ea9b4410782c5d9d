//! Presto / Trino dialect implementation.

use std::collections::BTreeMap;

use crate::context::QueryContext;
use crate::error::Result;
use crate::interval::IntervalSpec;
use crate::models::{FilterDescriptor, LikeMatchType, ParamCast};
use crate::templates::ARGS_PLACEHOLDER;
use crate::time_series::TimeSeriesSource;

use super::{collect_series, not_keyword, quote_literal, FilterAdapter, QueryAdapter};

#[derive(Debug, Default, Clone, Copy)]
pub struct PrestoDialect;

impl QueryAdapter for PrestoDialect {
    fn name(&self) -> &'static str {
        "prestodb"
    }

    fn timestamp_param(&self) -> String {
        "from_iso8601_timestamp(?)".to_string()
    }

    fn cast_timestamp_literal(&self, value: &str) -> String {
        format!("from_iso8601_timestamp({value})")
    }

    fn cast_datetime_literal(&self, value: &str) -> String {
        format!("from_iso8601_timestamp({value})")
    }

    fn convert_tz(&self, ctx: &QueryContext, field: &str) -> String {
        let Some(tz) = ctx.timezone() else {
            return field.to_string();
        };
        // AT TIME ZONE yields a timestamp with time zone; add the zone offset
        // back onto the plain timestamp instead.
        let at_tz = format!("{field} AT TIME ZONE {}", quote_literal(tz));
        format!(
            "CAST(date_add('minute', timezone_minute({at_tz}), \
             date_add('hour', timezone_hour({at_tz}), {field})) AS TIMESTAMP)"
        )
    }

    fn subtract_interval(&self, date: &str, interval: &str) -> Result<String> {
        let spec: IntervalSpec = interval.parse()?;
        Ok(format!(
            "{date} - interval '{}' {}",
            spec.value(),
            spec.singular_unit()
        ))
    }

    fn add_interval(&self, date: &str, interval: &str) -> Result<String> {
        let spec: IntervalSpec = interval.parse()?;
        Ok(format!(
            "{date} + interval '{}' {}",
            spec.value(),
            spec.singular_unit()
        ))
    }

    fn series_sql(&self, source: &dyn TimeSeriesSource) -> Result<String> {
        let values = collect_series(self.name(), source)?
            .iter()
            .map(|(from, to)| format!("select {} f, {} t", quote_literal(from), quote_literal(to)))
            .collect::<Vec<_>>()
            .join(" UNION ALL ");
        Ok(format!(
            "SELECT from_iso8601_timestamp(dates.f) date_from, \
             from_iso8601_timestamp(dates.t) date_to FROM ({values}) AS dates"
        ))
    }

    fn unix_timestamp_sql(&self, ctx: &QueryContext) -> String {
        format!("to_unixtime({})", ctx.now_timestamp_sql())
    }

    fn default_refresh_renewal_threshold(&self) -> u64 {
        120
    }

    fn default_every_refresh_key(&self) -> IntervalSpec {
        IntervalSpec::fixed(2, "minutes")
    }

    fn hll_init(&self, sql: &str) -> Result<String> {
        Ok(format!("cast(approx_set({sql}) as varbinary)"))
    }

    fn hll_merge(&self, sql: &str) -> Result<String> {
        Ok(format!("cardinality(merge(cast({sql} as HyperLogLog)))"))
    }

    fn count_distinct_approx(&self, sql: &str) -> Result<String> {
        Ok(format!("approx_distinct({sql})"))
    }

    /// Presto requires OFFSET ahead of LIMIT.
    fn group_by_dimension_limit(&self, ctx: &QueryContext) -> Result<String> {
        let pagination = ctx.pagination();
        Ok(format!(
            "{}{}",
            pagination.offset_clause()?,
            pagination.limit_clause()
        ))
    }

    fn function_templates(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            "DATETRUNC".to_string(),
            format!("DATE_TRUNC({ARGS_PLACEHOLDER})"),
        )])
    }
}

impl FilterAdapter for PrestoDialect {
    /// Presto has no ILIKE: lower both sides and match with an explicit escape.
    fn like_ignore_case(
        &self,
        column: &str,
        negate: bool,
        param: &str,
        match_type: LikeMatchType,
    ) -> String {
        let prefix = if match_type.leading_wildcard() { "%" } else { "" };
        let suffix = if match_type.trailing_wildcard() { "%" } else { "" };
        format!(
            "LOWER({column}){} LIKE CONCAT('{prefix}', LOWER({param}), '{suffix}') ESCAPE '\\'",
            not_keyword(negate)
        )
    }

    fn cast_parameter(&self, filter: &FilterDescriptor) -> String {
        match filter.param_cast() {
            ParamCast::Boolean => "CAST(? AS BOOLEAN)".to_string(),
            ParamCast::Numeric => "CAST(? AS DOUBLE)".to_string(),
            ParamCast::None => "?".to_string(),
        }
    }
}
