//! DuckDB dialect implementation.

use std::collections::BTreeMap;

use crate::context::QueryContext;
use crate::error::Result;
use crate::models::{FilterDescriptor, ParamCast};
use crate::templates::ARGS_PLACEHOLDER;

use super::{quote_literal, FilterAdapter, QueryAdapter};

#[derive(Debug, Default, Clone, Copy)]
pub struct DuckDbDialect;

impl QueryAdapter for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn convert_tz(&self, ctx: &QueryContext, field: &str) -> String {
        match ctx.timezone() {
            Some(tz) => format!("timezone({}, {field}::timestamptz)", quote_literal(tz)),
            None => field.to_string(),
        }
    }

    // No sketch type to persist, so init/merge keep the unsupported defaults.
    fn count_distinct_approx(&self, sql: &str) -> Result<String> {
        Ok(format!("approx_count_distinct({sql})"))
    }

    fn function_templates(&self) -> BTreeMap<String, String> {
        [("DATETRUNC", "DATE_TRUNC"), ("DATEPART", "DATE_PART")]
            .into_iter()
            .map(|(name, call)| (name.to_string(), format!("{call}({ARGS_PLACEHOLDER})")))
            .collect()
    }
}

impl FilterAdapter for DuckDbDialect {
    fn cast_parameter(&self, filter: &FilterDescriptor) -> String {
        match filter.param_cast() {
            ParamCast::Boolean => "CAST(? AS BOOLEAN)".to_string(),
            ParamCast::Numeric => "CAST(? AS DOUBLE)".to_string(),
            ParamCast::None => "?".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DialectError;

    #[test]
    fn convert_tz_uses_timezone_function() {
        let ctx = QueryContext::new().with_timezone("UTC");
        assert_eq!(
            DuckDbDialect.convert_tz(&ctx, "e.ts"),
            "timezone('UTC', e.ts::timestamptz)"
        );
    }

    #[test]
    fn only_one_step_approx_count_is_supported() {
        assert_eq!(
            DuckDbDialect.count_distinct_approx("e.user_id").unwrap(),
            "approx_count_distinct(e.user_id)"
        );
        assert!(matches!(
            DuckDbDialect.hll_init("e.user_id"),
            Err(DialectError::UnsupportedCapability { dialect: "duckdb", .. })
        ));
        assert!(DuckDbDialect.hll_merge("e.user_hll").is_err());
    }
}
