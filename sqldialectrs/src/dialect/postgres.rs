//! PostgreSQL dialect implementation.
//!
//! Time handling, intervals and pagination are the base defaults. Approximate
//! distinct counting relies on the `hll` extension being installed.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{FilterDescriptor, ParamCast};
use crate::templates::ARGS_PLACEHOLDER;

use super::{FilterAdapter, QueryAdapter};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl QueryAdapter for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn hll_init(&self, sql: &str) -> Result<String> {
        Ok(format!("hll_add_agg(hll_hash_any({sql}))"))
    }

    fn hll_merge(&self, sql: &str) -> Result<String> {
        Ok(format!("round(hll_cardinality(hll_union_agg({sql})))"))
    }

    fn count_distinct_approx(&self, sql: &str) -> Result<String> {
        Ok(format!("round(hll_cardinality(hll_add_agg(hll_hash_any({sql}))))"))
    }

    fn function_templates(&self) -> BTreeMap<String, String> {
        [
            ("DATETRUNC", "DATE_TRUNC"),
            ("DATEPART", "DATE_PART"),
            ("STRING_AGG", "STRING_AGG"),
        ]
        .into_iter()
        .map(|(name, call)| (name.to_string(), format!("{call}({ARGS_PLACEHOLDER})")))
        .collect()
    }
}

impl FilterAdapter for PostgresDialect {
    fn cast_parameter(&self, filter: &FilterDescriptor) -> String {
        match filter.param_cast() {
            ParamCast::Boolean => "?::boolean".to_string(),
            ParamCast::Numeric => "?::numeric".to_string(),
            ParamCast::None => "?".to_string(),
        }
    }
}
