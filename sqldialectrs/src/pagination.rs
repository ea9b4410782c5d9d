//! Row limit and offset state owned by the query context.
//!
//! Limits and offsets arrive from the request layer as loosely typed JSON
//! (numbers or numeric strings). The adapters only render them, so coercion
//! rules live here and are shared by every dialect:
//! - an explicit `null` limit means unlimited (no LIMIT clause)
//! - an unset, zero or unparseable limit falls back to [`DEFAULT_ROW_LIMIT`]
//! - a falsy offset renders nothing; a present offset must be a non-negative integer

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DialectError, Result};

/// Row cap applied when no usable limit was requested.
pub const DEFAULT_ROW_LIMIT: u64 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowLimit {
    #[default]
    Unset,
    Unlimited,
    Value(Value),
}

impl RowLimit {
    pub fn rows(n: u64) -> Self {
        RowLimit::Value(Value::from(n))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, RowLimit::Unset)
    }

    /// Effective limit, `None` meaning unlimited.
    pub fn resolve(&self) -> Option<u64> {
        match self {
            RowLimit::Unlimited | RowLimit::Value(Value::Null) => None,
            RowLimit::Unset => Some(DEFAULT_ROW_LIMIT),
            RowLimit::Value(value) => match leading_integer(value) {
                Some(n) if n > 0 => Some(n as u64),
                _ => {
                    tracing::debug!(
                        limit = %value,
                        cap = DEFAULT_ROW_LIMIT,
                        "row limit is not a positive integer, using default cap"
                    );
                    Some(DEFAULT_ROW_LIMIT)
                }
            },
        }
    }
}

impl<'de> Deserialize<'de> for RowLimit {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A missing field is handled by `#[serde(default)]` on the container.
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None => RowLimit::Unlimited,
            Some(v) => RowLimit::Value(v),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationState {
    /// Omitted when unset; a serialized `null` reads back as unlimited.
    #[serde(skip_serializing_if = "RowLimit::is_unset")]
    pub row_limit: RowLimit,
    pub offset: Option<Value>,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, row_limit: RowLimit) -> Self {
        self.row_limit = row_limit;
        self
    }

    pub fn with_offset(mut self, offset: impl Into<Value>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn limit(&self) -> Option<u64> {
        self.row_limit.resolve()
    }

    /// Effective offset. Falsy values yield `None`.
    pub fn offset(&self) -> Result<Option<u64>> {
        let value = match &self.offset {
            None => return Ok(None),
            Some(v) if is_falsy(v) => return Ok(None),
            Some(v) => v,
        };
        match leading_integer(value) {
            Some(0) => Ok(None),
            Some(n) if n > 0 => Ok(Some(n as u64)),
            Some(n) => Err(DialectError::Pagination(format!(
                "offset must not be negative, got {n}"
            ))),
            None => Err(DialectError::Pagination(format!(
                "offset {value} is not an integer"
            ))),
        }
    }

    /// ` LIMIT n`, or empty when unlimited.
    pub fn limit_clause(&self) -> String {
        match self.limit() {
            Some(n) => format!(" LIMIT {n}"),
            None => String::new(),
        }
    }

    /// ` OFFSET n`, or empty when there is no offset.
    pub fn offset_clause(&self) -> Result<String> {
        Ok(match self.offset()? {
            Some(n) => format!(" OFFSET {n}"),
            None => String::new(),
        })
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Leading base-10 integer of a number or numeric string (`"25rows"` -> 25).
fn leading_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.as_bytes().first() {
                Some(b'-') => (-1, &s[1..]),
                Some(b'+') => (1, &s[1..]),
                _ => (1, s),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().ok().map(|n| sign * n)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_limit_uses_default_cap() {
        assert_eq!(PaginationState::new().limit(), Some(DEFAULT_ROW_LIMIT));
    }

    #[test]
    fn null_limit_is_unlimited() {
        let state = PaginationState::new().with_limit(RowLimit::Unlimited);
        assert_eq!(state.limit(), None);
        assert_eq!(state.limit_clause(), "");

        let state = PaginationState::new().with_limit(RowLimit::Value(Value::Null));
        assert_eq!(state.limit(), None);
    }

    #[test]
    fn unusable_limits_fall_back_to_cap() {
        for raw in [json!(0), json!("abc"), json!(-5), json!(""), json!(true)] {
            let state = PaginationState::new().with_limit(RowLimit::Value(raw.clone()));
            assert_eq!(state.limit(), Some(DEFAULT_ROW_LIMIT), "limit {raw}");
        }
    }

    #[test]
    fn numeric_strings_parse_like_integers() {
        let state = PaginationState::new().with_limit(RowLimit::Value(json!("25rows")));
        assert_eq!(state.limit(), Some(25));
        let state = PaginationState::new().with_limit(RowLimit::Value(json!(12.9)));
        assert_eq!(state.limit(), Some(12));
        assert_eq!(
            PaginationState::new().with_limit(RowLimit::rows(500)).limit_clause(),
            " LIMIT 500"
        );
    }

    #[test]
    fn falsy_offsets_render_nothing() {
        for raw in [json!(0), json!(""), json!(false), json!(null), json!("0")] {
            let state = PaginationState::new().with_offset(raw.clone());
            assert_eq!(state.offset().unwrap(), None, "offset {raw}");
            assert_eq!(state.offset_clause().unwrap(), "");
        }
    }

    #[test]
    fn offset_parses_as_integer() {
        let state = PaginationState::new().with_offset("5");
        assert_eq!(state.offset_clause().unwrap(), " OFFSET 5");
        let state = PaginationState::new().with_offset(40);
        assert_eq!(state.offset().unwrap(), Some(40));
    }

    #[test]
    fn malformed_offsets_are_errors() {
        let state = PaginationState::new().with_offset("later");
        assert!(matches!(state.offset(), Err(DialectError::Pagination(_))));
        let state = PaginationState::new().with_offset(-3);
        assert!(matches!(state.offset(), Err(DialectError::Pagination(_))));
    }

    #[test]
    fn deserializes_null_and_missing_limits_differently() {
        let state: PaginationState = serde_json::from_str(r#"{"row_limit": null}"#).unwrap();
        assert_eq!(state.row_limit, RowLimit::Unlimited);
        let state: PaginationState = serde_json::from_str(r#"{"offset": 10}"#).unwrap();
        assert_eq!(state.row_limit, RowLimit::Unset);
        assert_eq!(state.offset().unwrap(), Some(10));
    }

    #[test]
    fn serialized_state_keeps_its_row_cap() {
        for state in [
            PaginationState::new(),
            PaginationState::new().with_limit(RowLimit::Unlimited),
            PaginationState::new()
                .with_limit(RowLimit::rows(25))
                .with_offset(5),
        ] {
            let raw = serde_json::to_string(&state).unwrap();
            let restored: PaginationState = serde_json::from_str(&raw).unwrap();
            assert_eq!(restored.limit(), state.limit(), "{raw}");
            assert_eq!(restored.offset().unwrap(), state.offset().unwrap(), "{raw}");
        }
        let raw = serde_json::to_string(&PaginationState::new()).unwrap();
        assert!(!raw.contains("row_limit"), "{raw}");
    }
}
