use crate::pagination::PaginationState;

/// Now expression used when the compiler does not supply its own.
pub const DEFAULT_NOW_SQL: &str = "NOW()";

/// Immutable per-query state the adapters read from.
///
/// Built once by the compiler for each compilation pass and shared by
/// reference with every adapter call of that pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    timezone: Option<String>,
    pagination: PaginationState,
    now_sql: Option<String>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_now_sql(mut self, now_sql: impl Into<String>) -> Self {
        self.now_sql = Some(now_sql.into());
        self
    }

    /// Configured timezone; an empty name counts as none.
    pub fn timezone(&self) -> Option<&str> {
        self.timezone.as_deref().filter(|tz| !tz.trim().is_empty())
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    pub fn now_timestamp_sql(&self) -> &str {
        self.now_sql.as_deref().unwrap_or(DEFAULT_NOW_SQL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timezone_counts_as_none() {
        assert_eq!(QueryContext::new().timezone(), None);
        assert_eq!(QueryContext::new().with_timezone("").timezone(), None);
        assert_eq!(
            QueryContext::new()
                .with_timezone("America/Los_Angeles")
                .timezone(),
            Some("America/Los_Angeles")
        );
    }

    #[test]
    fn now_expression_is_overridable() {
        assert_eq!(QueryContext::new().now_timestamp_sql(), "NOW()");
        let ctx = QueryContext::new().with_now_sql("CURRENT_TIMESTAMP");
        assert_eq!(ctx.now_timestamp_sql(), "CURRENT_TIMESTAMP");
    }
}
