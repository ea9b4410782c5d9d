use thiserror::Error;

pub type Result<T> = std::result::Result<T, DialectError>;

#[derive(Debug, Error)]
pub enum DialectError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown granularity '{0}' (expected one of second, minute, hour, day, week, month, quarter, year)")]
    UnknownGranularity(String),
    #[error("invalid interval '{0}': expected '<integer> <unit>', e.g. '2 minutes'")]
    InvalidInterval(String),
    #[error("unsupported like match type '{0}' (expected contains, starts or ends)")]
    UnsupportedMatchType(String),
    #[error("{dialect} dialect does not support {capability}")]
    UnsupportedCapability {
        dialect: &'static str,
        capability: &'static str,
    },
    #[error("pagination error: {0}")]
    Pagination(String),
    #[error("invalid date range: {0}")]
    DateRange(String),
    #[error("template {name} must contain the args placeholder: {template}")]
    InvalidTemplate { name: String, template: String },
    #[error("unknown dialect '{0}'")]
    UnknownDialect(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DialectError {
    pub(crate) fn unsupported(dialect: &'static str, capability: &'static str) -> Self {
        DialectError::UnsupportedCapability {
            dialect,
            capability,
        }
    }
}
