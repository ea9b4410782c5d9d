pub mod config;
pub mod context;
pub mod dialect;
pub mod error;
pub mod interval;
pub mod models;
pub mod pagination;
pub mod refresh;
pub mod templates;
pub mod time_series;

use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;

/// Resolve the dialect registered for a database type name (e.g. `prestodb`).
pub fn dialect_for(db_type: &str) -> Result<&'static dyn Dialect> {
    let kind: DialectKind = db_type.parse()?;
    tracing::debug!(db_type = %db_type, dialect = kind.dialect().name(), "resolved dialect");
    Ok(kind.dialect())
}

pub use config::SqlDialectConfig;
pub use context::QueryContext;
pub use dialect::{FilterAdapter, QueryAdapter};
pub use error::DialectError;
pub use interval::IntervalSpec;
pub use models::{FilterDescriptor, FilterValueType, LikeMatchType, TimeGranularity};
pub use pagination::{PaginationState, RowLimit};
pub use refresh::RefreshKeyPolicy;
pub use templates::SqlTemplates;
pub use time_series::{TimeDimension, TimeSeriesSource};
