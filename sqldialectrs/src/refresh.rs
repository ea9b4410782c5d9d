use serde::{Deserialize, Serialize};

use crate::config::RefreshConfig;
use crate::dialect::QueryAdapter;
use crate::error::Result;
use crate::interval::IntervalSpec;

/// Cache invalidation parameters handed to the caching layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshKeyPolicy {
    pub renewal_threshold_secs: u64,
    pub every: IntervalSpec,
}

impl RefreshKeyPolicy {
    pub fn dialect_default(adapter: &dyn QueryAdapter) -> Self {
        Self {
            renewal_threshold_secs: adapter.default_refresh_renewal_threshold(),
            every: adapter.default_every_refresh_key(),
        }
    }

    /// Configured fields win; anything left unset falls back to the dialect default.
    pub fn resolve(configured: Option<&RefreshConfig>, adapter: &dyn QueryAdapter) -> Result<Self> {
        let mut policy = Self::dialect_default(adapter);
        let Some(cfg) = configured else {
            return Ok(policy);
        };
        if let Some(threshold) = cfg.renewal_threshold_secs {
            policy.renewal_threshold_secs = threshold;
        }
        if let Some(every) = &cfg.every {
            policy.every = every.parse()?;
        }
        Ok(policy)
    }
}
