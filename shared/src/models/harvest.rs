//! Harvest counter model

use serde::{Deserialize, Serialize};

/// Running total of oysters sold, in units
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct HarvestCount {
    pub total: i64,
}
