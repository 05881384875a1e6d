//! Persisted form of a selected search result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SearchCategory;

/// Row of the saved-records collection
///
/// Write-once: created by an explicit save, removed by an explicit delete,
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecord {
    pub id: String,
    pub name: String,
    pub ipi_number: String,
    #[serde(rename = "type")]
    pub category: SearchCategory,
    pub created_at: DateTime<Utc>,
}
