//! Split sheet data: song metadata plus contributors and their shares
//!
//! These values only live in client state until a send request carries them;
//! nothing here is persisted.

use serde::{Deserialize, Serialize};

/// Allowed deviation from 100% when summing all shares
pub const SHARE_TOLERANCE: f64 = 0.01;

/// Free-form song metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongInfo {
    pub title: String,
    pub artist_name: String,
    pub album_title: String,
    pub release_date: String,
    pub isrc_code: String,
}

/// Publisher owned by exactly one writer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Publisher {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Performing-rights organization the publisher is affiliated with
    pub pro: String,
    pub ipi_number: String,
    /// Percentage, 0 to 100
    pub share: f64,
}

/// Contributor to a song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Writer {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub pro: String,
    pub ipi_number: String,
    pub role: String,
    /// Percentage, 0 to 100
    pub share: f64,
    pub publisher: Option<Publisher>,
}

impl Writer {
    /// Writer share plus the share of the nested publisher, if any
    pub fn combined_share(&self) -> f64 {
        self.share + self.publisher.as_ref().map(|p| p.share).unwrap_or(0.0)
    }
}

/// Sum of every writer share and every nested publisher share
pub fn total_share(writers: &[Writer]) -> f64 {
    writers.iter().map(Writer::combined_share).sum()
}
