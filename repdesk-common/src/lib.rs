//! # Repertory Desk Common Library
//!
//! Shared code for the repertory desk services including:
//! - Domain models (search results, saved records, split sheets)
//! - Bootstrap configuration loading and root folder resolution
//! - Provider credential resolution
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{
    total_share, Publisher, SavedRecord, SearchCategory, SearchResult, SongInfo, Writer,
    SHARE_TOLERANCE,
};
