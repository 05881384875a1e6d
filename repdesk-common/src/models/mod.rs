//! Domain models shared between the search service and its clients
//!
//! Wire format is camelCase JSON except for [`SavedRecord`], which mirrors the
//! storage row (`ipi_number`, `created_at`).

mod saved_record;
mod search;
mod split_sheet;

pub use saved_record::SavedRecord;
pub use search::{SearchCategory, SearchResult};
pub use split_sheet::{total_share, Publisher, SongInfo, Writer, SHARE_TOLERANCE};
