//! HTTP API handlers

pub mod collection;
pub mod health;
pub mod search;
pub mod split_sheet;

pub use collection::collection_routes;
pub use health::health_routes;
pub use search::search_routes;
pub use split_sheet::split_sheet_routes;
