//! Business logic for repertory search and split sheets

pub mod export;
pub mod mail_client;
pub mod name_formatter;
pub mod pattern_extraction;
pub mod real_name_resolver;
pub mod render_client;
pub mod repertory;
pub mod search_orchestrator;
pub mod split_sheet;

pub use mail_client::{MailClient, MailTransport, OutboundEmail};
pub use real_name_resolver::RealNameResolver;
pub use render_client::{PageRenderer, RenderClient, RenderRequest, RenderedPage};
pub use repertory::{Repertory, RepertoryAdapter};
pub use search_orchestrator::{SearchOrchestrator, SearchResponse};
pub use split_sheet::SplitSheetNotifier;
