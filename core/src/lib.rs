pub mod clipboard;
pub mod core;
pub mod search;
pub mod types;

pub use crate::clipboard::Clipboard;
pub use crate::core::{ClearOutcome, ClipHistory};
pub use crate::core::events::HistoryEvent;
pub use crate::core::registry::EntryId;
pub use search::{CaseMatching, SearchQuery};
