//! Metadata kept next to the history log.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Log bookkeeping. Missing fields default so older files stay readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogMetadata {
    /// Next disk id to hand out. Survives deletes of the highest id.
    #[serde(default)]
    pub next_disk_id: u64,
    #[serde(default)]
    pub last_rewrite_at: Option<SystemTime>,
}
