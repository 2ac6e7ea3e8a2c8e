use serde::{Deserialize, Serialize};

use crate::types::content::Content;
use crate::types::entry::DiskId;

/// Version byte of this record layout.
pub const VERSION: u8 = 1;

/// One line of the history log. Replay applies records in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    /// Entry appended at the newest end.
    Create {
        disk_id: DiskId,
        content: Content,
        favorite: bool,
    },
    Favorite {
        disk_id: DiskId,
        favorite: bool,
    },
    /// Entry promoted to the newest end.
    MoveToEnd {
        disk_id: DiskId,
    },
    /// Tombstone.
    Delete {
        disk_id: DiskId,
    },
}

impl Record {
    pub fn disk_id(&self) -> DiskId {
        match self {
            Record::Create { disk_id, .. }
            | Record::Favorite { disk_id, .. }
            | Record::MoveToEnd { disk_id }
            | Record::Delete { disk_id } => *disk_id,
        }
    }
}
