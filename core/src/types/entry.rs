use crate::types::content::Content;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-local identity of an entry. Renumbered densely on every log rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryId(pub u64);

/// Identity of an entry's record in the persistent log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiskId(pub u64);

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

impl fmt::Display for DiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// One clipboard history item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub(crate) memory_id: MemoryId,
    /// `None` while the entry lives only in memory.
    pub(crate) disk_id: Option<DiskId>,
    pub(crate) content: Content,
    pub(crate) favorite: bool,
}

impl Entry {
    pub(crate) fn new(memory_id: MemoryId, content: Content) -> Self {
        Self {
            memory_id,
            disk_id: None,
            content,
            favorite: false,
        }
    }

    pub fn memory_id(&self) -> MemoryId {
        self.memory_id
    }

    pub fn disk_id(&self) -> Option<DiskId> {
        self.disk_id
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }
}
