pub(crate) mod config;
pub use config::{
    BehaviorSettings, CompactionConfig, Config, DEFAULT_PAGE_SIZE, DisplaySettings,
    HistorySettings, Settings, SettingsError,
};

pub(crate) mod content;
pub use content::{ClipText, ClipTextError, Content};

pub(crate) mod entry;
pub use entry::{DiskId, Entry, MemoryId};

pub(crate) mod metadata;

pub(crate) mod record;
