mod core;
mod settings;

pub use self::core::{CompactionConfig, Config, DEFAULT_PAGE_SIZE};
pub use settings::{
    BehaviorSettings, DisplaySettings, HistorySettings, Settings, SettingsError,
};
