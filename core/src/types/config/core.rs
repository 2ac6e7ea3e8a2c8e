use std::path::PathBuf;

/// Number of history items shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Core configuration for ClipHistory initialization.
#[derive(Clone, Debug)]
pub struct Config {
    pub base_path: PathBuf,
    pub page_size: usize,
    pub compaction: CompactionConfig,
}

impl Config {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            page_size: DEFAULT_PAGE_SIZE,
            compaction: CompactionConfig::default(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.base_path.join("history.redb")
    }
}

/// When the log is rewritten from a live snapshot.
///
/// A rewrite happens once obsolete records (tombstones, superseded favorite
/// and reorder markers, deleted creations) number at least
/// `min_obsolete_records` and at least `obsolete_ratio` times the live count.
#[derive(Clone, Copy, Debug)]
pub struct CompactionConfig {
    pub min_obsolete_records: u64,
    pub obsolete_ratio: f64,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            min_obsolete_records: 100,
            obsolete_ratio: 1.0,
        }
    }
}
