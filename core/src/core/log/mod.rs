//! Persistent history log backed by redb.
//!
//! The log is append-only: every mutation adds one record under the next
//! sequence number and commits it in its own write transaction, so a failed
//! write never touches records that were already committed. Replaying the
//! records in sequence order rebuilds the registry.
//!
//! Tables:
//! - `log`: sequence number → versioned record (postcard)
//! - `metadata`: `&str` → JSON string
//!
//! Deletes, favorite flips and promotions leave obsolete records behind.
//! [`PersistentLog::maybe_compact`] rewrites the whole table from a live
//! snapshot once they pile up; that rewrite and [`PersistentLog::reset_to`] are
//! the only operations that drop records.

use crate::core::log::error::LogError;
use crate::types::metadata::LogMetadata;
use crate::types::record::{Record, VersionedRecord};
use crate::types::{CompactionConfig, Config, Content, DiskId, Entry, MemoryId};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::{HashMap, HashSet};
use std::time::SystemTime;
use tracing::{debug, info, warn};

pub mod error {
    use crate::types::DiskId;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum LogError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Metadata error: {0}")]
        Metadata(#[from] serde_json::Error),

        #[error("No live record for disk id {0}")]
        NotFound(DiskId),
    }
}

/// Log table: sequence number → record.
const LOG_TABLE: TableDefinition<u64, VersionedRecord> = TableDefinition::new("log");

/// Metadata table: &str → JSON string
const METADATA_TABLE: TableDefinition<&str, &str> = TableDefinition::new("metadata");

const METADATA_KEY_LOG: &str = "log";

/// Result of replaying the log.
#[derive(Debug)]
pub struct LoadedLog {
    /// Live entries oldest → newest, memory ids `1..=len`.
    pub entries: Vec<Entry>,
    pub next_memory_id: MemoryId,
}

/// One live entry handed to [`PersistentLog::reset_to`].
#[derive(Debug, Clone, Copy)]
pub struct SnapshotRecord<'a> {
    pub content: &'a Content,
    pub favorite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogStats {
    pub total_records: u64,
    pub live_records: u64,
}

impl LogStats {
    /// Records that replay would discard or that only restate live state.
    pub fn obsolete_records(&self) -> u64 {
        self.total_records.saturating_sub(self.live_records)
    }
}

pub struct PersistentLog {
    db: redb::Database,
    compaction: CompactionConfig,
    next_seq: u64,
    next_disk_id: u64,
    total_records: u64,
    live: HashSet<DiskId>,
}

impl PersistentLog {
    /// Creates or opens the log using paths and settings from the config.
    ///
    /// Call [`PersistentLog::load`] before writing; until then no record is
    /// considered live.
    pub fn open(config: &Config) -> Result<Self, LogError> {
        std::fs::create_dir_all(&config.base_path)?;

        let db = redb::Database::create(config.log_path())?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LOG_TABLE)?;
            let _ = write_txn.open_table(METADATA_TABLE)?;
        }
        write_txn.commit()?;

        let (next_seq, total_records) = {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(LOG_TABLE)?;
            let next_seq = match table.last()? {
                Some((seq, _)) => seq.value() + 1,
                None => 1,
            };
            (next_seq, table.len()?)
        };

        Ok(Self {
            db,
            compaction: config.compaction,
            next_seq,
            next_disk_id: 1,
            total_records,
            live: HashSet::new(),
        })
    }
}

/// Read operations.
impl PersistentLog {
    /// Replays every record and returns the live entries in order.
    ///
    /// An empty log yields no entries and `next_memory_id == 1`.
    pub fn load(&mut self) -> Result<LoadedLog, LogError> {
        struct Replayed {
            content: Content,
            favorite: bool,
            last_touched: u64,
        }

        let metadata = self.metadata()?;
        let mut state: HashMap<DiskId, Replayed> = HashMap::new();
        let mut highest_disk_id = 0;

        {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(LOG_TABLE)?;

            for item in table.iter()? {
                let (seq, record) = item?;
                let seq = seq.value();
                let record = record.value().into_latest();
                let disk_id = record.disk_id();
                highest_disk_id = highest_disk_id.max(disk_id.0);

                match record {
                    Record::Create {
                        disk_id,
                        content,
                        favorite,
                    } => {
                        state.insert(
                            disk_id,
                            Replayed {
                                content,
                                favorite,
                                last_touched: seq,
                            },
                        );
                    }
                    Record::Favorite { disk_id, favorite } => match state.get_mut(&disk_id) {
                        Some(replayed) => replayed.favorite = favorite,
                        None => warn!(%disk_id, seq, "favorite record for dead disk id"),
                    },
                    Record::MoveToEnd { disk_id } => match state.get_mut(&disk_id) {
                        Some(replayed) => replayed.last_touched = seq,
                        None => warn!(%disk_id, seq, "reorder record for dead disk id"),
                    },
                    Record::Delete { disk_id } => {
                        state.remove(&disk_id);
                    }
                }
            }
        }

        let mut live: Vec<(DiskId, Replayed)> = state.into_iter().collect();
        live.sort_by_key(|(_, replayed)| replayed.last_touched);

        self.live = live.iter().map(|(disk_id, _)| *disk_id).collect();
        self.next_disk_id = metadata.next_disk_id.max(highest_disk_id + 1);

        let entries: Vec<Entry> = live
            .into_iter()
            .zip(1..)
            .map(|((disk_id, replayed), memory_id)| Entry {
                memory_id: MemoryId(memory_id),
                disk_id: Some(disk_id),
                content: replayed.content,
                favorite: replayed.favorite,
            })
            .collect();

        info!(
            live = entries.len(),
            records = self.total_records,
            next_disk_id = self.next_disk_id,
            "replayed history log"
        );

        Ok(LoadedLog {
            next_memory_id: MemoryId(entries.len() as u64 + 1),
            entries,
        })
    }

    pub fn is_live(&self, disk_id: DiskId) -> bool {
        self.live.contains(&disk_id)
    }

    pub fn live_disk_ids(&self) -> impl Iterator<Item = DiskId> + '_ {
        self.live.iter().copied()
    }

    pub fn stats(&self) -> LogStats {
        LogStats {
            total_records: self.total_records,
            live_records: self.live.len() as u64,
        }
    }

    /// Returns true once obsolete records cross the compaction thresholds.
    pub fn needs_compaction(&self) -> bool {
        let stats = self.stats();
        let obsolete = stats.obsolete_records();
        obsolete >= self.compaction.min_obsolete_records.max(1)
            && obsolete as f64 >= stats.live_records as f64 * self.compaction.obsolete_ratio
    }

    pub fn last_rewrite_at(&self) -> Result<Option<SystemTime>, LogError> {
        Ok(self.metadata()?.last_rewrite_at)
    }
}

/// Append operations.
impl PersistentLog {
    /// Appends a creation record and returns the new disk id.
    pub fn append(&mut self, content: &Content, favorite: bool) -> Result<DiskId, LogError> {
        let disk_id = DiskId(self.next_disk_id);

        self.write(&[Record::Create {
            disk_id,
            content: content.clone(),
            favorite,
        }])?;

        self.next_disk_id += 1;
        self.live.insert(disk_id);
        debug!(%disk_id, favorite, "appended entry");
        Ok(disk_id)
    }

    /// Records a favorite flip. The disk id stays the same.
    ///
    /// Returns `Err(NotFound)` if the disk id has no live record.
    pub fn update_favorite(&mut self, disk_id: DiskId, favorite: bool) -> Result<(), LogError> {
        self.ensure_live(disk_id)?;
        self.write(&[Record::Favorite { disk_id, favorite }])
    }

    /// Appends a tombstone.
    ///
    /// Returns `Err(NotFound)` if the disk id has no live record.
    pub fn delete(&mut self, disk_id: DiskId) -> Result<(), LogError> {
        self.ensure_live(disk_id)?;
        self.write(&[Record::Delete { disk_id }])?;
        self.live.remove(&disk_id);
        debug!(%disk_id, "tombstoned entry");
        Ok(())
    }

    /// Records a promotion to the newest end.
    ///
    /// Returns `Err(NotFound)` if the disk id has no live record.
    pub fn move_to_end(&mut self, disk_id: DiskId) -> Result<(), LogError> {
        self.ensure_live(disk_id)?;
        self.write(&[Record::MoveToEnd { disk_id }])
    }

    /// Records a promotion and a favorite flip in one transaction.
    pub fn move_to_end_with_favorite(
        &mut self,
        disk_id: DiskId,
        favorite: bool,
    ) -> Result<(), LogError> {
        self.ensure_live(disk_id)?;
        self.write(&[
            Record::MoveToEnd { disk_id },
            Record::Favorite { disk_id, favorite },
        ])
    }

    /// Folds a duplicate into `kept` in one transaction: tombstones
    /// `rejected`, promotes `kept` and, when given, sets its favorite flag.
    ///
    /// Returns `Err(NotFound)` if either disk id has no live record; nothing
    /// is written then.
    pub fn merge_duplicate(
        &mut self,
        rejected: DiskId,
        kept: DiskId,
        favorite: Option<bool>,
    ) -> Result<(), LogError> {
        self.ensure_live(rejected)?;
        self.ensure_live(kept)?;

        let mut records = vec![
            Record::Delete { disk_id: rejected },
            Record::MoveToEnd { disk_id: kept },
        ];
        if let Some(favorite) = favorite {
            records.push(Record::Favorite {
                disk_id: kept,
                favorite,
            });
        }
        self.write(&records)?;

        self.live.remove(&rejected);
        debug!(%rejected, %kept, "merged duplicate record");
        Ok(())
    }
}

/// Rewrite operations.
impl PersistentLog {
    /// Discards every record and writes `snapshot` in order.
    ///
    /// Disk ids are reassigned densely from 1; the returned ids follow the
    /// snapshot order. The rewrite is one transaction: on failure the old log
    /// stays as it was.
    pub fn reset_to(&mut self, snapshot: &[SnapshotRecord<'_>]) -> Result<Vec<DiskId>, LogError> {
        let disk_ids: Vec<DiskId> = (1..=snapshot.len() as u64).map(DiskId).collect();
        let metadata = LogMetadata {
            next_disk_id: snapshot.len() as u64 + 1,
            last_rewrite_at: Some(SystemTime::now()),
        };

        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(LOG_TABLE)?;
        {
            let mut table = write_txn.open_table(LOG_TABLE)?;
            for (seq, (record, disk_id)) in (1u64..).zip(snapshot.iter().zip(&disk_ids)) {
                let record = Record::Create {
                    disk_id: *disk_id,
                    content: record.content.clone(),
                    favorite: record.favorite,
                };
                table.insert(seq, &VersionedRecord::V1(record))?;
            }

            let json = serde_json::to_string(&metadata)?;
            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            meta_table.insert(METADATA_KEY_LOG, json.as_str())?;
        }
        write_txn.commit()?;

        info!(
            live = snapshot.len(),
            dropped = self.total_records.saturating_sub(snapshot.len() as u64),
            "rewrote history log"
        );

        self.next_seq = snapshot.len() as u64 + 1;
        self.next_disk_id = metadata.next_disk_id;
        self.total_records = snapshot.len() as u64;
        self.live = disk_ids.iter().copied().collect();

        Ok(disk_ids)
    }

    /// Rewrites the log from `snapshot()` if [`PersistentLog::needs_compaction`].
    ///
    /// Returns the reassigned disk ids when a rewrite happened. Running it again
    /// right after a rewrite is a no-op, since a fresh log has no obsolete
    /// records.
    pub fn maybe_compact<'a, F>(&mut self, snapshot: F) -> Result<Option<Vec<DiskId>>, LogError>
    where
        F: FnOnce() -> Vec<SnapshotRecord<'a>>,
    {
        if !self.needs_compaction() {
            return Ok(None);
        }

        let stats = self.stats();
        info!(
            total = stats.total_records,
            obsolete = stats.obsolete_records(),
            "compacting history log"
        );
        self.reset_to(&snapshot()).map(Some)
    }
}

/// Internal helpers.
impl PersistentLog {
    fn ensure_live(&self, disk_id: DiskId) -> Result<(), LogError> {
        if self.live.contains(&disk_id) {
            Ok(())
        } else {
            Err(LogError::NotFound(disk_id))
        }
    }

    /// Appends records in one transaction, persisting the disk id counter
    /// alongside. In-memory counters advance only after the commit.
    fn write(&mut self, records: &[Record]) -> Result<(), LogError> {
        let next_disk_id = records
            .iter()
            .map(|record| record.disk_id().0 + 1)
            .fold(self.next_disk_id, u64::max);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(LOG_TABLE)?;
            for (seq, record) in (self.next_seq..).zip(records) {
                table.insert(seq, &VersionedRecord::V1(record.clone()))?;
            }

            let mut meta_table = write_txn.open_table(METADATA_TABLE)?;
            let mut metadata: LogMetadata = match meta_table.get(METADATA_KEY_LOG)? {
                Some(guard) => serde_json::from_str(guard.value())?,
                None => LogMetadata::default(),
            };
            metadata.next_disk_id = next_disk_id;
            let json = serde_json::to_string(&metadata)?;
            meta_table.insert(METADATA_KEY_LOG, json.as_str())?;
        }
        write_txn.commit()?;

        self.next_seq += records.len() as u64;
        self.total_records += records.len() as u64;
        Ok(())
    }

    fn metadata(&self) -> Result<LogMetadata, LogError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(METADATA_TABLE)?;
        match table.get(METADATA_KEY_LOG)? {
            Some(guard) => Ok(serde_json::from_str(guard.value())?),
            None => Ok(LogMetadata::default()),
        }
    }
}
