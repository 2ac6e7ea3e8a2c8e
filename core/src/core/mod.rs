//! Clipboard history engine combining the registry, the persistent log and
//! the visible page.
//!
//! Every mutation writes the log first and touches memory only after the
//! write committed, so a failed write leaves both sides as they were.

use crate::clipboard::Clipboard;
use crate::core::debounce::ChangeDebouncer;
use crate::core::events::HistoryEvent;
use crate::core::log::{LogStats, PersistentLog, SnapshotRecord};
use crate::core::registry::{EntryId, Registry};
use crate::core::window::PaginationWindow;
use crate::search::SearchQuery;
use crate::types::{Config, Content, DiskId, Entry, MemoryId, Settings};
use error::HistoryError;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub mod debounce;
pub mod events;
pub mod log;
pub mod registry;
pub mod window;

pub mod error {
    use crate::clipboard::error::ClipboardError;
    use crate::core::log::error::LogError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum HistoryError {
        #[error("Log error: {0}")]
        Log(#[from] LogError),

        #[error("Clipboard error: {0}")]
        Clipboard(#[from] ClipboardError),

        #[error("Entry not found")]
        NotFound,

        #[error("Inconsistent history: {0}")]
        Inconsistent(String),
    }
}

/// Result of [`ClipHistory::request_clear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    /// Confirmation is enabled; call [`ClipHistory::clear_history`] once the
    /// user confirmed.
    NeedsConfirmation,
}

pub struct ClipHistory<C: Clipboard> {
    config: Config,
    settings: Settings,
    registry: Registry,
    log: PersistentLog,
    window: PaginationWindow,
    debouncer: ChangeDebouncer,
    clipboard: C,
    selected: Option<EntryId>,
    next_memory_id: MemoryId,
    events: Vec<HistoryEvent>,
}

impl<C: Clipboard> ClipHistory<C> {
    /// Opens the log under `config.base_path` and restores the history.
    ///
    /// The newest non-favorite entry becomes the selection and is written to
    /// the clipboard, unless private mode is on. That write is not debounced:
    /// the host starts forwarding owner changes only after `open` returns.
    pub fn open(config: Config, settings: Settings, clipboard: C) -> Result<Self, HistoryError> {
        for problem in settings.validate() {
            warn!(%problem, "invalid setting replaced by default");
        }
        let settings = settings.with_defaults_for_invalid();

        let mut log = PersistentLog::open(&config)?;
        let loaded = log.load()?;
        let registry = Self::restore_registry(&mut log, loaded.entries)?;

        let mut history = Self {
            window: PaginationWindow::new(config.page_size),
            config,
            settings,
            registry,
            log,
            debouncer: ChangeDebouncer::new(),
            clipboard,
            selected: None,
            next_memory_id: loaded.next_memory_id,
            events: Vec::new(),
        };

        let favorites_only = history.settings.history.cache_only_favorites;
        let stray = history
            .registry
            .iter()
            .any(|(_, entry)| favorites_only && !entry.is_favorite());
        if stray {
            info!("dropping non-favorite records from favorites-only log");
            history.rebuild_log(true)?;
        } else {
            history.next_memory_id = history.registry.renumber();
        }

        history.evict()?;
        history.window.fill(&history.registry);

        history.selected = history
            .registry
            .iter()
            .rev()
            .find(|(_, entry)| !entry.is_favorite())
            .map(|(id, _)| id);
        let restored = history.selected.and_then(|id| history.registry.get(id));
        if let Some(entry) = restored {
            if !history.settings.behavior.private_mode {
                if let Err(err) = history.clipboard.set_text(entry.content().as_text()) {
                    warn!(%err, "failed to restore clipboard selection");
                }
            }
        }

        info!(
            entries = history.registry.len(),
            favorites = history.registry.favorites_len(),
            "opened clipboard history"
        );
        Ok(history)
    }

    /// Builds the registry from replayed entries, repairing duplicate
    /// content by keeping one entry at the newer position.
    fn restore_registry(log: &mut PersistentLog, entries: Vec<Entry>) -> Result<Registry, HistoryError> {
        let mut registry = Registry::new();

        for entry in entries {
            let (kept, rejected) = registry.insert_newest(entry);
            let Some(rejected) = rejected else {
                continue;
            };

            warn!(memory_id = %rejected.memory_id(), "duplicate content in history log");
            let kept_favorite = registry.get(kept).is_some_and(Entry::is_favorite);
            let favorite = (rejected.is_favorite() && !kept_favorite).then_some(true);
            let kept_disk_id = registry.get(kept).and_then(Entry::disk_id);

            match (rejected.disk_id(), kept_disk_id) {
                (Some(old), Some(new)) => log.merge_duplicate(old, new, favorite)?,
                (Some(old), None) => log.delete(old)?,
                (None, Some(new)) => match favorite {
                    Some(favorite) => log.move_to_end_with_favorite(new, favorite)?,
                    None => log.move_to_end(new)?,
                },
                (None, None) => {}
            }
            if rejected.is_favorite() {
                registry.set_favorite(kept, true);
            }
        }

        Ok(registry)
    }
}

/// Clipboard events.
impl<C: Clipboard> ClipHistory<C> {
    /// Host notification that the clipboard owner changed.
    ///
    /// Starts an asynchronous read unless private mode is on. Duplicate
    /// notifications are harmless.
    ///
    /// In private mode the notification still settles one pending write of
    /// our own, since no read will follow to do it.
    pub fn on_owner_changed(&mut self) {
        if self.settings.behavior.private_mode {
            let own = self.debouncer.suppress();
            debug!(own, "ignoring clipboard change in private mode");
            return;
        }
        self.clipboard.request_text();
    }

    /// Delivers the text read after [`ClipHistory::on_owner_changed`].
    ///
    /// Changes caused by our own writes are swallowed. Otherwise the text is
    /// captured as a new entry or selects the existing entry with the same
    /// text. Returns the captured entry.
    pub fn on_clipboard_text(&mut self, text: Option<&str>) -> Result<Option<EntryId>, HistoryError> {
        if self.debouncer.suppress() {
            debug!(pending = self.debouncer.pending(), "suppressed own clipboard write");
            return Ok(None);
        }
        if self.settings.behavior.private_mode {
            return Ok(None);
        }

        let Some(mut text) = text else {
            return Ok(None);
        };
        if self.settings.history.strip_text {
            text = text.trim();
        }
        let Ok(content) = Content::text(text) else {
            return Ok(None);
        };

        let id = match self.registry.lookup_by_content(&content) {
            Some(id) => {
                self.move_first(id)?;
                self.set_selection(Some(id));
                id
            }
            None => {
                let id = self.capture(content)?;
                self.set_selection(Some(id));
                self.prune()?;
                id
            }
        };

        if self.settings.display.notify_on_copy && self.registry.contains(id) {
            self.events.push(HistoryEvent::Copied(id));
        }
        Ok(Some(id))
    }

    fn capture(&mut self, content: Content) -> Result<EntryId, HistoryError> {
        let disk_id = if self.settings.history.cache_only_favorites {
            None
        } else {
            Some(self.log.append(&content, false)?)
        };

        let mut entry = Entry::new(self.next_memory_id, content);
        entry.disk_id = disk_id;
        self.next_memory_id = MemoryId(self.next_memory_id.0 + 1);

        let (id, _) = self.registry.insert_newest(entry);
        self.window.bind_front(id);
        debug!(?disk_id, "captured clipboard entry");

        self.events.push(HistoryEvent::Added(id));
        self.events.push(HistoryEvent::WindowChanged);
        Ok(id)
    }
}

/// Selection operations.
impl<C: Clipboard> ClipHistory<C> {
    /// Selects an entry and writes it to the clipboard.
    pub fn select(&mut self, id: EntryId) -> Result<(), HistoryError> {
        let text = self.text_of(id)?;
        self.set_selection(Some(id));
        self.write_clipboard(&text)
    }

    /// Picks an entry from the menu: promotes it if configured, selects it
    /// and asks for a paste when `paste_on_selection` is set.
    pub fn activate(&mut self, id: EntryId) -> Result<(), HistoryError> {
        self.text_of(id)?;
        self.move_first(id)?;
        self.select(id)?;
        if self.settings.behavior.paste_on_selection {
            self.events.push(HistoryEvent::PasteRequested(id));
        }
        Ok(())
    }

    /// Selects the next newer entry, wrapping around; the oldest entry when
    /// nothing is selected.
    pub fn select_previous(&mut self) -> Result<Option<EntryId>, HistoryError> {
        let target = self
            .selected
            .and_then(|id| self.registry.successor_cyclic(id))
            .or_else(|| self.registry.oldest());
        self.select_if_some(target)
    }

    /// Selects the next older entry, wrapping around; the newest entry when
    /// nothing is selected.
    pub fn select_next(&mut self) -> Result<Option<EntryId>, HistoryError> {
        let target = self
            .selected
            .and_then(|id| self.registry.predecessor_cyclic(id))
            .or_else(|| self.registry.newest());
        self.select_if_some(target)
    }

    fn select_if_some(&mut self, target: Option<EntryId>) -> Result<Option<EntryId>, HistoryError> {
        if let Some(id) = target {
            self.select(id)?;
        }
        Ok(target)
    }

    fn set_selection(&mut self, id: Option<EntryId>) {
        if self.selected != id {
            self.selected = id;
            self.events.push(HistoryEvent::SelectionChanged(id));
        }
    }

    /// Drops the selection and empties the clipboard.
    fn reset_selection(&mut self) -> Result<(), HistoryError> {
        self.set_selection(None);
        self.write_clipboard("")
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), HistoryError> {
        self.debouncer.arm();
        if let Err(err) = self.clipboard.set_text(text) {
            self.debouncer.cancel();
            return Err(err.into());
        }
        Ok(())
    }
}

/// Entry operations.
impl<C: Clipboard> ClipHistory<C> {
    /// Moves an entry to the newest end regardless of `move_item_first`.
    pub fn promote(&mut self, id: EntryId) -> Result<(), HistoryError> {
        let entry = self.registry.get(id).ok_or(HistoryError::NotFound)?;
        let favorite = entry.is_favorite();
        if let Some(disk_id) = entry.disk_id() {
            self.log.move_to_end(disk_id)?;
        }

        self.registry.move_to_newest(id);
        if !favorite {
            self.window.bind_front(id);
            self.events.push(HistoryEvent::WindowChanged);
        }
        self.events.push(HistoryEvent::Promoted(id));
        Ok(())
    }

    /// Flips the favorite flag and moves the entry to the newest end.
    ///
    /// In favorites-only mode this creates or drops the entry's log record.
    /// A selected entry stays selected and is written to the clipboard again.
    pub fn toggle_favorite(&mut self, id: EntryId) -> Result<bool, HistoryError> {
        let entry = self.registry.get(id).ok_or(HistoryError::NotFound)?;
        let favorite = !entry.is_favorite();
        let old_disk_id = entry.disk_id();

        let disk_id = if self.settings.history.cache_only_favorites {
            match (favorite, old_disk_id) {
                (true, _) => Some(self.log.append(entry.content(), true)?),
                (false, Some(disk_id)) => {
                    self.log.delete(disk_id)?;
                    None
                }
                (false, None) => None,
            }
        } else {
            if let Some(disk_id) = old_disk_id {
                self.log.move_to_end_with_favorite(disk_id, favorite)?;
            }
            old_disk_id
        };

        self.registry.move_to_newest(id);
        self.registry.set_favorite(id, favorite);
        self.registry.set_disk_id(id, disk_id);
        if favorite {
            self.window.unbind(id);
            self.window.restore(&self.registry);
        } else {
            self.window.bind_front(id);
        }
        debug!(?disk_id, favorite, "toggled favorite");

        self.events.push(HistoryEvent::FavoriteChanged { id, favorite });
        self.events.push(HistoryEvent::Promoted(id));
        self.events.push(HistoryEvent::WindowChanged);

        if self.selected == Some(id) {
            self.select(id)?;
        }
        if !favorite {
            self.prune()?;
        }
        Ok(favorite)
    }

    /// Deletes an entry, then selects the newest remaining entry.
    pub fn delete(&mut self, id: EntryId) -> Result<(), HistoryError> {
        self.remove_entry(id)?;

        match self.registry.newest() {
            Some(newest) => self.select(newest),
            None => self.reset_selection(),
        }
    }

    /// Deletes the selected entry, undoing the last capture.
    pub fn undo_copy(&mut self) -> Result<(), HistoryError> {
        match self.selected {
            Some(id) => self.delete(id),
            None => Ok(()),
        }
    }

    /// Clears the history now, or reports that the user must confirm first.
    pub fn request_clear(&mut self) -> Result<ClearOutcome, HistoryError> {
        if self.settings.display.confirm_clear {
            return Ok(ClearOutcome::NeedsConfirmation);
        }
        self.clear_history()?;
        Ok(ClearOutcome::Cleared)
    }

    /// Removes every non-favorite entry and rewrites the log from the
    /// favorites.
    pub fn clear_history(&mut self) -> Result<(), HistoryError> {
        let snapshot: Vec<SnapshotRecord<'_>> = self
            .registry
            .iter()
            .filter(|(_, entry)| entry.is_favorite())
            .map(|(_, entry)| SnapshotRecord {
                content: entry.content(),
                favorite: true,
            })
            .collect();
        let disk_ids = self.log.reset_to(&snapshot)?;

        let favorites: Vec<EntryId> = self
            .registry
            .iter()
            .rev()
            .filter(|(_, entry)| entry.is_favorite())
            .map(|(id, _)| id)
            .collect();
        let mut old = std::mem::take(&mut self.registry);
        let mut selected = None;
        for id in favorites {
            let Some(entry) = old.remove(id) else {
                continue;
            };
            let (new_id, _) = self.registry.insert_oldest(entry);
            if self.selected == Some(id) {
                selected = Some(new_id);
            }
        }
        let removed = old.len();

        let had_selection = self.selected.is_some();
        self.apply_snapshot(disk_ids, false);
        self.window.clear();
        self.selected = selected;
        info!(removed, favorites = self.registry.len(), "cleared history");

        self.events.push(HistoryEvent::Cleared);
        self.events.push(HistoryEvent::SelectionChanged(selected));
        self.events.push(HistoryEvent::WindowChanged);

        if had_selection && selected.is_none() {
            self.write_clipboard("")?;
        }
        Ok(())
    }

    fn move_first(&mut self, id: EntryId) -> Result<(), HistoryError> {
        if !self.settings.history.move_item_first {
            return Ok(());
        }
        self.promote(id)
    }

    /// Unlinks an entry and tombstones its record. Returns whether the entry
    /// was selected; the caller decides what to select instead.
    fn remove_entry(&mut self, id: EntryId) -> Result<bool, HistoryError> {
        let entry = self.registry.get(id).ok_or(HistoryError::NotFound)?;
        if let Some(disk_id) = entry.disk_id() {
            self.log.delete(disk_id)?;
        }

        self.registry.remove(id);
        self.events.push(HistoryEvent::Removed(id));
        if self.window.unbind(id) {
            self.window.restore(&self.registry);
            self.events.push(HistoryEvent::WindowChanged);
        }

        Ok(self.selected == Some(id))
    }
}

/// Settings reconciliation.
impl<C: Clipboard> ClipHistory<C> {
    /// Replaces the settings and applies every side effect of the change.
    ///
    /// Invalid values fall back to defaults. Toggling favorites-only
    /// persistence rewrites the log, leaving private mode republishes or
    /// clears the selection, and the history is pruned to the new size.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), HistoryError> {
        for problem in settings.validate() {
            warn!(%problem, "invalid setting replaced by default");
        }
        let settings = settings.with_defaults_for_invalid();

        let favorites_only = settings.history.cache_only_favorites;
        if favorites_only != self.settings.history.cache_only_favorites {
            info!(favorites_only, "switching log persistence mode");
            self.rebuild_log(favorites_only)?;
        }

        let old = std::mem::replace(&mut self.settings, settings);

        let private_mode = self.settings.behavior.private_mode;
        if private_mode != old.behavior.private_mode {
            info!(private_mode, "private mode changed");
            self.events.push(HistoryEvent::PrivateModeChanged(private_mode));
            if !private_mode {
                match self.selected {
                    Some(id) => self.select(id)?,
                    None => self.reset_selection()?,
                }
            }
        }

        self.prune()?;

        if self.settings.display != old.display {
            self.events.push(HistoryEvent::LabelsChanged);
        }
        Ok(())
    }
}

/// Maintenance operations.
impl<C: Clipboard> ClipHistory<C> {
    /// Evicts the oldest non-favorites beyond the history size, then compacts
    /// the log if it has grown enough obsolete records.
    pub fn prune(&mut self) -> Result<(), HistoryError> {
        self.evict()?;
        self.compact_if_needed()?;
        Ok(())
    }

    /// Rewrites the log when the compaction thresholds are crossed.
    /// Returns whether a rewrite happened.
    pub fn compact_if_needed(&mut self) -> Result<bool, HistoryError> {
        let favorites_only = self.settings.history.cache_only_favorites;
        let registry = &self.registry;
        let rewritten = self
            .log
            .maybe_compact(|| snapshot(registry, favorites_only))?;

        match rewritten {
            Some(disk_ids) => {
                self.apply_snapshot(disk_ids, favorites_only);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Rewrites the log from the current history unconditionally.
    pub fn compact(&mut self) -> Result<(), HistoryError> {
        self.rebuild_log(self.settings.history.cache_only_favorites)
    }

    fn rebuild_log(&mut self, favorites_only: bool) -> Result<(), HistoryError> {
        let disk_ids = self
            .log
            .reset_to(&snapshot(&self.registry, favorites_only))?;
        self.apply_snapshot(disk_ids, favorites_only);
        Ok(())
    }

    /// Hands the disk ids of a rewrite back to the entries that were written,
    /// in list order, and renumbers memory ids.
    fn apply_snapshot(&mut self, disk_ids: Vec<DiskId>, favorites_only: bool) {
        let persisted: Vec<(EntryId, bool)> = self
            .registry
            .iter()
            .map(|(id, entry)| (id, !favorites_only || entry.is_favorite()))
            .collect();

        let mut disk_ids = disk_ids.into_iter();
        for (id, persisted) in persisted {
            let disk_id = if persisted { disk_ids.next() } else { None };
            self.registry.set_disk_id(id, disk_id);
        }
        self.next_memory_id = self.registry.renumber();
    }

    fn evict(&mut self) -> Result<(), HistoryError> {
        let bound = self.settings.history.size;
        let mut cursor = self.registry.oldest();

        while self.registry.history_len() > bound {
            let Some(id) = cursor else {
                break;
            };
            cursor = self.registry.successor(id);
            if self.registry.get(id).is_some_and(Entry::is_favorite) {
                continue;
            }
            debug!(%bound, "evicting oldest entry");
            if self.remove_entry(id)? {
                self.reset_selection()?;
            }
        }
        Ok(())
    }

    /// Checks that registry disk ids and live log records match one to one
    /// and that the content index resolves every entry.
    pub fn verify_consistency(&self) -> Result<(), HistoryError> {
        let favorites_only = self.settings.history.cache_only_favorites;
        let mut seen = HashSet::new();

        for (id, entry) in self.registry.iter() {
            let memory_id = entry.memory_id();
            if self.registry.lookup_by_content(entry.content()) != Some(id) {
                return Err(HistoryError::Inconsistent(format!(
                    "content index does not resolve entry {memory_id}"
                )));
            }

            match entry.disk_id() {
                Some(disk_id) => {
                    if !seen.insert(disk_id) {
                        return Err(HistoryError::Inconsistent(format!(
                            "disk id {disk_id} is shared by several entries"
                        )));
                    }
                    if !self.log.is_live(disk_id) {
                        return Err(HistoryError::Inconsistent(format!(
                            "entry {memory_id} refers to dead record {disk_id}"
                        )));
                    }
                }
                None if !favorites_only || entry.is_favorite() => {
                    return Err(HistoryError::Inconsistent(format!(
                        "entry {memory_id} is not persisted"
                    )));
                }
                None => {}
            }
        }

        if let Some(orphan) = self.log.live_disk_ids().find(|d| !seen.contains(d)) {
            return Err(HistoryError::Inconsistent(format!(
                "record {orphan} has no entry"
            )));
        }
        Ok(())
    }
}

/// Paging operations.
impl<C: Clipboard> ClipHistory<C> {
    pub fn page_older(&mut self) -> bool {
        let changed = self.window.step_older(&self.registry);
        if changed {
            self.events.push(HistoryEvent::WindowChanged);
        }
        changed
    }

    pub fn page_newer(&mut self) -> bool {
        let changed = self.window.step_newer(&self.registry);
        if changed {
            self.events.push(HistoryEvent::WindowChanged);
        }
        changed
    }
}

/// Read operations.
impl<C: Clipboard> ClipHistory<C> {
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Favorites, newest first.
    pub fn favorites(&self) -> Vec<EntryId> {
        self.partition(true)
    }

    /// Non-favorite entries, newest first.
    pub fn history(&self) -> Vec<EntryId> {
        self.partition(false)
    }

    /// Entries of the visible page, top to bottom.
    pub fn window_slots(&self) -> &[EntryId] {
        self.window.slots()
    }

    pub fn selected(&self) -> Option<EntryId> {
        self.selected
    }

    /// Menu label of an entry.
    pub fn label(&self, id: EntryId) -> Option<String> {
        let entry = self.registry.get(id)?;
        Some(entry.content().preview(self.settings.display.preview_size))
    }

    /// Indicator label of the selection. Empty in private mode.
    pub fn topbar_label(&self) -> Option<String> {
        if self.settings.behavior.private_mode {
            return None;
        }
        let entry = self.registry.get(self.selected?)?;
        Some(entry.content().preview(self.settings.display.topbar_preview_size))
    }

    /// Entries matching `query`, newest first.
    pub fn search(&self, query: &SearchQuery) -> Vec<EntryId> {
        query.filter(&self.registry)
    }

    pub fn drain_events(&mut self) -> Vec<HistoryEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn log_stats(&self) -> LogStats {
        self.log.stats()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// Programmatic clipboard writes whose notification has not arrived yet.
    pub fn pending_writes(&self) -> u32 {
        self.debouncer.pending()
    }

    fn partition(&self, favorites: bool) -> Vec<EntryId> {
        self.registry
            .iter()
            .rev()
            .filter(|(_, entry)| entry.is_favorite() == favorites)
            .map(|(id, _)| id)
            .collect()
    }

    fn text_of(&self, id: EntryId) -> Result<String, HistoryError> {
        let entry = self.registry.get(id).ok_or(HistoryError::NotFound)?;
        Ok(entry.content().as_text().to_string())
    }
}

/// Live entries in list order, as written to the log.
fn snapshot(registry: &Registry, favorites_only: bool) -> Vec<SnapshotRecord<'_>> {
    registry
        .iter()
        .filter(|(_, entry)| !favorites_only || entry.is_favorite())
        .map(|(_, entry)| SnapshotRecord {
            content: entry.content(),
            favorite: entry.is_favorite(),
        })
        .collect()
}
