#![allow(dead_code)]

use cliplog_core::clipboard::error::ClipboardError;
use cliplog_core::types::{Config, Settings};
use cliplog_core::{ClipHistory, Clipboard, EntryId};
use tempfile::TempDir;

/// In-memory host clipboard. Every write raises an owner-change
/// notification, like a real desktop clipboard does.
#[derive(Debug, Default)]
pub struct FakeClipboard {
    pub current: Option<String>,
    pub writes: Vec<String>,
    pub notifications: usize,
    pub reads: usize,
}

impl Clipboard for FakeClipboard {
    fn request_text(&mut self) {
        self.reads += 1;
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.current = (!text.is_empty()).then(|| text.to_string());
        self.writes.push(text.to_string());
        self.notifications += 1;
        Ok(())
    }
}

pub type History = ClipHistory<FakeClipboard>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn quiet_settings() -> Settings {
    let mut settings = Settings::default();
    settings.display.notify_on_copy = false;
    settings.display.confirm_clear = false;
    settings
}

/// Opens a history and attaches the owner-change listener afterwards, so
/// the clipboard restore done by `open` raises no notification.
pub fn open(temp_dir: &TempDir, settings: Settings) -> History {
    init_tracing();
    let mut history =
        ClipHistory::open(Config::new(temp_dir.path()), settings, FakeClipboard::default())
            .unwrap();
    history.clipboard_mut().notifications = 0;
    history
}

/// Delivers every pending owner-change notification, answering read
/// requests with the current clipboard text.
pub fn pump(history: &mut History) -> Vec<EntryId> {
    let mut captured = Vec::new();
    while history.clipboard().notifications > 0 {
        history.clipboard_mut().notifications -= 1;

        let reads = history.clipboard().reads;
        history.on_owner_changed();
        if history.clipboard().reads == reads {
            continue;
        }

        let text = history.clipboard().current.clone();
        if let Some(id) = history.on_clipboard_text(text.as_deref()).unwrap() {
            captured.push(id);
        }
    }
    captured
}

/// Another application puts `text` on the clipboard.
pub fn user_copy(history: &mut History, text: &str) -> Option<EntryId> {
    let clipboard = history.clipboard_mut();
    clipboard.current = Some(text.to_string());
    clipboard.notifications += 1;
    pump(history).pop()
}

pub fn find(history: &History, text: &str) -> EntryId {
    history
        .registry()
        .iter()
        .find(|(_, e)| e.content().as_text() == text)
        .map(|(id, _)| id)
        .unwrap()
}

/// `(text, favorite)` oldest → newest.
pub fn contents(history: &History) -> Vec<(String, bool)> {
    history
        .registry()
        .iter()
        .map(|(_, e)| (e.content().as_text().to_string(), e.is_favorite()))
        .collect()
}

pub fn texts(history: &History) -> Vec<String> {
    contents(history).into_iter().map(|(t, _)| t).collect()
}
