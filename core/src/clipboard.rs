//! Host clipboard boundary.

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum ClipboardError {
        #[error("Failed to access clipboard: {0}")]
        AccessFailed(String),

        #[error("Failed to write clipboard: {0}")]
        WriteFailed(String),
    }
}

use error::ClipboardError;

/// Clipboard access provided by the host.
///
/// Reads are asynchronous: [`Clipboard::request_text`] only starts a read and
/// the host delivers the result later through
/// [`ClipHistory::on_clipboard_text`](crate::core::ClipHistory::on_clipboard_text).
pub trait Clipboard {
    fn request_text(&mut self);

    /// Replaces the clipboard text. An empty string clears the clipboard.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
