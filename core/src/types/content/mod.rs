use nutype::nutype;
use serde::{Deserialize, Serialize};

/// Extra characters scanned past the preview length, so collapsing whitespace
/// still leaves enough text to fill the label.
const PREVIEW_LOOKAHEAD: usize = 100;

const ELLIPSIS: &str = "...";

#[nutype(
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct ClipText(String);

/// Payload of a history entry.
///
/// Text is the only kind captured today. Anything that renders or persists
/// content matches on this enum, so adding a kind is a compile error at every
/// site that does not handle it yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Content {
    Text(ClipText),
}

impl Content {
    /// Builds text content, rejecting empty strings.
    pub fn text(text: impl Into<String>) -> Result<Self, ClipTextError> {
        Ok(Content::Text(ClipText::try_new(text.into())?))
    }

    /// The string written back to the host clipboard.
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text(text) => text.as_str(),
        }
    }

    /// Single-line label of at most `max_chars` characters.
    ///
    /// Runs of whitespace (newlines included) collapse to one space. Labels
    /// that do not fit end in `...`.
    pub fn preview(&self, max_chars: usize) -> String {
        match self {
            Content::Text(text) => truncated(text.as_str(), max_chars),
        }
    }

    /// Digest used as the content index key.
    pub(crate) fn digest(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        match self {
            Content::Text(text) => {
                hasher.update(b"text:");
                hasher.update(text.as_bytes());
            }
        }
        hasher.finalize()
    }
}

fn truncated(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars + PREVIEW_LOOKAHEAD).collect();
    let collapsed = head.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut label: String = collapsed
        .chars()
        .take(max_chars.saturating_sub(ELLIPSIS.len()))
        .collect();
    label.push_str(ELLIPSIS);
    label
}

#[cfg(test)]
mod tests;
