use crate::core::registry::EntryId;

/// Change notification for the presentation layer, drained with
/// [`ClipHistory::drain_events`](crate::core::ClipHistory::drain_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    /// A new entry was captured. It is always the newest entry.
    Added(EntryId),
    /// An existing entry moved to the newest end.
    Promoted(EntryId),
    /// An entry was deleted or evicted. The id no longer resolves.
    Removed(EntryId),
    FavoriteChanged { id: EntryId, favorite: bool },
    /// `None` when nothing is selected.
    SelectionChanged(Option<EntryId>),
    /// The visible page was rebound.
    WindowChanged,
    /// Every non-favorite entry was removed.
    Cleared,
    /// A capture completed while copy notifications are enabled.
    Copied(EntryId),
    /// The host should paste the current clipboard into the focused window.
    PasteRequested(EntryId),
    /// Preview sizes changed; every label must be recomputed.
    LabelsChanged,
    PrivateModeChanged(bool),
}
