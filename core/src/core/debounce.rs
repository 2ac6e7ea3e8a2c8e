//! Suppression of clipboard notifications caused by our own writes.

/// Counts programmatic clipboard writes whose change notification has not
/// been observed yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDebouncer {
    pending: u32,
}

impl ChangeDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call right before writing to the clipboard.
    pub fn arm(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Call for every observed clipboard change. Returns `true` if the change
    /// was caused by an armed write and must be ignored.
    pub fn suppress(&mut self) -> bool {
        if self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }

    /// Withdraws one arm after a write that never reached the clipboard.
    pub fn cancel(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }
}
