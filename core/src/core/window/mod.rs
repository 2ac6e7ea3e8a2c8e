//! Visible page of the non-favorite history.
//!
//! Slots are ordered top to bottom, so slot 0 holds the newest entry of the
//! page. New entries always land in slot 0, even after the user has paged
//! away from the newest page; paging rebinds the existing slots instead of
//! recomputing the page from the registry.

use crate::core::registry::{EntryId, Registry};

#[derive(Debug, Clone)]
pub struct PaginationWindow {
    page_size: usize,
    slots: Vec<EntryId>,
}

impl PaginationWindow {
    /// A page size of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            slots: Vec::with_capacity(page_size * 2),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn slots(&self) -> &[EntryId] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.position(id).is_some()
    }
}

/// Binding operations.
impl PaginationWindow {
    /// Binds `id` into slot 0, moving it there if already bound.
    ///
    /// Once the window holds two pages worth of slots, everything past the
    /// first page is released.
    pub fn bind_front(&mut self, id: EntryId) {
        if let Some(position) = self.position(id) {
            self.slots.remove(position);
        }
        self.slots.insert(0, id);
        self.reclaim();
    }

    /// Releases the slot bound to `id`. Returns whether it was bound.
    pub fn unbind(&mut self, id: EntryId) -> bool {
        match self.position(id) {
            Some(position) => {
                self.slots.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Refills an empty window from the newest non-favorite entries.
    ///
    /// Returns `true` if anything was bound.
    pub fn restore(&mut self, registry: &Registry) -> bool {
        if !self.slots.is_empty() {
            return false;
        }
        self.fill(registry);
        !self.slots.is_empty()
    }

    /// Replaces every slot with the newest page of non-favorite entries.
    pub fn fill(&mut self, registry: &Registry) {
        self.slots.clear();
        self.slots.extend(
            registry
                .iter()
                .rev()
                .filter(|(_, entry)| !entry.is_favorite())
                .map(|(id, _)| id)
                .take(self.page_size),
        );
    }

    fn reclaim(&mut self) {
        if self.slots.len() >= self.page_size * 2 {
            self.slots.truncate(self.page_size);
        }
    }
}

/// Paging operations.
impl PaginationWindow {
    /// Rebinds the slots to the entries older than the bottom slot.
    ///
    /// Walks the cyclic predecessor chain from the bottom slot, skipping
    /// favorites, and fills slots from the top until every slot is rebound or
    /// the walk wraps back to where it started. Returns whether any slot
    /// changed.
    pub fn step_older(&mut self, registry: &Registry) -> bool {
        let Some(&start) = self.slots.last() else {
            return false;
        };

        let mut changed = false;
        let mut slot = 0;
        let mut cursor = registry.predecessor_cyclic(start);
        while let Some(id) = cursor {
            if id == start || slot >= self.slots.len() {
                break;
            }
            if !Self::is_favorite(registry, id) {
                changed |= self.slots[slot] != id;
                self.slots[slot] = id;
                slot += 1;
            }
            cursor = registry.predecessor_cyclic(id);
        }
        changed
    }

    /// Rebinds the slots to the entries newer than the top slot.
    ///
    /// Symmetric to [`PaginationWindow::step_older`]: walks the cyclic
    /// successor chain from the top slot and fills slots from the bottom.
    pub fn step_newer(&mut self, registry: &Registry) -> bool {
        let Some(&start) = self.slots.first() else {
            return false;
        };

        let mut changed = false;
        let mut remaining = self.slots.len();
        let mut cursor = registry.successor_cyclic(start);
        while let Some(id) = cursor {
            if id == start || remaining == 0 {
                break;
            }
            if !Self::is_favorite(registry, id) {
                remaining -= 1;
                changed |= self.slots[remaining] != id;
                self.slots[remaining] = id;
            }
            cursor = registry.successor_cyclic(id);
        }
        changed
    }

    fn is_favorite(registry: &Registry, id: EntryId) -> bool {
        registry.get(id).is_some_and(|entry| entry.is_favorite())
    }
}

#[cfg(test)]
mod tests;
