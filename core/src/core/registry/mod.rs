//! Ordered, de-duplicated entry storage.
//!
//! Entries live in one doubly linked sequence ordered oldest → newest. Favorites
//! and history share that sequence; partitions are filters applied by callers,
//! so promotion and cyclic navigation always see one global recency order.
//!
//! The list is an arena of slots linked by index. An [`EntryId`] carries the
//! slot's generation, so an id kept after its entry was removed never resolves
//! to whatever later reuses the slot.
//!
//! A content index keyed by [`Content::digest`] gives O(1) duplicate lookup.

use crate::types::{Content, DiskId, Entry, MemoryId};
use std::collections::HashMap;

/// Handle to an entry in a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    index: u32,
    generation: u32,
}

struct Node {
    entry: Entry,
    /// Towards the oldest end.
    prev: Option<u32>,
    /// Towards the newest end.
    next: Option<u32>,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
    favorites: usize,
    index: HashMap<blake3::Hash, EntryId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of entries that count against the history size bound.
    pub fn history_len(&self) -> usize {
        self.len - self.favorites
    }

    pub fn favorites_len(&self) -> usize {
        self.favorites
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.node(id).is_some()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.node(id).map(|node| &node.entry)
    }

    pub fn lookup_by_content(&self, content: &Content) -> Option<EntryId> {
        self.index.get(&content.digest()).copied()
    }

    pub fn oldest(&self) -> Option<EntryId> {
        self.head.map(|index| self.id_at(index))
    }

    pub fn newest(&self) -> Option<EntryId> {
        self.tail.map(|index| self.id_at(index))
    }

    /// Next newer entry, `None` at the newest end.
    pub fn successor(&self, id: EntryId) -> Option<EntryId> {
        self.node(id)?.next.map(|index| self.id_at(index))
    }

    /// Next older entry, `None` at the oldest end.
    pub fn predecessor(&self, id: EntryId) -> Option<EntryId> {
        self.node(id)?.prev.map(|index| self.id_at(index))
    }

    /// Next newer entry, wrapping from the newest to the oldest.
    pub fn successor_cyclic(&self, id: EntryId) -> Option<EntryId> {
        let node = self.node(id)?;
        node.next.or(self.head).map(|index| self.id_at(index))
    }

    /// Next older entry, wrapping from the oldest to the newest.
    pub fn predecessor_cyclic(&self, id: EntryId) -> Option<EntryId> {
        let node = self.node(id)?;
        node.prev.or(self.tail).map(|index| self.id_at(index))
    }

    /// Iterates oldest → newest. Use `.rev()` for newest first.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }
}

/// Mutation operations.
impl Registry {
    /// Inserts at the newest end.
    ///
    /// If an entry with the same content exists, that entry is moved to the
    /// newest end instead and `entry` is handed back unused.
    pub fn insert_newest(&mut self, entry: Entry) -> (EntryId, Option<Entry>) {
        if let Some(existing) = self.lookup_by_content(&entry.content) {
            self.move_to_newest(existing);
            return (existing, Some(entry));
        }

        let id = self.allocate(entry);
        self.link_after(id.index, self.tail);
        (id, None)
    }

    /// Inserts at the oldest end, with the same duplicate handling as
    /// [`Registry::insert_newest`] except that an existing entry keeps its place.
    pub fn insert_oldest(&mut self, entry: Entry) -> (EntryId, Option<Entry>) {
        if let Some(existing) = self.lookup_by_content(&entry.content) {
            return (existing, Some(entry));
        }

        let id = self.allocate(entry);
        self.link_before(id.index, self.head);
        (id, None)
    }

    /// Moves an entry to the newest end. Returns `false` for unknown ids.
    pub fn move_to_newest(&mut self, id: EntryId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.tail == Some(id.index) {
            return true;
        }

        self.unlink(id.index);
        self.link_after(id.index, self.tail);
        true
    }

    /// Unlinks and returns an entry. Persistence is the caller's concern.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        self.node(id)?;

        self.unlink(id.index);
        let slot = &mut self.slots[id.index as usize];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        self.len -= 1;
        if node.entry.favorite {
            self.favorites -= 1;
        }
        self.index.remove(&node.entry.content.digest());
        Some(node.entry)
    }

    pub fn set_favorite(&mut self, id: EntryId, favorite: bool) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let was = std::mem::replace(&mut node.entry.favorite, favorite);
        match (was, favorite) {
            (false, true) => self.favorites += 1,
            (true, false) => self.favorites -= 1,
            _ => {}
        }
        true
    }

    pub fn set_disk_id(&mut self, id: EntryId, disk_id: Option<DiskId>) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.entry.disk_id = disk_id;
        true
    }

    /// Renumbers memory ids densely from 1 in list order.
    /// Returns the next free memory id.
    pub fn renumber(&mut self) -> MemoryId {
        let mut next = 1;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let node = self.slots[index as usize]
                .node
                .as_mut()
                .expect("linked slot is occupied");
            node.entry.memory_id = MemoryId(next);
            next += 1;
            cursor = node.next;
        }
        MemoryId(next)
    }
}

/// Internal helpers.
impl Registry {
    fn node(&self, id: EntryId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: EntryId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn id_at(&self, index: u32) -> EntryId {
        EntryId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    fn linked(&mut self, index: u32) -> &mut Node {
        self.slots[index as usize]
            .node
            .as_mut()
            .expect("linked slot is occupied")
    }

    fn allocate(&mut self, entry: Entry) -> EntryId {
        let favorite = entry.favorite;
        let digest = entry.content.digest();
        let node = Node {
            entry,
            prev: None,
            next: None,
        };

        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index as usize].node = Some(node);
                index
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("registry slot overflow");
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                index
            }
        };

        let id = self.id_at(index);
        self.len += 1;
        if favorite {
            self.favorites += 1;
        }
        self.index.insert(digest, id);
        id
    }

    fn unlink(&mut self, index: u32) {
        let (prev, next) = {
            let node = self.linked(index);
            (node.prev.take(), node.next.take())
        };

        match prev {
            Some(prev) => self.linked(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.linked(next).prev = prev,
            None => self.tail = prev,
        }
    }

    /// Links a detached node right after `anchor` (`None` = at the head).
    fn link_after(&mut self, index: u32, anchor: Option<u32>) {
        let next = match anchor {
            Some(anchor) => self.linked(anchor).next,
            None => self.head,
        };

        {
            let node = self.linked(index);
            node.prev = anchor;
            node.next = next;
        }

        match anchor {
            Some(anchor) => self.linked(anchor).next = Some(index),
            None => self.head = Some(index),
        }
        match next {
            Some(next) => self.linked(next).prev = Some(index),
            None => self.tail = Some(index),
        }
    }

    /// Links a detached node right before `anchor` (`None` = at the tail).
    fn link_before(&mut self, index: u32, anchor: Option<u32>) {
        let prev = match anchor {
            Some(anchor) => self.linked(anchor).prev,
            None => self.tail,
        };
        self.link_after(index, prev);
    }
}

/// Double-ended iterator over `(EntryId, &Entry)`, oldest first.
pub struct Iter<'a> {
    registry: &'a Registry,
    front: Option<u32>,
    back: Option<u32>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (EntryId, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.front?;
        let node = self.registry.slots[index as usize].node.as_ref()?;
        self.front = node.next;
        self.remaining -= 1;
        Some((self.registry.id_at(index), &node.entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.back?;
        let node = self.registry.slots[index as usize].node.as_ref()?;
        self.back = node.prev;
        self.remaining -= 1;
        Some((self.registry.id_at(index), &node.entry))
    }
}

impl ExactSizeIterator for Iter<'_> {}
