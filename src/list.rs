#[cfg(test)]
extern crate scoped_threadpool;

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

/// Stable handle to a node in a [`List`].
///
/// Handles are plain arena indices. A handle stops being meaningful once its
/// node is unlinked, unless a [`CursorId`] is parked on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SlotId(usize);

/// The permanent anchor of the ring. Never unlinked, never tombstoned.
pub(crate) const SENTINEL: SlotId = SlotId(0);

/// A walking position registered with a [`List`].
///
/// The list owns the position so it can keep it valid across `unlink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CursorId(usize);

/// A node in the ring.
///
/// Links are arena indices, so nodes never own one another. Once unlinked a node
/// becomes a tombstone: its value is gone and `removed` is set, but `prev` keeps
/// pointing at a live neighbour for as long as a cursor sits on it.
pub(crate) struct Entry<T> {
    /// `None` for the sentinel and for tombstones.
    val: Option<T>,
    prev: SlotId,
    next: SlotId,
    removed: bool,
}

impl<T> Entry<T> {
    fn new(val: T) -> Self {
        Entry {
            val: Some(val),
            prev: SENTINEL,
            next: SENTINEL,
            removed: false,
        }
    }

    fn new_sigil() -> Self {
        Entry {
            val: None,
            prev: SENTINEL,
            next: SENTINEL,
            removed: false,
        }
    }

    fn reset(&mut self, val: T) {
        self.val = Some(val);
        self.removed = false;
    }
}

/// Circular doubly linked list stored in a growable arena.
///
/// Slot 0 holds the sentinel. New values are linked right after it, so
/// `sentinel.next` is the most recently added node and `sentinel.prev` the
/// least recently added one.
///
/// Unlinked slots go straight back to the free list unless a cursor is parked
/// on them. A parked tombstone is kept until its cursor moves on, and its
/// `prev` link is redirected whenever the node it points at is unlinked, so it
/// always leads to a live node or to the sentinel. At most one tombstone per
/// open cursor is held back from reuse.
///
/// # Examples
///
/// ```ignore
/// let mut list = List::new();
/// let a = list.push_front("a");
/// let b = list.push_front("b");
/// assert_eq!(list.prev(SENTINEL), a);
/// assert_eq!(list.unlink(a), Some("a"));
/// assert_eq!(list.prev(SENTINEL), b);
/// ```
pub(crate) struct List<T> {
    nodes: Vec<Entry<T>>,
    free: Vec<SlotId>,
    /// Positions of open cursors, indexed by [`CursorId`]. `None` marks a
    /// closed cursor whose index can be handed out again.
    cursors: Vec<Option<SlotId>>,
    len: usize,
}

impl<T> List<T> {
    /// Creates an empty list.
    pub(crate) fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes besides the sentinel.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(Entry::new_sigil());
        List {
            nodes,
            free: Vec::new(),
            cursors: Vec::new(),
            len: 0,
        }
    }

    /// Number of linked nodes, sentinel excluded.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Links `val` directly after the sentinel and returns its handle.
    pub(crate) fn push_front(&mut self, val: T) -> SlotId {
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id.0].reset(val);
                id
            }
            None => {
                self.nodes.push(Entry::new(val));
                SlotId(self.nodes.len() - 1)
            }
        };
        self.attach(id);
        self.len += 1;
        id
    }

    fn attach(&mut self, id: SlotId) {
        let first = self.nodes[SENTINEL.0].next;
        {
            let node = &mut self.nodes[id.0];
            node.prev = SENTINEL;
            node.next = first;
        }
        self.nodes[first.0].prev = id;
        self.nodes[SENTINEL.0].next = id;
    }

    /// Unlinks `id` and returns its value.
    ///
    /// Returns `None` for the sentinel, for unknown handles and for nodes that
    /// are already tombstoned. The slot is free for reuse at once unless a
    /// cursor is parked on it.
    pub(crate) fn unlink(&mut self, id: SlotId) -> Option<T> {
        if id == SENTINEL {
            return None;
        }
        let node = self.nodes.get_mut(id.0)?;
        if node.removed {
            return None;
        }
        let (prev, next) = (node.prev, node.next);
        node.removed = true;
        let val = node.val.take();

        self.nodes[prev.0].next = next;
        self.nodes[next.0].prev = prev;
        self.len -= 1;

        // Parked tombstones that led to `id` now lead to its live neighbour.
        for &pos in self.cursors.iter().flatten() {
            let parked = &mut self.nodes[pos.0];
            if pos != id && parked.removed && parked.prev == id {
                parked.prev = prev;
            }
        }
        if !self.is_parked(id) {
            self.free.push(id);
        }
        val
    }

    /// The node linked before `id`, i.e. one step from the LRU end toward the
    /// MRU end. For a parked tombstone this is a live node or the sentinel.
    #[inline]
    pub(crate) fn prev(&self, id: SlotId) -> SlotId {
        self.nodes[id.0].prev
    }

    /// Handle of the least recently added node.
    #[inline]
    pub(crate) fn back(&self) -> Option<SlotId> {
        match self.nodes[SENTINEL.0].prev {
            SENTINEL => None,
            id => Some(id),
        }
    }

    /// Borrow the value at `id`. `None` for the sentinel and tombstones.
    #[inline]
    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        self.nodes.get(id.0).and_then(|node| node.val.as_ref())
    }

    #[inline]
    pub(crate) fn is_removed(&self, id: SlotId) -> bool {
        self.nodes.get(id.0).map_or(true, |node| node.removed)
    }

    /// Registers a cursor parked on the sentinel.
    pub(crate) fn open_cursor(&mut self) -> CursorId {
        match self.cursors.iter().position(Option::is_none) {
            Some(idx) => {
                self.cursors[idx] = Some(SENTINEL);
                CursorId(idx)
            }
            None => {
                self.cursors.push(Some(SENTINEL));
                CursorId(self.cursors.len() - 1)
            }
        }
    }

    /// Moves `cursor` one node toward the MRU end and returns where it landed.
    ///
    /// A tombstone the cursor leaves behind is freed unless another cursor is
    /// still parked on it. A closed cursor stays on the sentinel.
    pub(crate) fn advance(&mut self, cursor: CursorId) -> SlotId {
        let Some(from) = self.cursors.get(cursor.0).copied().flatten() else {
            return SENTINEL;
        };
        let to = self.nodes[from.0].prev;
        self.cursors[cursor.0] = Some(to);
        self.release(from);
        to
    }

    /// Deregisters `cursor`, freeing the tombstone it was parked on.
    pub(crate) fn close_cursor(&mut self, cursor: CursorId) {
        if let Some(pos) = self.cursors.get_mut(cursor.0).and_then(Option::take) {
            self.release(pos);
        }
        while let Some(None) = self.cursors.last() {
            self.cursors.pop();
        }
    }

    #[inline]
    pub(crate) fn has_cursors(&self) -> bool {
        !self.cursors.is_empty()
    }

    fn is_parked(&self, id: SlotId) -> bool {
        self.cursors.iter().any(|&pos| pos == Some(id))
    }

    fn release(&mut self, id: SlotId) {
        if id != SENTINEL && self.nodes[id.0].removed && !self.is_parked(id) {
            self.free.push(id);
        }
    }

    /// Unlinks every node.
    pub(crate) fn clear(&mut self) {
        if self.cursors.is_empty() {
            self.nodes.truncate(1);
            let sentinel = &mut self.nodes[SENTINEL.0];
            sentinel.prev = SENTINEL;
            sentinel.next = SENTINEL;
            self.free.clear();
            self.len = 0;
        } else {
            while let Some(id) = self.back() {
                self.unlink(id);
            }
        }
    }

    /// Iterates values from the least to the most recently added.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: SENTINEL,
            remaining: self.len,
        }
    }

    /// Total arena slots, sentinel and parked tombstones included.
    #[cfg(test)]
    pub(crate) fn slots(&self) -> usize {
        self.nodes.len()
    }

    /// Walks the ring in both directions and checks the bookkeeping.
    #[cfg(any(test, debug_assertions))]
    #[allow(dead_code)]
    pub(crate) fn debug_validate_invariants(&self) {
        let sentinel = &self.nodes[SENTINEL.0];
        assert!(!sentinel.removed && sentinel.val.is_none());

        let mut forward = 0;
        let mut id = sentinel.next;
        while id != SENTINEL {
            let node = &self.nodes[id.0];
            assert!(!node.removed, "tombstone reachable from the ring");
            assert!(node.val.is_some());
            assert_eq!(self.nodes[node.next.0].prev, id, "broken back link");
            forward += 1;
            assert!(forward <= self.len, "ring longer than len");
            id = node.next;
        }
        assert_eq!(forward, self.len);

        let mut backward = 0;
        let mut id = sentinel.prev;
        while id != SENTINEL {
            backward += 1;
            assert!(backward <= self.len, "ring longer than len");
            id = self.nodes[id.0].prev;
        }
        assert_eq!(backward, self.len);

        let mut parked: Vec<SlotId> = self
            .cursors
            .iter()
            .flatten()
            .copied()
            .filter(|&pos| self.nodes[pos.0].removed)
            .collect();
        parked.sort_unstable();
        parked.dedup();
        for &pos in &parked {
            assert!(!self.free.contains(&pos), "parked tombstone on the free list");
            assert!(
                !self.is_removed(self.nodes[pos.0].prev),
                "parked tombstone leads to another tombstone"
            );
        }
        assert_eq!(
            self.len + self.free.len() + parked.len() + 1,
            self.nodes.len(),
            "slot leak"
        );
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("len", &self.len)
            .field("slots", &self.nodes.len())
            .field("free", &self.free.len())
            .field("cursors", &self.cursors.iter().flatten().count())
            .finish()
    }
}

/// LRU-to-MRU iterator over a [`List`].
pub(crate) struct Iter<'a, T> {
    list: &'a List<T>,
    cursor: SlotId,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.cursor = self.list.prev(self.cursor);
        self.remaining -= 1;
        self.list.get(self.cursor)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
