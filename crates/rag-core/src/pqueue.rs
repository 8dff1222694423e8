//! A lazy-deletion min-priority-queue over edges.
//!
//! Rather than removing stale entries from the heap when an edge is
//! rewired or deleted, each entry carries the generation number it was
//! pushed with. The edge table's current generation is the source of
//! truth; an entry is stale the moment it no longer matches, and is
//! silently skipped when popped. This avoids the O(N) heap-search a
//! `decrease-key` implementation would need.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::newtypes::{EdgeId, Generation};

#[derive(Debug, PartialEq)]
struct Entry {
    priority: f64,
    edge: EdgeId,
    generation: Generation,
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the priority comparison so the
        // smallest priority pops first. Ties break on the lower edge id so
        // agglomeration order is deterministic.
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

/// A min-heap of `(priority, edge)` pairs with O(1) stale-entry detection.
#[derive(Debug, Default)]
pub struct PriorityQueue {
    heap: BinaryHeap<Entry>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn push(&mut self, priority: f64, edge: EdgeId, generation: Generation) {
        self.heap.push(Entry {
            priority,
            edge,
            generation,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Pops the smallest-priority entry, ignoring staleness. Callers
    /// compare the returned generation against the edge table's current
    /// generation to decide whether to act on it.
    pub fn pop(&mut self) -> Option<(f64, EdgeId, Generation)> {
        self.heap.pop().map(|e| (e.priority, e.edge, e.generation))
    }
}
