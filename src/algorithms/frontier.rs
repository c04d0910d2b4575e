use crate::grid::Cell;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// Discovered-but-unexpanded cells awaiting expansion.
///
/// A cell may be pushed more than once; callers must re-check visited
/// state after `pop_min`.
pub trait Frontier {
    fn push(&mut self, cell: Cell, priority: u32);
    /// Removes and returns the next cell to expand.
    fn pop_min(&mut self) -> Option<Cell>;
    fn contains(&self, cell: Cell) -> bool;
    fn is_empty(&self) -> bool;
    /// Number of pending entries, stale ones included.
    fn len(&self) -> usize;
    /// Pending cells in expansion order, one entry per cell.
    fn pending(&self) -> Vec<Cell>;
}

/// Pending-entry counts so `contains` stays O(1) with duplicates.
#[derive(Debug, Default)]
struct Membership {
    counts: FxHashMap<Cell, usize>,
}

impl Membership {
    fn add(&mut self, cell: Cell) {
        *self.counts.entry(cell).or_insert(0) += 1;
    }

    fn remove(&mut self, cell: Cell) {
        if let Some(count) = self.counts.get_mut(&cell) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&cell);
            }
        }
    }

    fn contains(&self, cell: Cell) -> bool {
        self.counts.contains_key(&cell)
    }
}

fn unique_in_order(cells: impl Iterator<Item = Cell>) -> Vec<Cell> {
    let mut seen = FxHashSet::default();
    cells.filter(|cell| seen.insert(*cell)).collect()
}

/// Strict insertion order. Priorities are ignored.
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<Cell>,
    members: Membership,
}

impl FifoFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for FifoFrontier {
    fn push(&mut self, cell: Cell, _priority: u32) {
        self.queue.push_back(cell);
        self.members.add(cell);
    }

    fn pop_min(&mut self) -> Option<Cell> {
        let cell = self.queue.pop_front()?;
        self.members.remove(cell);
        Some(cell)
    }

    fn contains(&self, cell: Cell) -> bool {
        self.members.contains(cell)
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn pending(&self) -> Vec<Cell> {
        unique_in_order(self.queue.iter().copied())
    }
}

/// Heap entry ordered by priority, then by push sequence number.
#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: u32,
    seq: u64,
    cell: Cell,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the lowest priority, oldest first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Ascending priority, ties broken by insertion order.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    members: Membership,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for PriorityFrontier {
    fn push(&mut self, cell: Cell, priority: u32) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            cell,
        });
        self.members.add(cell);
    }

    fn pop_min(&mut self) -> Option<Cell> {
        let entry = self.heap.pop()?;
        self.members.remove(entry.cell);
        Some(entry.cell)
    }

    fn contains(&self, cell: Cell) -> bool {
        self.members.contains(cell)
    }

    fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn pending(&self) -> Vec<Cell> {
        let mut entries: Vec<Entry> = self.heap.iter().copied().collect();
        // Greatest under the reversed order is the next to pop.
        entries.sort_by(|a, b| b.cmp(a));
        unique_in_order(entries.into_iter().map(|e| e.cell))
    }
}
