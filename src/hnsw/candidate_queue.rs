//! Heaps used by the layer search: total ordering over `(distance, id)`.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A node id paired with its distance to the current query.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub id: usize,
    pub distance: f32,
}

impl Candidate {
    pub fn new(id: usize, distance: f32) -> Self {
        Self { id, distance }
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Larger distance sorts greater; equal distances fall back to id so that
// heap order never depends on insertion order.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Nearest-first frontier of nodes still to expand.
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<Reverse<Candidate>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, c: Candidate) {
        self.heap.push(Reverse(c));
    }

    pub fn pop(&mut self) -> Option<Candidate> {
        self.heap.pop().map(|Reverse(c)| c)
    }
}

/// The `ef` best nodes found so far, furthest on top so it can be evicted.
pub struct ResultSet {
    heap: BinaryHeap<Candidate>,
    capacity: usize,
}

impl ResultSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Distance of the worst kept result, or infinity while not yet full.
    pub fn bound(&self) -> f32 {
        if self.heap.len() < self.capacity {
            f32::INFINITY
        } else {
            self.heap.peek().map_or(f32::INFINITY, |c| c.distance)
        }
    }

    /// Insert `c`, evicting the furthest result when over capacity.
    pub fn push(&mut self, c: Candidate) {
        self.heap.push(c);
        if self.heap.len() > self.capacity {
            self.heap.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Results ascending by distance, ties by id.
    pub fn into_sorted_vec(self) -> Vec<Candidate> {
        self.heap.into_sorted_vec()
    }
}
