//! Partial top-k selection.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// An entity id with its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredId {
    pub entity_id: i64,
    pub similarity: f32,
}

impl ScoredId {
    pub fn new(entity_id: i64, similarity: f32) -> Self {
        Self {
            entity_id,
            similarity,
        }
    }

    /// Result order: higher similarity first, ties by ascending id.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .similarity
            .total_cmp(&self.similarity)
            .then_with(|| self.entity_id.cmp(&other.entity_id))
    }
}

/// Heap entry ordered so the worst kept result sits on top.
struct Kept(ScoredId);

impl PartialEq for Kept {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Kept {}

impl PartialOrd for Kept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kept {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Keep the best `k` scores in O(N log k) and return them in result order.
pub fn select_top_k(scores: impl IntoIterator<Item = ScoredId>, k: usize) -> Vec<ScoredId> {
    if k == 0 {
        return Vec::new();
    }

    let scores = scores.into_iter();
    // `k` is caller-controlled; never let it size an allocation on its own.
    let (lower, _) = scores.size_hint();
    let mut heap: BinaryHeap<Kept> = BinaryHeap::with_capacity(k.min(lower));
    for scored in scores {
        if heap.len() < k {
            heap.push(Kept(scored));
            continue;
        }
        let replaces_worst = heap
            .peek()
            .is_some_and(|worst| scored.rank_cmp(&worst.0) == Ordering::Less);
        if replaces_worst {
            heap.pop();
            heap.push(Kept(scored));
        }
    }

    heap.into_sorted_vec().into_iter().map(|kept| kept.0).collect()
}
