//! Weighted reciprocal rank fusion.

use std::collections::HashMap;

use starsearch_protocols::{Candidate, MatchOrigin, DEFAULT_SEMANTIC_WEIGHT};

/// Standard RRF damping constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Configuration for result fusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionConfig {
    /// Weight for the vector ranking (0.0 - 1.0).
    /// The lexical ranking gets `1.0 - semantic_weight`.
    pub semantic_weight: f32,
    /// RRF parameter k.
    pub k: u32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            k: DEFAULT_RRF_K,
        }
    }
}

impl FusionConfig {
    pub fn new(semantic_weight: f32, k: u32) -> Self {
        Self { semantic_weight, k }
    }

    /// `(vector_weight, lexical_weight)`.
    pub fn weights(&self) -> (f32, f32) {
        (self.semantic_weight, 1.0 - self.semantic_weight)
    }

    /// Fuse a vector ranking with a lexical ranking.
    pub fn fuse(
        &self,
        vector: Vec<Candidate>,
        lexical: Vec<Candidate>,
        limit: usize,
    ) -> Vec<Candidate> {
        let (vector_weight, lexical_weight) = self.weights();
        rrf_fuse(
            vec![(vector, vector_weight), (lexical, lexical_weight)],
            self.k,
            limit,
        )
    }
}

struct Accumulated {
    candidate: Candidate,
    score: f64,
    first_list: usize,
}

/// Reciprocal Rank Fusion over any number of weighted ranked lists.
///
/// The candidate at zero-based rank `r` of a list with weight `w` adds
/// `w / (k + r + 1)` to its entity's score. Entities are keyed by
/// `full_name`, so records from sources with different numeric ids still
/// merge. An entity present in more than one list becomes
/// [`MatchOrigin::Fused`]; its metadata is taken from the last list that
/// saw it, its similarity from whichever list supplied one.
///
/// Output is sorted by descending score. Equal scores keep the order in
/// which entities were first seen, so equal inputs give equal outputs.
pub fn rrf_fuse(
    lists: Vec<(Vec<Candidate>, f32)>,
    k: u32,
    limit: usize,
) -> Vec<Candidate> {
    let mut order: Vec<Accumulated> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (list_no, (candidates, weight)) in lists.into_iter().enumerate() {
        for (rank, candidate) in candidates.into_iter().enumerate() {
            let contribution = weight as f64 / (k as f64 + rank as f64 + 1.0);

            match index.get(candidate.key()) {
                Some(&slot) => {
                    let entry = &mut order[slot];
                    entry.score += contribution;
                    if entry.first_list != list_no {
                        entry.candidate.origin = MatchOrigin::Fused;
                    }
                    entry.candidate.score = entry.candidate.score.or(candidate.score);
                    entry.candidate.metadata = candidate.metadata;
                }
                None => {
                    index.insert(candidate.key().to_string(), order.len());
                    order.push(Accumulated {
                        candidate,
                        score: contribution,
                        first_list: list_no,
                    });
                }
            }
        }
    }

    // Stable sort: ties stay in first-seen order.
    order.sort_by(|a, b| b.score.total_cmp(&a.score));

    order
        .into_iter()
        .take(limit)
        .map(|entry| {
            let mut candidate = entry.candidate;
            candidate.fusion_score = Some(entry.score as f32);
            candidate
        })
        .collect()
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
