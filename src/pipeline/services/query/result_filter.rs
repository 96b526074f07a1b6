use crate::pipeline::types::{Candidate, Threshold};

pub const NO_RESULTS_MESSAGE: &str = "No similar products found.";

/// Candidates that passed the threshold, plus how many were considered.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResults {
    pub candidates: Vec<Candidate>,
    pub total: usize,
    pub threshold: Threshold,
}

impl FilteredResults {
    pub fn kept(&self) -> usize {
        self.candidates.len()
    }

    pub fn excluded(&self) -> usize {
        self.total - self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Keeps candidates with `similarity >= threshold` in their ranked order.
/// An unscored candidate only passes a zero threshold.
pub fn filter_by_threshold(candidates: &[Candidate], threshold: Threshold) -> FilteredResults {
    FilteredResults {
        candidates: candidates
            .iter()
            .filter(|c| threshold.admits(c.score()))
            .cloned()
            .collect(),
        total: candidates.len(),
        threshold,
    }
}
