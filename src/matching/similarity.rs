// src/matching/similarity.rs
use strsim::{levenshtein, sorensen_dice};

/// Similarity and edit distance for one pair of terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermComparison {
    pub similarity: f64,
    pub edit_distance: usize,
}

impl TermComparison {
    pub fn qualifies(&self, threshold: f64, max_edit_distance: usize) -> bool {
        self.similarity >= threshold && self.edit_distance <= max_edit_distance
    }
}

fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Sørensen–Dice coefficient over character bigrams, case-insensitive.
/// Symmetric and bounded to [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    sorensen_dice(&normalize_term(a), &normalize_term(b))
}

/// Case-insensitive Levenshtein distance.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(&normalize_term(a), &normalize_term(b))
}

/// Compares two already-lowercased, trimmed terms.
pub fn compare_normalized(a: &str, b: &str) -> TermComparison {
    TermComparison {
        similarity: sorensen_dice(a, b),
        edit_distance: levenshtein(a, b),
    }
}

pub fn compare_terms(a: &str, b: &str) -> TermComparison {
    compare_normalized(&normalize_term(a), &normalize_term(b))
}
