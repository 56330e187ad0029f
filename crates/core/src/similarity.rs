// Similarity metrics shared by the compare and related-records tools
//
// Scores are symmetric and lie in [0.0, 1.0]. An empty side scores 0.0,
// including two empty strings.

use crate::record::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Strategy used to score two scalar strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringMetric {
    /// `1 - levenshtein / max_len` over lowercased characters
    EditDistance,
    /// Jaccard overlap of lowercased whitespace-separated words
    WordJaccard,
}

impl StringMetric {
    pub fn score(self, a: &str, b: &str) -> f64 {
        match self {
            Self::EditDistance => edit_similarity(a, b),
            Self::WordJaccard => word_similarity(a, b),
        }
    }
}

/// Classic Levenshtein distance with unit costs, counted in characters.
///
/// Runs the O(n*m) recurrence over a single rolling row sized to the shorter
/// input.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, lc) in long.iter().enumerate() {
        // row[j] of the previous iteration, before it is overwritten
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(lc != sc);
            row[j + 1] = (above + 1).min(row[j] + 1).min(substitution);
            diagonal = above;
        }
    }

    row[short.len()]
}

/// Normalized edit-distance similarity, case-insensitive
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    let distance = levenshtein(&a, &b);

    1.0 - distance as f64 / max_len as f64
}

/// Word-level Jaccard similarity, case-insensitive
pub fn word_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let words_a = lowercase_set(a.split_whitespace());
    let words_b = lowercase_set(b.split_whitespace());
    set_similarity(&words_a, &words_b)
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`
pub fn set_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }

    intersection as f64 / union as f64
}

/// Jaccard similarity of two lists compared as lowercase sets
pub fn list_similarity<S: AsRef<str>>(a: &[S], b: &[S]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    set_similarity(&lowercase_set(a), &lowercase_set(b))
}

/// Shape-dispatching similarity used by record comparison.
///
/// Two lists are compared as sets; anything else is rendered to text and
/// scored by edit distance.
pub fn generic_similarity(a: &FieldValue, b: &FieldValue) -> f64 {
    match (a, b) {
        (FieldValue::List(a), FieldValue::List(b)) => list_similarity(a, b),
        _ => edit_similarity(&a.to_string(), &b.to_string()),
    }
}

pub fn lowercase_set<I, S>(items: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().to_lowercase())
        .collect()
}
