// Composite scoring and ranking of related-record candidates

use crate::record::RecordView;
use crate::similarity::{lowercase_set, set_similarity, StringMetric};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

pub const TITLE_WEIGHT: f64 = 0.4;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const CREATOR_WEIGHT: f64 = 0.3;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedCandidate {
    pub record_id: String,
    pub title: String,
    pub similarity: f64,
}

/// Search terms derived from a record: its title, keywords, then creator names.
///
/// Blank and repeated terms are dropped; first occurrence wins.
pub fn search_terms(record: &RecordView<'_>) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(record.title().to_string())
        .chain(record.keywords())
        .chain(record.creators())
        .map(|term| term.trim().to_string())
        .filter(|term| !term.is_empty())
        .filter(|term| seen.insert(term.to_lowercase()))
        .collect()
}

/// `0.4 * title + 0.3 * keywords + 0.3 * creators`.
///
/// Titles are scored by word overlap, keywords and creators as lowercase sets.
pub fn composite_similarity(a: &RecordView<'_>, b: &RecordView<'_>) -> f64 {
    let title = StringMetric::WordJaccard.score(a.title(), b.title());
    let keywords = set_similarity(&lowercase_set(a.keywords()), &lowercase_set(b.keywords()));
    let creators = set_similarity(&lowercase_set(a.creators()), &lowercase_set(b.creators()));

    TITLE_WEIGHT * title + KEYWORD_WEIGHT * keywords + CREATOR_WEIGHT * creators
}

/// Score, filter and rank candidate documents against a target record.
///
/// Candidates sharing the target's id or lacking an id are skipped, and a
/// record surfaced by several searches is scored once. The threshold is
/// inclusive. Ties keep discovery order.
pub fn rank_candidates<'a>(
    target_id: &str,
    target: &RecordView<'_>,
    candidates: impl IntoIterator<Item = &'a Value>,
    similarity_threshold: f64,
    max_results: usize,
) -> Vec<RelatedCandidate> {
    let mut seen = HashSet::new();
    let mut ranked: Vec<RelatedCandidate> = candidates
        .into_iter()
        .map(RecordView::new)
        .filter_map(|candidate| {
            let id = candidate.id()?;
            if id == target_id || !seen.insert(id.clone()) {
                return None;
            }
            Some(RelatedCandidate {
                record_id: id,
                title: candidate.title().to_string(),
                similarity: composite_similarity(target, &candidate),
            })
        })
        .filter(|candidate| candidate.similarity >= similarity_threshold)
        .collect();

    ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    ranked.truncate(max_results);
    ranked
}
