// Frequency-based keyword extraction from record text

use crate::record::RecordView;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_MAX_KEYWORDS: usize = 10;
pub const DEFAULT_MIN_FREQUENCY: usize = 2;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "were", "will", "with", "this", "but", "they",
    "have", "had", "what", "when", "where", "who", "which", "why", "how", "all", "any", "both",
    "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "own",
    "same", "so", "than", "too", "very", "can", "just", "should", "now",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub frequency: usize,
}

/// Title, description and declared keywords joined into one text
pub fn record_text(record: &RecordView<'_>) -> String {
    [
        record.title().to_string(),
        record.description().to_string(),
        record.keywords().join(" "),
    ]
    .join(" ")
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_numeric())
        .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
        .collect()
}

/// Most frequent terms of `text`, at most `max_keywords`, each occurring at
/// least `min_frequency` times. Equal counts keep first-appearance order.
pub fn extract_keywords(text: &str, max_keywords: usize, min_frequency: usize) -> Vec<KeywordCount> {
    let normalized = normalize(text);

    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in normalized.split_whitespace() {
        if word.chars().count() <= 2 || STOP_WORDS.contains(&word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|w| (w, counts[w])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    ranked
        .into_iter()
        .take(max_keywords)
        .filter(|(_, frequency)| *frequency >= min_frequency)
        .map(|(keyword, frequency)| KeywordCount {
            keyword: keyword.to_string(),
            frequency,
        })
        .collect()
}
