// Pairwise field comparison across a set of fetched records

use crate::error::{CoreError, CoreResult};
use crate::record::{extract_field, FieldValue};
use crate::similarity::generic_similarity;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Pairs scoring below this are reported as differences
pub const DIVERGENCE_THRESHOLD: f64 = 0.8;

/// Fields compared when the caller does not name any
pub const DEFAULT_COMPARE_FIELDS: [&str; 4] = ["title", "authors", "topics", "publication_date"];

/// Similarity of one field across every record pair
#[derive(Debug, Clone, Serialize)]
pub struct FieldComparison {
    /// Keyed by [`pair_key`]
    pub similarity_scores: BTreeMap<String, f64>,
    pub average_similarity: f64,
}

/// A record pair whose field values diverge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub record_id1: String,
    pub record_id2: String,
    pub value1: String,
    pub value2: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub record_ids: Vec<String>,
    pub field_comparisons: BTreeMap<String, FieldComparison>,
    pub overall_similarity: f64,
    pub differences: BTreeMap<String, Vec<Difference>>,
}

/// Joins the two ids of a pair key. Record ids never contain it.
pub const PAIR_SEPARATOR: char = '_';

/// Order-independent key for a record pair
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}{PAIR_SEPARATOR}{b}")
    } else {
        format!("{b}{PAIR_SEPARATOR}{a}")
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Compare `fields` across `records`, given as `(record_id, document)` pairs.
///
/// Fails with [`CoreError::InsufficientRecords`] when fewer than two records
/// are supplied.
pub fn compare_records(records: &[(String, Value)], fields: &[String]) -> CoreResult<ComparisonReport> {
    if records.len() < 2 {
        return Err(CoreError::InsufficientRecords {
            found: records.len(),
        });
    }

    let mut field_comparisons = BTreeMap::new();
    let mut differences = BTreeMap::new();

    for field in fields {
        let values: Vec<(&str, FieldValue)> = records
            .iter()
            .map(|(id, doc)| (id.as_str(), extract_field(doc, field)))
            .collect();

        let mut scores = BTreeMap::new();
        let mut pair_scores = Vec::new();
        let mut field_differences = Vec::new();

        for (i, (id1, value1)) in values.iter().enumerate() {
            for (id2, value2) in &values[i + 1..] {
                let similarity = generic_similarity(value1, value2);
                scores.insert(pair_key(id1, id2), similarity);
                pair_scores.push(similarity);

                if similarity < DIVERGENCE_THRESHOLD {
                    field_differences.push(Difference {
                        record_id1: id1.to_string(),
                        record_id2: id2.to_string(),
                        value1: value1.to_string(),
                        value2: value2.to_string(),
                    });
                }
            }
        }

        let average_similarity = mean(pair_scores);
        field_comparisons.insert(
            field.clone(),
            FieldComparison {
                similarity_scores: scores,
                average_similarity,
            },
        );
        differences.insert(field.clone(), field_differences);
    }

    let overall_similarity = mean(field_comparisons.values().map(|c| c.average_similarity));

    Ok(ComparisonReport {
        record_ids: records.iter().map(|(id, _)| id.clone()).collect(),
        field_comparisons,
        overall_similarity,
        differences,
    })
}
