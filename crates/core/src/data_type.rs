// Heuristic classification of records as software, dataset or article

use crate::record::{FileView, RecordView};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Software,
    Dataset,
    Article,
    Unknown,
}

pub const KEYWORD_CONFIDENCE: f64 = 0.8;
pub const EXTENSION_CONFIDENCE: f64 = 0.6;

const KEYWORD_INDICATORS: [(DataType, &[&str]); 3] = [
    (DataType::Software, &["software", "code", "program", "library", "package", "tool"]),
    (DataType::Dataset, &["dataset", "data", "measurement", "survey", "collection"]),
    (DataType::Article, &["article", "paper", "publication", "journal", "conference"]),
];

const EXTENSION_INDICATORS: [(DataType, &[&str]); 3] = [
    (
        DataType::Software,
        &["py", "js", "java", "cpp", "c", "h", "r", "matlab", "php", "rb", "go", "rs", "swift", "kt", "scala"],
    ),
    (
        DataType::Dataset,
        &["csv", "tsv", "json", "xml", "hdf5", "nc", "npy", "npz", "db", "sql", "xlsx", "xls", "parquet", "avro"],
    ),
    (DataType::Article, &["pdf", "doc", "docx", "tex", "md", "txt", "rtf", "odt"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub data_type: DataType,
    pub confidence: f64,
}

/// Distinct lowercased file extensions of a record, sorted
pub fn file_extensions(record: &RecordView<'_>) -> BTreeSet<String> {
    record
        .files()
        .iter()
        .filter_map(|file| FileView::new(file).extension())
        .collect()
}

/// Keywords are checked first in software, dataset, article order; file
/// extensions are the fallback.
pub fn detect(record: &RecordView<'_>) -> Detection {
    let keywords: Vec<String> = record.keywords().iter().map(|k| k.to_lowercase()).collect();
    for (data_type, indicators) in KEYWORD_INDICATORS {
        if indicators.iter().any(|i| keywords.iter().any(|k| k == i)) {
            return Detection {
                data_type,
                confidence: KEYWORD_CONFIDENCE,
            };
        }
    }

    let extensions = file_extensions(record);
    for (data_type, indicators) in EXTENSION_INDICATORS {
        if indicators.iter().any(|ext| extensions.contains(*ext)) {
            return Detection {
                data_type,
                confidence: EXTENSION_CONFIDENCE,
            };
        }
    }

    Detection {
        data_type: DataType::Unknown,
        confidence: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keyword_detection() {
        let doc = json!({"metadata": {"keywords": ["Climate", "Dataset"]}});
        let detection = detect(&RecordView::new(&doc));
        assert_eq!(detection.data_type, DataType::Dataset);
        assert_eq!(detection.confidence, KEYWORD_CONFIDENCE);
    }

    #[test]
    fn test_software_keywords_take_precedence() {
        let doc = json!({"metadata": {"keywords": ["data", "library"]}});
        assert_eq!(detect(&RecordView::new(&doc)).data_type, DataType::Software);
    }

    #[test]
    fn test_extension_fallback() {
        let doc = json!({
            "metadata": {"keywords": ["oceanography"]},
            "files": [{"key": "paper.PDF"}, {"key": "README"}]
        });
        let detection = detect(&RecordView::new(&doc));
        assert_eq!(detection.data_type, DataType::Article);
        assert_eq!(detection.confidence, EXTENSION_CONFIDENCE);
    }

    #[test]
    fn test_unknown() {
        let doc = json!({"metadata": {}, "files": [{"key": "blob.bin"}]});
        let detection = detect(&RecordView::new(&doc));
        assert_eq!(detection.data_type, DataType::Unknown);
        assert_eq!(detection.confidence, 0.0);
    }

    #[test]
    fn test_file_extensions_sorted_distinct() {
        let doc = json!({"files": [{"key": "b.csv"}, {"key": "a.CSV"}, {"filename": "x.py"}, {"key": "noext"}]});
        let extensions: Vec<_> = file_extensions(&RecordView::new(&doc)).into_iter().collect();
        assert_eq!(extensions, vec!["csv", "py"]);
    }
}
