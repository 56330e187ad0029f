// Plain-text summaries built from record metadata

use crate::data_type::file_extensions;
use crate::record::{FileView, RecordView};
use serde_json::Value;

pub const DEFAULT_MAX_LENGTH: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    pub include_files: bool,
    pub include_versions: bool,
    /// Maximum description length, in characters
    pub max_length: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            include_files: false,
            include_versions: false,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn build_summary(record: &RecordView<'_>, options: SummaryOptions) -> String {
    let mut lines = vec![
        format!("Title: {}", record.title()),
        format!(
            "\nDescription: {}",
            truncate_chars(record.description(), options.max_length)
        ),
        format!("\nPublication Date: {}", record.publication_date()),
        format!("Resource Type: {}", record.resource_type()),
        format!("Access Right: {}", record.access_right()),
        format!("Creators: {}", record.creators().join(", ")),
    ];

    let files = record.files();
    if options.include_files && !files.is_empty() {
        let total_size: u64 = files.iter().map(|f| FileView::new(f).size()).sum();
        let extensions: Vec<String> = file_extensions(record).into_iter().collect();
        lines.push("\nFiles:".to_string());
        lines.push(format!("- Count: {}", files.len()));
        lines.push(format!("- Total Size: {total_size} bytes"));
        lines.push(format!("- File Types: {}", extensions.join(", ")));
    }

    let versions = record.versions();
    if options.include_versions && !versions.is_empty() {
        let is_latest = versions
            .iter()
            .any(|v| v.get("is_last").and_then(Value::as_bool).unwrap_or(false));
        let parent_id = versions
            .first()
            .and_then(|v| v.get("parent"))
            .and_then(|p| p.get("pid_value"))
            .and_then(crate::record::id_text);

        lines.push("\nVersions:".to_string());
        lines.push(format!("- Count: {}", versions.len()));
        lines.push(format!("- Latest Version: {}", if is_latest { "Yes" } else { "No" }));
        if let Some(parent_id) = parent_id {
            lines.push(format!("- Parent ID: {parent_id}"));
        }
    }

    lines.join("\n")
}
