// Typed field access over loosely-structured Zenodo record documents

use serde::Serialize;
use serde_json::Value;
use std::fmt;

static NULL: Value = Value::Null;

/// A record field resolved to either scalar text or a list of strings.
///
/// A given field name always resolves to the same variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// Resolve a semantic field name against a record document.
///
/// `authors`/`creators` and `topics`/`keywords` yield lists; `title`,
/// `publication_date`, `description`, `license` and `resource_type` yield
/// text. Any other name is looked up verbatim inside `metadata` and rendered
/// as text, defaulting to the empty string.
pub fn extract_field(record: &Value, field: &str) -> FieldValue {
    let view = RecordView::new(record);
    match field {
        "title" => FieldValue::Text(view.title().to_string()),
        "authors" | "creators" => FieldValue::List(view.creators()),
        "topics" | "keywords" => FieldValue::List(view.keywords()),
        "publication_date" => FieldValue::Text(view.publication_date().to_string()),
        "description" => FieldValue::Text(view.description().to_string()),
        "license" => FieldValue::Text(view.license()),
        "resource_type" => FieldValue::Text(view.resource_type()),
        other => FieldValue::Text(
            view.metadata()
                .get(other)
                .map(scalar_text)
                .unwrap_or_default(),
        ),
    }
}

/// Render a JSON value as display text; strings are taken verbatim
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize a record identifier that may be serialized as number or string
pub fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Borrowed view over one record document
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    doc: &'a Value,
}

impl<'a> RecordView<'a> {
    pub fn new(doc: &'a Value) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &'a Value {
        self.doc
    }

    /// Record id from `id`, falling back to the legacy `recid`
    pub fn id(&self) -> Option<String> {
        self.doc
            .get("id")
            .and_then(id_text)
            .or_else(|| self.doc.get("recid").and_then(id_text))
    }

    pub fn metadata(&self) -> &'a Value {
        self.doc.get("metadata").unwrap_or(&NULL)
    }

    fn metadata_str(&self, key: &str) -> &'a str {
        self.metadata().get(key).and_then(Value::as_str).unwrap_or("")
    }

    pub fn title(&self) -> &'a str {
        self.metadata_str("title")
    }

    pub fn description(&self) -> &'a str {
        self.metadata_str("description")
    }

    pub fn publication_date(&self) -> &'a str {
        self.metadata_str("publication_date")
    }

    /// DOI from metadata, or the top-level `doi` of newer API responses
    pub fn doi(&self) -> &'a str {
        let doi = self.metadata_str("doi");
        if doi.is_empty() {
            self.doc.get("doi").and_then(Value::as_str).unwrap_or("")
        } else {
            doi
        }
    }

    pub fn access_right(&self) -> &'a str {
        self.metadata_str("access_right")
    }

    /// Creator display names, in document order
    pub fn creators(&self) -> Vec<String> {
        self.metadata()
            .get("creators")
            .and_then(Value::as_array)
            .map(|creators| {
                creators
                    .iter()
                    .filter_map(|c| c.get("name").and_then(Value::as_str))
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn keywords(&self) -> Vec<String> {
        self.metadata()
            .get("keywords")
            .and_then(Value::as_array)
            .map(|keywords| {
                keywords
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// License identifier; accepts both `"cc-by-4.0"` and `{"id": "cc-by-4.0"}`
    pub fn license(&self) -> String {
        match self.metadata().get("license") {
            Some(Value::String(id)) => id.clone(),
            Some(license) => license
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            None => String::new(),
        }
    }

    /// Human-readable resource type (`title`, else `type`)
    pub fn resource_type(&self) -> String {
        match self.metadata().get("resource_type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(kind) => kind
                .get("title")
                .or_else(|| kind.get("type"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            None => String::new(),
        }
    }

    pub fn files(&self) -> &'a [Value] {
        self.doc
            .get("files")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Entries of `metadata.relations.version`
    pub fn versions(&self) -> &'a [Value] {
        self.metadata()
            .get("relations")
            .and_then(|r| r.get("version"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find_file(&self, file_name: &str) -> Option<FileView<'a>> {
        self.files()
            .iter()
            .map(FileView::new)
            .find(|file| file.name() == file_name)
    }
}

/// Borrowed view over one entry of a record's `files` array
#[derive(Debug, Clone, Copy)]
pub struct FileView<'a> {
    doc: &'a Value,
}

impl<'a> FileView<'a> {
    pub fn new(doc: &'a Value) -> Self {
        Self { doc }
    }

    fn str_field(&self, key: &str) -> &'a str {
        self.doc.get(key).and_then(Value::as_str).unwrap_or("")
    }

    /// `filename` (legacy API) or `key` (current API)
    pub fn name(&self) -> &'a str {
        let name = self.str_field("filename");
        if name.is_empty() {
            self.str_field("key")
        } else {
            name
        }
    }

    pub fn size(&self) -> u64 {
        self.doc.get("size").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn checksum(&self) -> &'a str {
        self.str_field("checksum")
    }

    pub fn file_type(&self) -> &'a str {
        self.str_field("type")
    }

    pub fn mime_type(&self) -> &'a str {
        self.str_field("mime_type")
    }

    /// `links.download`, else `links.self`
    pub fn download_url(&self) -> &'a str {
        let links = self.doc.get("links");
        links
            .and_then(|l| l.get("download"))
            .or_else(|| links.and_then(|l| l.get("self")))
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Lowercased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        let name = self.name();
        name.rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }
}
