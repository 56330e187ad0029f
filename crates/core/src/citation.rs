// Citation rendering for Zenodo records

use crate::error::CoreError;
use crate::record::RecordView;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationFormat {
    Bibtex,
    Apa,
}

impl CitationFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bibtex => "bibtex",
            Self::Apa => "apa",
        }
    }

    /// Separator placed between author names
    pub fn author_separator(self) -> &'static str {
        match self {
            Self::Bibtex => " and ",
            Self::Apa => ", ",
        }
    }
}

impl FromStr for CitationFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bibtex" => Ok(Self::Bibtex),
            "apa" => Ok(Self::Apa),
            _ => Err(CoreError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Year component of a publication date (`2021-06-15` -> `2021`)
pub fn publication_year(date: &str) -> String {
    let date = date.trim();
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.year().to_string();
    }
    date.split('-').next().unwrap_or("").to_string()
}

pub fn format_authors(creators: &[String], format: CitationFormat) -> String {
    creators.join(format.author_separator())
}

pub fn format_citation(record_id: &str, record: &RecordView<'_>, format: CitationFormat) -> String {
    let authors = format_authors(&record.creators(), format);
    let year = publication_year(record.publication_date());
    let title = record.title();
    let doi = record.doi();

    match format {
        CitationFormat::Bibtex => format!(
            "@misc{{{record_id},\n  author = {{{authors}}},\n  title = {{{title}}},\n  year = {{{year}}},\n  publisher = {{Zenodo}},\n  doi = {{{doi}}}\n}}"
        ),
        CitationFormat::Apa => {
            format!("{authors} ({year}). {title}. Zenodo. https://doi.org/{doi}")
        }
    }
}
