//! API endpoint groups.

pub mod records;

pub use records::{RecordsApi, SearchPage, DEFAULT_SORT};
