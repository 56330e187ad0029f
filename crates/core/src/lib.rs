// Core domain logic for the Zenodo tool server
//
// Everything in this crate is pure: records arrive as already-fetched JSON
// documents and leave as scores, reports, or formatted text.

pub mod citation;
pub mod compare;
pub mod data_type;
pub mod error;
pub mod keywords;
pub mod record;
pub mod related;
pub mod similarity;
pub mod summary;

pub use error::{CoreError, CoreResult};
pub use record::{extract_field, FieldValue, RecordView};
