//! Transport layer for the Zenodo SDK.

pub mod http;

pub use http::HttpTransport;
