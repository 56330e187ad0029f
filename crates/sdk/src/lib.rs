//! # Zenodo SDK
//!
//! Async client for the Zenodo REST API, used by the tool server as its
//! single outbound collaborator.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zenodo_sdk::{ZenodoClient, ZenodoResult};
//!
//! #[tokio::main]
//! async fn main() -> ZenodoResult<()> {
//!     let client = ZenodoClient::builder()
//!         .sandbox(true)
//!         .api_token("your-token")
//!         .build()?;
//!
//!     let record = client.records().get("1234567").await?;
//!     println!("{}", record["metadata"]["title"]);
//!
//!     let page = client.records().search("climate", 10, None).await?;
//!     println!("Found {} records", page.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! With the `testing` feature enabled, [`testing::MockUpstream`] serves
//! canned documents through the same [`Upstream`] trait the HTTP transport
//! implements.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod upstream;

pub use api::{SearchPage, DEFAULT_SORT};
pub use client::{ZenodoClient, ZenodoClientBuilder};
pub use config::{ClientConfig, RetryConfig};
pub use error::{ZenodoError, ZenodoResult};
pub use transport::HttpTransport;
pub use upstream::{Method, Query, Upstream};
