//! Tabula Rust SDK
//!
//! Client library for the remote extraction service: schema compilation,
//! chunked text extraction and CSV export over HTTP/JSON.
//!
//! # Example
//!
//! ```no_run
//! use tabula_domain::SchemaDraft;
//! use tabula_sdk::{CreateSchemaRequest, ExtractionClient, ExtractionService};
//!
//! # async fn example() -> Result<(), tabula_sdk::SdkError> {
//! let client = ExtractionClient::new("http://localhost:5000")?;
//!
//! let request = CreateSchemaRequest::from_draft(&SchemaDraft::seeded());
//! let compiled = client.create_schema(&request).await?;
//! println!("{}", compiled.model_code);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod error;
pub mod mock;
mod protocol;
mod service;

pub use client::{ExtractionClient, DEFAULT_TIMEOUT_SECS};
pub use error::SdkError;
pub use mock::{CallCounts, MockService};
pub use protocol::{
    CreateSchemaRequest, CreateSchemaResponse, ErrorBody, ExportCsvRequest, HealthStatus,
    ProcessDataRequest, ProcessDataResponse,
};
pub use service::ExtractionService;
