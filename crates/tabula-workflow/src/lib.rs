//! Tabula Workflow
//!
//! Drives the extraction workflow end to end: schema creation, text
//! processing and CSV export against an [`ExtractionService`].
//!
//! [`WorkflowSession`] is the explicit state container. Each operation is
//! split into a pure `begin_*` step (preconditions, validation, loading
//! flag) and a pure `finish_*` step (apply the outcome unless superseded),
//! both returning side-effect descriptions instead of performing them.
//! [`Orchestrator`] performs the network round trip in between.
//!
//! # Examples
//!
//! ```no_run
//! use tabula_sdk::ExtractionClient;
//! use tabula_workflow::Orchestrator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExtractionClient::new("http://localhost:5000")?;
//! let orchestrator = Orchestrator::new(client);
//!
//! let report = orchestrator.create_schema().await;
//! for message in report.messages() {
//!     println!("{}", message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ExtractionService`]: tabula_sdk::ExtractionService

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod effect;
pub mod error;
pub mod orchestrator;
pub mod session;

pub use effect::{
    Download, Effect, Level, Notification, OperationReport, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME,
};
pub use error::WorkflowError;
pub use orchestrator::{OperationHandle, Orchestrator};
pub use session::{
    SessionOptions, Ticket, WorkflowSession, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
