//! Tabula Domain Layer
//!
//! Core state and rules for the extraction workflow. Nothing in this crate
//! performs I/O: the remote extraction service is reached through
//! `tabula-sdk`, and the orchestration that ties the two together lives in
//! `tabula-workflow`.
//!
//! ## Key Concepts
//!
//! - **Schema draft**: ordered field definitions being edited, frozen once committed
//! - **Validation gate**: pure checks run before any network call
//! - **Workflow state**: the schema → processing → results step sequencer
//! - **Result set**: extracted records plus the derived column order
//! - **Loading flags**: one in-flight slot per remote operation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod draft;
pub mod field;
pub mod loading;
pub mod results;
pub mod validation;
pub mod workflow;

// Re-exports for convenience
pub use draft::{DraftError, SchemaDraft};
pub use field::{FieldAttribute, FieldDefinition, SchemaDefinition, TypeTag};
pub use loading::{LoadingFlags, LoadingGuard, LoadingSnapshot, OperationKind};
pub use results::{ColumnPolicy, Record, ResultSet};
pub use validation::{
    validate_export, validate_processing_request, validate_schema, DuplicateFieldNames,
    ProcessingRequest, ValidationError, ValidationErrors, ValidationPolicy,
};
pub use workflow::{CompiledSchemaHandle, PreconditionError, WorkflowState, WorkflowStep};
