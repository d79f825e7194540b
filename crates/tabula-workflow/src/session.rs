//! Workflow session - the explicit state container
//!
//! Holds everything one user session owns: the schema draft, the step
//! sequencer, the result set, the loading flags and the pending
//! processing input. Nothing here performs I/O. Every remote operation is
//! split in two:
//!
//! 1. `begin_*` checks preconditions, runs the validation gate, acquires
//!    the loading flag and returns a [`Ticket`] carrying the wire request.
//! 2. `finish_*` takes the ticket back together with the service outcome,
//!    applies it unless the call was superseded in the meantime, and
//!    returns an [`OperationReport`].
//!
//! The loading flag is owned by the ticket, so it is cleared whenever the
//! ticket is dropped, whichever way the call ended.

use crate::effect::{Download, Effect, Notification, OperationReport};
use crate::error::WorkflowError;
use tabula_domain::{
    validate_export, validate_processing_request, validate_schema, ColumnPolicy,
    CompiledSchemaHandle, DraftError, LoadingFlags, LoadingGuard, LoadingSnapshot, OperationKind,
    PreconditionError, ProcessingRequest, ResultSet, SchemaDraft, SchemaDefinition,
    ValidationPolicy, WorkflowState, WorkflowStep,
};
use tabula_sdk::{
    CreateSchemaRequest, CreateSchemaResponse, ExportCsvRequest, ProcessDataRequest,
    ProcessDataResponse, SdkError,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default chunk window in characters
pub const DEFAULT_CHUNK_SIZE: i64 = 1000;

/// Default overlap between consecutive chunks
pub const DEFAULT_CHUNK_OVERLAP: i64 = 100;

/// Tunables fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Schema validation rules
    pub validation: ValidationPolicy,
    /// Column derivation for results
    pub columns: ColumnPolicy,
    /// Initial chunk size
    pub chunk_size: i64,
    /// Initial chunk overlap
    pub chunk_overlap: i64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::default(),
            columns: ColumnPolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// An admitted operation: the wire request plus ownership of its loading flag
#[derive(Debug)]
pub struct Ticket<R> {
    request: R,
    guard: LoadingGuard,
}

impl<R> Ticket<R> {
    /// Request to send
    pub fn request(&self) -> &R {
        &self.request
    }

    /// Operation this ticket admits
    pub fn kind(&self) -> OperationKind {
        self.guard.kind()
    }

    /// Acquisition number of the loading flag
    pub fn epoch(&self) -> u64 {
        self.guard.epoch()
    }

    /// False once the call was cancelled or the session reset
    pub fn is_current(&self) -> bool {
        self.guard.is_current()
    }
}

/// State of one workflow session
#[derive(Debug)]
pub struct WorkflowSession {
    id: Uuid,
    options: SessionOptions,
    draft: SchemaDraft,
    state: WorkflowState,
    results: ResultSet,
    loading: LoadingFlags,
    text: String,
    chunk_size: i64,
    chunk_overlap: i64,
}

impl WorkflowSession {
    /// Fresh session with the seeded draft and default options
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    /// Fresh session with explicit options
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            id: Uuid::now_v7(),
            options,
            draft: SchemaDraft::seeded(),
            state: WorkflowState::new(),
            results: ResultSet::with_policy(options.columns),
            loading: LoadingFlags::new(),
            text: String::new(),
            chunk_size: options.chunk_size,
            chunk_overlap: options.chunk_overlap,
        }
    }

    /// Session identifier, used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Options the session was created with
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Schema draft
    pub fn draft(&self) -> &SchemaDraft {
        &self.draft
    }

    /// Schema draft for editing; refuses every mutation once frozen
    pub fn draft_mut(&mut self) -> &mut SchemaDraft {
        &mut self.draft
    }

    /// Replace the whole draft, e.g. from a schema file
    pub fn load_draft(&mut self, definition: SchemaDefinition) -> Result<(), DraftError> {
        if self.draft.is_frozen() {
            return Err(DraftError::Frozen);
        }
        self.draft = SchemaDraft::from(definition);
        Ok(())
    }

    /// Step sequencer
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Current step
    pub fn step(&self) -> WorkflowStep {
        self.state.step()
    }

    /// Navigate to an available step
    pub fn select_step(&mut self, step: WorkflowStep) -> Result<(), PreconditionError> {
        self.state.select(step)
    }

    /// Extracted records
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// In-flight flags
    pub fn loading(&self) -> LoadingSnapshot {
        self.loading.snapshot()
    }

    /// Pending input text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the pending input text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Pending chunk size
    pub fn chunk_size(&self) -> i64 {
        self.chunk_size
    }

    /// Pending chunk overlap
    pub fn chunk_overlap(&self) -> i64 {
        self.chunk_overlap
    }

    /// Set the pending chunking parameters; checked when processing starts
    pub fn set_chunking(&mut self, chunk_size: i64, chunk_overlap: i64) {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
    }

    /// Set text and chunking parameters at once
    pub fn set_processing_input(&mut self, request: ProcessingRequest) {
        self.text = request.text;
        self.chunk_size = request.chunk_size;
        self.chunk_overlap = request.chunk_overlap;
    }

    /// Processing request built from the pending input
    pub fn processing_request(&self) -> ProcessingRequest {
        ProcessingRequest::new(self.text.clone(), self.chunk_size, self.chunk_overlap)
    }

    fn ensure_idle(&self, kind: OperationKind) -> Result<(), PreconditionError> {
        if self.loading.is_loading(kind) {
            return Err(PreconditionError::AlreadyInFlight(kind));
        }
        Ok(())
    }

    fn admit<R>(&self, kind: OperationKind, request: R) -> Result<Ticket<R>, WorkflowError> {
        let guard = self
            .loading
            .acquire(kind)
            .ok_or(PreconditionError::AlreadyInFlight(kind))?;
        debug!(session_id = %self.id, %kind, epoch = guard.epoch(), "Operation admitted");
        Ok(Ticket { request, guard })
    }

    /// Admit a schema creation call
    pub fn begin_create_schema(&mut self) -> Result<Ticket<CreateSchemaRequest>, WorkflowError> {
        if self.state.compiled().is_some() || self.draft.is_frozen() {
            return Err(PreconditionError::SchemaAlreadyCreated.into());
        }
        self.ensure_idle(OperationKind::Schema)?;
        validate_schema(&self.draft, &self.options.validation)?;

        self.admit(
            OperationKind::Schema,
            CreateSchemaRequest::from_draft(&self.draft),
        )
    }

    /// Apply a schema creation outcome
    pub fn finish_create_schema(
        &mut self,
        ticket: Ticket<CreateSchemaRequest>,
        outcome: Result<CreateSchemaResponse, SdkError>,
    ) -> OperationReport {
        let kind = OperationKind::Schema;
        if !ticket.is_current() {
            debug!(session_id = %self.id, %kind, "Discarding superseded result");
            return OperationReport::discarded(kind);
        }

        match outcome {
            Ok(response) => {
                self.draft.freeze();
                self.state.commit_schema(CompiledSchemaHandle {
                    class_name: ticket.request.class_name.clone(),
                    model_code: response.model_code,
                    wrapper_code: response.wrapper_code,
                });
                info!(
                    session_id = %self.id,
                    class_name = %ticket.request.class_name,
                    fields = ticket.request.field_definitions.len(),
                    "Schema created"
                );
                OperationReport::success(kind)
                    .with(Effect::Notify(Notification::success(
                        "Schema created successfully",
                    )))
                    .with(Effect::Navigate(WorkflowStep::Processing))
            }
            Err(error) => self.failed(kind, error.into()),
        }
    }

    /// Admit a processing call using the pending input
    ///
    /// Without a compiled schema the session rolls back to schema
    /// authoring and the call is refused.
    pub fn begin_process(&mut self) -> Result<Ticket<ProcessDataRequest>, WorkflowError> {
        self.state.require_schema()?;
        self.ensure_idle(OperationKind::Process)?;

        let request = self.processing_request();
        validate_processing_request(&request)?;

        self.admit(OperationKind::Process, ProcessDataRequest::from(&request))
    }

    /// Apply a processing outcome
    ///
    /// Results are replaced wholesale on success; on failure the previous
    /// results are kept.
    pub fn finish_process(
        &mut self,
        ticket: Ticket<ProcessDataRequest>,
        outcome: Result<ProcessDataResponse, SdkError>,
    ) -> OperationReport {
        let kind = OperationKind::Process;
        if !ticket.is_current() {
            debug!(session_id = %self.id, %kind, "Discarding superseded result");
            return OperationReport::discarded(kind);
        }

        let response = match outcome {
            Ok(response) => response,
            Err(error) => return self.failed(kind, error.into()),
        };

        if let Err(error) = self.state.results_ready() {
            return self.failed(kind, error.into());
        }
        self.results.replace(response.results);

        info!(
            session_id = %self.id,
            records = self.results.len(),
            total_items = response.total_items,
            "Text processed"
        );

        let mut report = OperationReport::success(kind).with(Effect::Notify(
            Notification::success(format!(
                "Processed {} items successfully",
                response.total_items
            )),
        ));

        let heterogeneous = self.results.heterogeneous_rows();
        if !heterogeneous.is_empty() && self.results.policy() == ColumnPolicy::FirstRecord {
            warn!(
                session_id = %self.id,
                rows = heterogeneous.len(),
                "Records do not share the first record's keys"
            );
            report = report.with(Effect::Notify(Notification::info(format!(
                "{} record(s) have keys that differ from the first record; \
                 the extra keys are not shown",
                heterogeneous.len()
            ))));
        }

        report.with(Effect::Navigate(WorkflowStep::Results))
    }

    /// Admit an export of the current results
    pub fn begin_export(&mut self) -> Result<Ticket<ExportCsvRequest>, WorkflowError> {
        self.ensure_idle(OperationKind::Export)?;
        validate_export(&self.results)?;

        self.admit(
            OperationKind::Export,
            ExportCsvRequest {
                data: self.results.records().to_vec(),
            },
        )
    }

    /// Apply an export outcome; never changes the step
    pub fn finish_export(
        &mut self,
        ticket: Ticket<ExportCsvRequest>,
        outcome: Result<Vec<u8>, SdkError>,
    ) -> OperationReport {
        let kind = OperationKind::Export;
        if !ticket.is_current() {
            debug!(session_id = %self.id, %kind, "Discarding superseded result");
            return OperationReport::discarded(kind);
        }

        match outcome {
            Ok(bytes) => {
                info!(
                    session_id = %self.id,
                    records = ticket.request.data.len(),
                    bytes = bytes.len(),
                    "Results exported"
                );
                OperationReport::success(kind)
                    .with(Effect::Notify(Notification::success(
                        "CSV exported successfully",
                    )))
                    .with(Effect::Download(Download::csv(bytes)))
            }
            Err(error) => self.failed(kind, error.into()),
        }
    }

    /// Close a ticket whose call was cancelled before an outcome arrived
    pub fn abandon<R>(&mut self, ticket: Ticket<R>) -> OperationReport {
        let kind = ticket.kind();
        drop(ticket);
        self.withdraw(kind)
    }

    /// Report for an operation cancelled before `begin_*` admitted it
    pub fn withdraw(&mut self, kind: OperationKind) -> OperationReport {
        info!(session_id = %self.id, %kind, "Operation cancelled");
        OperationReport::discarded(kind)
            .with(Effect::Notify(Notification::info(format!("{} request cancelled", kind))))
    }

    /// Report for an operation refused by `begin_*`
    pub fn reject(&mut self, kind: OperationKind, error: WorkflowError) -> OperationReport {
        debug!(session_id = %self.id, %kind, %error, "Operation rejected");
        let rollback = matches!(
            error,
            WorkflowError::Precondition(PreconditionError::SchemaRequired)
        );
        let report = OperationReport::failure(kind, error);
        if rollback {
            report.with(Effect::Navigate(WorkflowStep::SchemaAuthoring))
        } else {
            report
        }
    }

    fn failed(&self, kind: OperationKind, error: WorkflowError) -> OperationReport {
        warn!(session_id = %self.id, %kind, %error, "Operation failed");
        OperationReport::failure(kind, error)
    }

    /// Supersede the in-flight call of `kind`; its result will be discarded
    pub fn cancel(&mut self, kind: OperationKind) -> bool {
        self.loading.release(kind)
    }

    /// Start over: seeded draft, first step, no results, nothing in flight
    ///
    /// Options are kept; a new session id is assigned.
    pub fn reset(&mut self) {
        self.loading.release_all();
        let previous = self.id;

        self.id = Uuid::now_v7();
        self.draft = SchemaDraft::seeded();
        self.state.reset();
        self.results = ResultSet::with_policy(self.options.columns);
        self.text.clear();
        self.chunk_size = self.options.chunk_size;
        self.chunk_overlap = self.options.chunk_overlap;

        info!(session_id = %self.id, %previous, "Session reset");
    }
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self::new()
    }
}
