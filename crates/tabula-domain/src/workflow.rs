//! Workflow state - the schema → processing → results step sequencer

use crate::loading::OperationKind;
use std::fmt;
use thiserror::Error;

/// A step of the extraction workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowStep {
    /// Editing the schema draft (initial)
    SchemaAuthoring,
    /// Schema committed; entering text and chunking parameters
    Processing,
    /// Extracted records available for inspection and export
    Results,
}

impl WorkflowStep {
    /// Get the step name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::SchemaAuthoring => "schema",
            WorkflowStep::Processing => "process",
            WorkflowStep::Results => "results",
        }
    }

    /// Parse a step name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "schema" | "schema-authoring" => Some(WorkflowStep::SchemaAuthoring),
            "process" | "processing" => Some(WorkflowStep::Processing),
            "results" => Some(WorkflowStep::Results),
            _ => None,
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-side confirmation that a schema was accepted
///
/// The generated source is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSchemaHandle {
    /// Class name the schema was compiled under
    pub class_name: String,
    /// Generated record model source
    pub model_code: String,
    /// Generated list wrapper source, if the service returned one
    pub wrapper_code: Option<String>,
}

/// An operation was invoked out of the allowed order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// Processing requires a committed schema
    #[error("Please create schema first")]
    SchemaRequired,

    /// The schema has already been committed this session
    #[error("Schema has already been created")]
    SchemaAlreadyCreated,

    /// The same operation is still running
    #[error("A {0} request is already in progress")]
    AlreadyInFlight(OperationKind),

    /// The requested step is not available yet
    #[error("The {0} step is not available yet")]
    StepUnavailable(WorkflowStep),
}

/// Current step plus the facts that gate later steps
///
/// Transitions never skip a step: `Processing` requires a compiled schema
/// handle, `Results` requires a prior successful processing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    step: WorkflowStep,
    compiled: Option<CompiledSchemaHandle>,
    has_results: bool,
}

impl WorkflowState {
    /// Fresh state at [`WorkflowStep::SchemaAuthoring`]
    pub fn new() -> Self {
        Self {
            step: WorkflowStep::SchemaAuthoring,
            compiled: None,
            has_results: false,
        }
    }

    /// Current step
    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    /// Compiled schema handle, once committed
    pub fn compiled(&self) -> Option<&CompiledSchemaHandle> {
        self.compiled.as_ref()
    }

    /// Whether a processing call has succeeded this session
    pub fn has_results(&self) -> bool {
        self.has_results
    }

    /// Whether a step can be navigated to
    pub fn is_available(&self, step: WorkflowStep) -> bool {
        match step {
            WorkflowStep::SchemaAuthoring => true,
            WorkflowStep::Processing => self.compiled.is_some(),
            WorkflowStep::Results => self.compiled.is_some() && self.has_results,
        }
    }

    /// User navigation between available steps
    pub fn select(&mut self, step: WorkflowStep) -> Result<(), PreconditionError> {
        if !self.is_available(step) {
            return Err(PreconditionError::StepUnavailable(step));
        }
        self.step = step;
        Ok(())
    }

    /// Record a successful schema creation and advance to processing
    pub fn commit_schema(&mut self, handle: CompiledSchemaHandle) {
        self.compiled = Some(handle);
        self.step = WorkflowStep::Processing;
    }

    /// Record a successful processing call and advance to results
    ///
    /// Refused without a compiled schema, so `Results` stays unreachable.
    pub fn results_ready(&mut self) -> Result<(), PreconditionError> {
        if self.compiled.is_none() {
            return Err(PreconditionError::SchemaRequired);
        }
        self.has_results = true;
        self.step = WorkflowStep::Results;
        Ok(())
    }

    /// Return the handle, or roll back to schema authoring when it is missing
    pub fn require_schema(&mut self) -> Result<&CompiledSchemaHandle, PreconditionError> {
        if self.compiled.is_none() {
            self.step = WorkflowStep::SchemaAuthoring;
        }
        self.compiled.as_ref().ok_or(PreconditionError::SchemaRequired)
    }

    /// Back to the initial step, forgetting the handle and results
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}
