//! Error taxonomy for workflow operations.

use tabula_domain::{PreconditionError, ValidationError, ValidationErrors};
use tabula_sdk::SdkError;
use thiserror::Error;

/// Why an operation did not complete
///
/// No variant is fatal: every failure leaves the session interactive and
/// the operation can be re-initiated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    /// Rejected locally before any network call
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Invoked out of the allowed step order
    #[error("{0}")]
    Precondition(#[from] PreconditionError),

    /// Network unreachable or malformed response
    #[error("{0}")]
    Transport(String),

    /// Well-formed error response from the service
    #[error("{0}")]
    Service(String),
}

impl WorkflowError {
    /// Locally detected (validation or precondition) rather than remote
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_) | WorkflowError::Precondition(_)
        )
    }
}

impl From<ValidationError> for WorkflowError {
    fn from(error: ValidationError) -> Self {
        WorkflowError::Validation(error.into())
    }
}

impl From<SdkError> for WorkflowError {
    fn from(error: SdkError) -> Self {
        match error {
            SdkError::Service { message, .. } => WorkflowError::Service(message),
            other => WorkflowError::Transport(other.to_string()),
        }
    }
}
