//! Side-effect descriptions returned by workflow operations
//!
//! Operations never print, navigate or write files themselves. They return
//! an [`OperationReport`] and the presentation layer decides how to render
//! each [`Effect`].

use crate::error::WorkflowError;
use std::fmt;
use tabula_domain::{OperationKind, WorkflowStep};

/// File name used for exported results
pub const EXPORT_FILE_NAME: &str = "results.csv";

/// Content type of exported results
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
    /// Informational
    Info,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: Level,
    /// Human-readable text
    pub message: String,
}

impl Notification {
    /// Success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    /// Error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    /// Informational notification
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A file to hand to the user
#[derive(Clone, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl Download {
    /// Exported CSV results
    pub fn csv(bytes: Vec<u8>) -> Self {
        Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            content_type: EXPORT_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

impl fmt::Debug for Download {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a message
    Notify(Notification),
    /// Move the user to a step
    Navigate(WorkflowStep),
    /// Deliver a file
    Download(Download),
}

/// Outcome of one operation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct OperationReport {
    /// Operation attempted
    pub kind: OperationKind,
    /// Effects to render, in order
    pub effects: Vec<Effect>,
    /// Failure, if the attempt did not succeed
    pub error: Option<WorkflowError>,
    /// The result arrived after the call was superseded and was not applied
    pub discarded: bool,
}

impl OperationReport {
    /// Successful attempt with no effects yet
    pub fn success(kind: OperationKind) -> Self {
        Self {
            kind,
            effects: Vec::new(),
            error: None,
            discarded: false,
        }
    }

    /// Failed attempt, carrying an error notification
    pub fn failure(kind: OperationKind, error: WorkflowError) -> Self {
        Self {
            kind,
            effects: vec![Effect::Notify(Notification::error(error.to_string()))],
            error: Some(error),
            discarded: false,
        }
    }

    /// Superseded attempt whose outcome was dropped
    pub fn discarded(kind: OperationKind) -> Self {
        Self {
            kind,
            effects: Vec::new(),
            error: None,
            discarded: true,
        }
    }

    /// Append an effect
    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the outcome was applied successfully
    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.discarded
    }

    /// Notifications in order
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Notify(notification) => Some(notification),
            _ => None,
        })
    }

    /// Notification texts in order
    pub fn messages(&self) -> Vec<&str> {
        self.notifications().map(|n| n.message.as_str()).collect()
    }

    /// Requested navigation, if any
    pub fn navigation(&self) -> Option<WorkflowStep> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Navigate(step) => Some(*step),
            _ => None,
        })
    }

    /// Delivered file, if any
    pub fn download(&self) -> Option<&Download> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Download(download) => Some(download),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_domain::PreconditionError;

    #[test]
    fn test_failure_report_notifies() {
        let report = OperationReport::failure(
            OperationKind::Process,
            PreconditionError::SchemaRequired.into(),
        );
        assert!(!report.is_success());
        assert_eq!(report.messages(), vec!["Please create schema first"]);
        assert_eq!(
            report.notifications().next().map(|n| n.level),
            Some(Level::Error)
        );
    }

    #[test]
    fn test_report_accessors() {
        let report = OperationReport::success(OperationKind::Export)
            .with(Effect::Notify(Notification::success("done")))
            .with(Effect::Download(Download::csv(b"a\r\n1\r\n".to_vec())));

        assert!(report.is_success());
        assert!(report.navigation().is_none());
        let download = report.download().unwrap();
        assert_eq!(download.file_name, "results.csv");
        assert_eq!(download.content_type, "text/csv");
    }

    #[test]
    fn test_discarded_is_not_success() {
        let report = OperationReport::discarded(OperationKind::Schema);
        assert!(!report.is_success());
        assert!(report.effects.is_empty());
    }

    #[test]
    fn test_download_debug_omits_bytes() {
        let rendered = format!("{:?}", Download::csv(vec![0; 4096]));
        assert!(rendered.contains("len: 4096"));
    }
}
