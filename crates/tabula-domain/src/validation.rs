//! Validation gate - pure pre-flight checks run before any network call

use crate::draft::SchemaDraft;
use crate::field::TypeTag;
use crate::results::ResultSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// A locally detected problem; never sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Class name is empty or whitespace
    #[error("Class name is required")]
    EmptyClassName,

    /// Draft has no fields at all
    #[error("Schema must contain at least one field")]
    NoFields,

    /// A field has no name
    #[error("Field {} is missing a name", .index + 1)]
    EmptyFieldName {
        /// Zero-based field position
        index: usize,
    },

    /// A field has no description
    #[error("Field {} is missing a description", .index + 1)]
    EmptyFieldDescription {
        /// Zero-based field position
        index: usize,
    },

    /// A field type is outside the accepted enumeration
    #[error("Field {} has unsupported type '{type_name}'", .index + 1)]
    UnknownFieldType {
        /// Zero-based field position
        index: usize,
        /// The rejected spelling
        type_name: String,
    },

    /// Two fields share a name while duplicates are rejected
    #[error("Field name '{name}' is used more than once")]
    DuplicateFieldName {
        /// The repeated name
        name: String,
    },

    /// Text to process is empty or whitespace
    #[error("Please enter text to process")]
    EmptyText,

    /// Chunk size must be positive
    #[error("Chunk size must be greater than 0 (got {0})")]
    NonPositiveChunkSize(i64),

    /// Chunk overlap must not be negative
    #[error("Chunk overlap must not be negative (got {0})")]
    NegativeChunkOverlap(i64),

    /// Chunk overlap must be strictly smaller than chunk size
    #[error("Chunk overlap ({overlap}) must be smaller than chunk size ({size})")]
    OverlapTooLarge {
        /// Requested overlap
        overlap: i64,
        /// Requested chunk size
        size: i64,
    },

    /// Nothing to export
    #[error("No results to export")]
    NoResults,
}

/// Every violation found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Violations in detection order
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Whether a specific violation was reported
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        ValidationErrors(vec![error])
    }
}

/// How repeated field names are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateFieldNames {
    /// Accept duplicates; the service decides what they mean
    #[default]
    Allow,
    /// Report every repeated name
    Reject,
}

/// Tunable validation rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Duplicate field name handling
    pub duplicate_field_names: DuplicateFieldNames,
}

impl ValidationPolicy {
    /// Policy that also rejects duplicate field names
    pub fn strict() -> Self {
        Self {
            duplicate_field_names: DuplicateFieldNames::Reject,
        }
    }
}

/// Text plus chunking parameters submitted for extraction
///
/// Sizes are signed so that out-of-range user input stays representable
/// and can be reported instead of rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingRequest {
    /// Raw input text
    pub text: String,
    /// Window size in characters
    pub chunk_size: i64,
    /// Characters shared between consecutive windows
    pub chunk_overlap: i64,
}

impl ProcessingRequest {
    /// Create a processing request
    pub fn new(text: impl Into<String>, chunk_size: i64, chunk_overlap: i64) -> Self {
        Self {
            text: text.into(),
            chunk_size,
            chunk_overlap,
        }
    }
}

/// Check a draft before schema creation, collecting every violation
pub fn validate_schema(
    draft: &SchemaDraft,
    policy: &ValidationPolicy,
) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if draft.class_name().trim().is_empty() {
        errors.push(ValidationError::EmptyClassName);
    }
    if draft.is_empty() {
        errors.push(ValidationError::NoFields);
    }

    for (index, field) in draft.fields().iter().enumerate() {
        if field.name.trim().is_empty() {
            errors.push(ValidationError::EmptyFieldName { index });
        }
        if TypeTag::parse(&field.field_type).is_none() {
            errors.push(ValidationError::UnknownFieldType {
                index,
                type_name: field.field_type.clone(),
            });
        }
        if field.description.trim().is_empty() {
            errors.push(ValidationError::EmptyFieldDescription { index });
        }
    }

    if policy.duplicate_field_names == DuplicateFieldNames::Reject {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for field in draft.fields() {
            let name = field.name.trim();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name) && reported.insert(name) {
                errors.push(ValidationError::DuplicateFieldName {
                    name: name.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Check text and chunking parameters before processing
pub fn validate_processing_request(request: &ProcessingRequest) -> Result<(), ValidationError> {
    if request.text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    if request.chunk_size <= 0 {
        return Err(ValidationError::NonPositiveChunkSize(request.chunk_size));
    }
    if request.chunk_overlap < 0 {
        return Err(ValidationError::NegativeChunkOverlap(request.chunk_overlap));
    }
    if request.chunk_overlap >= request.chunk_size {
        return Err(ValidationError::OverlapTooLarge {
            overlap: request.chunk_overlap,
            size: request.chunk_size,
        });
    }
    Ok(())
}

/// Check that there is something to export
pub fn validate_export(results: &ResultSet) -> Result<(), ValidationError> {
    if results.is_empty() {
        Err(ValidationError::NoResults)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use proptest::prelude::*;

    fn draft(fields: &[(&str, &str, &str)]) -> SchemaDraft {
        SchemaDraft::new(
            "X",
            fields
                .iter()
                .map(|(n, t, d)| FieldDefinition::new(*n, *t, *d))
                .collect(),
        )
    }

    #[test]
    fn test_valid_schema() {
        let draft = draft(&[("name", "str", "d"), ("age", "int", "d2")]);
        assert!(validate_schema(&draft, &ValidationPolicy::default()).is_ok());
    }

    #[test]
    fn test_seeded_schema_is_valid() {
        assert!(validate_schema(&SchemaDraft::seeded(), &ValidationPolicy::default()).is_ok());
    }

    #[test]
    fn test_schema_collects_all_violations() {
        let mut draft = draft(&[("", "str", "d"), ("age", "integer", "")]);
        draft.set_class_name("  ").unwrap();

        let errors = validate_schema(&draft, &ValidationPolicy::default()).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[
                ValidationError::EmptyClassName,
                ValidationError::EmptyFieldName { index: 0 },
                ValidationError::UnknownFieldType {
                    index: 1,
                    type_name: "integer".to_string()
                },
                ValidationError::EmptyFieldDescription { index: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_draft_rejected() {
        let draft = SchemaDraft::new("X", vec![]);
        let errors = validate_schema(&draft, &ValidationPolicy::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::NoFields));
    }

    #[test]
    fn test_duplicates_allowed_by_default() {
        let draft = draft(&[("a", "str", "d"), ("a", "int", "d")]);
        assert!(validate_schema(&draft, &ValidationPolicy::default()).is_ok());
    }

    #[test]
    fn test_duplicates_rejected_by_strict_policy() {
        let draft = draft(&[("a", "str", "d"), ("a", "int", "d"), ("a", "bool", "d")]);
        let errors = validate_schema(&draft, &ValidationPolicy::strict()).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::DuplicateFieldName { name: "a".to_string() }]
        );
    }

    #[test]
    fn test_overlap_not_smaller_than_size() {
        let request = ProcessingRequest::new("hello", 100, 150);
        assert_eq!(
            validate_processing_request(&request),
            Err(ValidationError::OverlapTooLarge { overlap: 150, size: 100 })
        );
    }

    #[test]
    fn test_whitespace_text_rejected() {
        let request = ProcessingRequest::new(" \n\t", 100, 10);
        assert_eq!(validate_processing_request(&request), Err(ValidationError::EmptyText));
    }

    #[test]
    fn test_export_requires_results() {
        assert_eq!(validate_export(&ResultSet::new()), Err(ValidationError::NoResults));
    }

    proptest! {
        /// Property: the gate rejects exactly the four documented conditions
        #[test]
        fn test_processing_gate_is_exact(
            text in "[ a-z\n]{0,12}",
            chunk_size in -50i64..200,
            chunk_overlap in -50i64..250,
        ) {
            let request = ProcessingRequest::new(text.clone(), chunk_size, chunk_overlap);
            let should_reject = text.trim().is_empty()
                || chunk_size <= 0
                || chunk_overlap < 0
                || chunk_overlap >= chunk_size;
            let first = validate_processing_request(&request);
            prop_assert_eq!(first.is_err(), should_reject);
            // Re-validating an unchanged request gives the same verdict
            prop_assert_eq!(validate_processing_request(&request), first);
        }
    }
}
