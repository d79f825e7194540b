//! Wire types for the extraction service API.

use serde::{Deserialize, Serialize};
use tabula_domain::{ProcessingRequest, Record, SchemaDraft};

/// Body of `POST /api/create-schema`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSchemaRequest {
    /// Ordered `[name, type, description]` triples
    pub field_definitions: Vec<[String; 3]>,
    /// Record class name
    pub class_name: String,
}

impl CreateSchemaRequest {
    /// Build the request from a draft, keeping field order
    pub fn from_draft(draft: &SchemaDraft) -> Self {
        Self {
            field_definitions: draft.as_triples(),
            class_name: draft.class_name().to_string(),
        }
    }
}

/// Success body of `POST /api/create-schema`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSchemaResponse {
    /// Generated record model source
    pub model_code: String,
    /// Generated list wrapper source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper_code: Option<String>,
    /// Human-readable confirmation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/process-data`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDataRequest {
    /// Raw input text
    pub text: String,
    /// Window size in characters
    pub chunk_size: i64,
    /// Characters shared between consecutive windows
    pub chunk_overlap: i64,
}

impl From<&ProcessingRequest> for ProcessDataRequest {
    fn from(request: &ProcessingRequest) -> Self {
        Self {
            text: request.text.clone(),
            chunk_size: request.chunk_size,
            chunk_overlap: request.chunk_overlap,
        }
    }
}

/// Success body of `POST /api/process-data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDataResponse {
    /// Extracted records, flattened across chunks
    pub results: Vec<Record>,
    /// Record count as reported by the service
    pub total_items: u64,
}

/// Body of `POST /api/export-csv`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportCsvRequest {
    /// Records to export
    pub data: Vec<Record>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Service status, `"healthy"` when up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Extraction model the service is configured with
    #[serde(default)]
    pub model: Option<String>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_domain::FieldDefinition;

    #[test]
    fn test_create_schema_request_shape() {
        let draft = SchemaDraft::new(
            "X",
            vec![
                FieldDefinition::new("name", "str", "d"),
                FieldDefinition::new("age", "int", "d2"),
            ],
        );
        let body = serde_json::to_value(CreateSchemaRequest::from_draft(&draft)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "field_definitions": [["name", "str", "d"], ["age", "int", "d2"]],
                "class_name": "X"
            })
        );
    }

    #[test]
    fn test_create_schema_response_parsing() {
        let json = r#"{
            "status": "success",
            "model_code": "class X(BaseModel):\n    original: str",
            "wrapper_code": "class Final_data(BaseModel): ...",
            "message": "Schema created successfully and model initialized"
        }"#;

        let response: CreateSchemaResponse = serde_json::from_str(json).unwrap();
        assert!(response.model_code.starts_with("class X"));
        assert!(response.wrapper_code.is_some());
    }

    #[test]
    fn test_process_response_preserves_key_order() {
        let json = r#"{"status": "success", "results": [{"z": 1, "a": "x"}], "total_items": 1}"#;
        let response: ProcessDataResponse = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = response.results[0].keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(response.total_items, 1);
    }

    #[test]
    fn test_health_parsing() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "healthy", "model": "gemini-2.0-flash"}"#).unwrap();
        assert_eq!(health.model.as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_error_body_without_error_field() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "x"}"#).unwrap();
        assert!(body.error.is_none());
    }
}
