//! Integration tests for the HTTP client against an in-process stub service

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tabula_domain::{FieldDefinition, SchemaDraft};
use tabula_sdk::{
    CreateSchemaRequest, ExportCsvRequest, ExtractionClient, ExtractionService,
    ProcessDataRequest, SdkError,
};
use tokio::net::TcpListener;

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "model": "stub-model"}))
}

async fn create_schema(Json(body): Json<Value>) -> impl IntoResponse {
    let class_name = body["class_name"].as_str().unwrap_or_default().to_string();
    let fields = body["field_definitions"].as_array().cloned().unwrap_or_default();

    if class_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "class_name required"})),
        );
    }
    if fields.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No field definitions provided"})),
        );
    }

    let mut lines = vec![format!("class {}(BaseModel):", class_name)];
    for field in &fields {
        lines.push(format!(
            "    {}: {} = Field(default=None, description=\"{}\")",
            field[0].as_str().unwrap_or_default(),
            field[1].as_str().unwrap_or_default(),
            field[2].as_str().unwrap_or_default()
        ));
    }

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "model_code": lines.join("\n"),
            "wrapper_code": format!("class Final_data(BaseModel):\n    list_data: List[{}]", class_name),
            "message": "Schema created successfully and model initialized"
        })),
    )
}

async fn process_data(Json(body): Json<Value>) -> impl IntoResponse {
    let text = body["text"].as_str().unwrap_or_default();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No text data provided"})),
        );
    }
    if text == "garbled" {
        return (StatusCode::OK, Json(json!({"unexpected": true})));
    }
    let results: Vec<Value> = text
        .split_whitespace()
        .map(|word| json!({"word": word, "length": word.len()}))
        .collect();
    let total = results.len();
    (
        StatusCode::OK,
        Json(json!({"status": "success", "results": results, "total_items": total})),
    )
}

async fn export_csv(Json(body): Json<Value>) -> axum::response::Response {
    let data = body["data"].as_array().cloned().unwrap_or_default();
    if data.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No data provided for export"})),
        )
            .into_response();
    }
    if data[0].get("explode").is_some() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>").into_response();
    }
    let Some(first) = data[0].as_object() else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Bad record"}))).into_response();
    };
    let columns: Vec<String> = first.keys().cloned().collect();
    let mut csv = columns.join(",");
    csv.push_str("\r\n");
    for row in &data {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| match &row[c] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        csv.push_str(&cells.join(","));
        csv.push_str("\r\n");
    }
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=results.csv"),
        ],
        csv,
    )
        .into_response()
}

/// Spawn the stub service on an ephemeral port
async fn spawn_stub() -> SocketAddr {
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/create-schema", post(create_schema))
        .route("/api/process-data", post(process_data))
        .route("/api/export-csv", post(export_csv));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ExtractionClient {
    ExtractionClient::new(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn test_health() {
    let client = client_for(spawn_stub().await);
    let health = client.health().await.unwrap();
    assert_eq!(health.model.as_deref(), Some("stub-model"));
}

#[tokio::test]
async fn test_create_schema_sends_ordered_triples() {
    let client = client_for(spawn_stub().await);
    let draft = SchemaDraft::new(
        "X",
        vec![
            FieldDefinition::new("name", "str", "d"),
            FieldDefinition::new("age", "int", "d2"),
        ],
    );

    let response = client
        .create_schema(&CreateSchemaRequest::from_draft(&draft))
        .await
        .unwrap();

    let name_at = response.model_code.find("name: str").unwrap();
    let age_at = response.model_code.find("age: int").unwrap();
    assert!(name_at < age_at);
    assert!(response.wrapper_code.unwrap().contains("List[X]"));
}

#[tokio::test]
async fn test_create_schema_service_error() {
    let client = client_for(spawn_stub().await);
    let request = CreateSchemaRequest {
        field_definitions: vec![["a".into(), "str".into(), "d".into()]],
        class_name: String::new(),
    };

    let err = client.create_schema(&request).await.unwrap_err();
    assert_eq!(
        err,
        SdkError::Service {
            status: 400,
            message: "class_name required".to_string()
        }
    );
}

#[tokio::test]
async fn test_process_data() {
    let client = client_for(spawn_stub().await);
    let response = client
        .process_data(&ProcessDataRequest {
            text: "alpha beta".to_string(),
            chunk_size: 1000,
            chunk_overlap: 100,
        })
        .await
        .unwrap();

    assert_eq!(response.total_items, 2);
    let keys: Vec<_> = response.results[0].keys().cloned().collect();
    assert_eq!(keys, vec!["word", "length"]);
}

#[tokio::test]
async fn test_process_data_malformed_body() {
    let client = client_for(spawn_stub().await);
    let err = client
        .process_data(&ProcessDataRequest {
            text: "garbled".to_string(),
            chunk_size: 1000,
            chunk_overlap: 100,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_export_csv_returns_bytes() {
    let client = client_for(spawn_stub().await);
    let record = json!({"a": 1, "b": "x"}).as_object().cloned().unwrap();

    let bytes = client
        .export_csv(&ExportCsvRequest { data: vec![record] })
        .await
        .unwrap();

    assert_eq!(String::from_utf8(bytes).unwrap(), "a,b\r\n1,x\r\n");
}

#[tokio::test]
async fn test_export_csv_error_body() {
    let client = client_for(spawn_stub().await);
    let err = client
        .export_csv(&ExportCsvRequest { data: vec![] })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No data provided for export");
}

#[tokio::test]
async fn test_export_csv_non_json_error_falls_back() {
    let client = client_for(spawn_stub().await);
    let record = json!({"explode": true}).as_object().cloned().unwrap();

    let err = client
        .export_csv(&ExportCsvRequest { data: vec![record] })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SdkError::Service {
            status: 500,
            message: "Failed to export data".to_string()
        }
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to obtain a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr).health().await.unwrap_err();
    assert!(matches!(err, SdkError::Connection(_)));
}
