//! HTTP client for the extraction service.

use crate::error::SdkError;
use crate::protocol::{
    CreateSchemaRequest, CreateSchemaResponse, ErrorBody, ExportCsvRequest, HealthStatus,
    ProcessDataRequest, ProcessDataResponse,
};
use crate::service::ExtractionService;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for service requests (extraction over many chunks is slow)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const CREATE_SCHEMA_FALLBACK: &str = "Failed to create schema";
const PROCESS_DATA_FALLBACK: &str = "Failed to process data";
const EXPORT_CSV_FALLBACK: &str = "Failed to export data";
const HEALTH_FALLBACK: &str = "Health check failed";

/// Extraction service client
#[derive(Debug, Clone)]
pub struct ExtractionClient {
    base_url: String,
    http: reqwest::Client,
}

impl ExtractionClient {
    /// Create a client with the default timeout
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tabula_sdk::ExtractionClient;
    ///
    /// let client = ExtractionClient::new("http://localhost:5000").unwrap();
    /// ```
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SdkError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "Service URL must start with http:// or https:// (got '{}')",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SdkError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, http })
    }

    /// Service base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, SdkError> {
        let url = self.url(path);
        debug!(%url, "POST");
        Ok(self.http.post(&url).json(body).send().await?)
    }
}

/// Decode a JSON success body, or turn a non-2xx response into a service error
async fn decode_json<T: DeserializeOwned>(
    response: Response,
    fallback: &str,
) -> Result<T, SdkError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(service_error(status, &body, fallback));
    }

    serde_json::from_slice(&body).map_err(SdkError::from)
}

/// Build a service error from an error body, falling back to a generic message
fn service_error(status: StatusCode, body: &[u8], fallback: &str) -> SdkError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    warn!(status = status.as_u16(), %message, "Service returned an error");

    SdkError::Service {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ExtractionService for ExtractionClient {
    async fn health(&self) -> Result<HealthStatus, SdkError> {
        let url = self.url("/health");
        debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        decode_json(response, HEALTH_FALLBACK).await
    }

    async fn create_schema(
        &self,
        request: &CreateSchemaRequest,
    ) -> Result<CreateSchemaResponse, SdkError> {
        debug!(
            class_name = %request.class_name,
            fields = request.field_definitions.len(),
            "Creating schema"
        );
        let response = self.post_json("/api/create-schema", request).await?;
        decode_json(response, CREATE_SCHEMA_FALLBACK).await
    }

    async fn process_data(
        &self,
        request: &ProcessDataRequest,
    ) -> Result<ProcessDataResponse, SdkError> {
        debug!(
            text_len = request.text.len(),
            chunk_size = request.chunk_size,
            chunk_overlap = request.chunk_overlap,
            "Processing text"
        );
        let response = self.post_json("/api/process-data", request).await?;
        decode_json(response, PROCESS_DATA_FALLBACK).await
    }

    async fn export_csv(&self, request: &ExportCsvRequest) -> Result<Vec<u8>, SdkError> {
        debug!(records = request.data.len(), "Exporting CSV");
        let response = self.post_json("/api/export-csv", request).await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(service_error(status, &body, EXPORT_CSV_FALLBACK));
        }

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ExtractionClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
    }

    #[test]
    fn test_rejects_non_http_url() {
        let result = ExtractionClient::new("localhost:5000");
        assert!(matches!(result, Err(SdkError::Config(_))));
    }

    #[test]
    fn test_service_error_uses_error_field() {
        let err = service_error(
            StatusCode::BAD_REQUEST,
            br#"{"error": "No text data provided"}"#,
            PROCESS_DATA_FALLBACK,
        );
        assert_eq!(
            err,
            SdkError::Service {
                status: 400,
                message: "No text data provided".to_string()
            }
        );
    }

    #[test]
    fn test_service_error_falls_back() {
        let err = service_error(StatusCode::INTERNAL_SERVER_ERROR, b"<html>", EXPORT_CSV_FALLBACK);
        assert_eq!(err.to_string(), "Failed to export data");

        let err = service_error(StatusCode::BAD_REQUEST, br#"{"error": ""}"#, CREATE_SCHEMA_FALLBACK);
        assert_eq!(err.to_string(), "Failed to create schema");
    }
}
