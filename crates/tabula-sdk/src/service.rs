//! The extraction service seam.

use crate::error::SdkError;
use crate::protocol::{
    CreateSchemaRequest, CreateSchemaResponse, ExportCsvRequest, HealthStatus,
    ProcessDataRequest, ProcessDataResponse,
};
use async_trait::async_trait;

/// Remote operations the workflow depends on
///
/// Implemented by [`crate::ExtractionClient`] over HTTP and by
/// [`crate::MockService`] for deterministic tests. Implementations never
/// retry: every failure is terminal for that attempt.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, SdkError>;

    /// `POST /api/create-schema`
    async fn create_schema(
        &self,
        request: &CreateSchemaRequest,
    ) -> Result<CreateSchemaResponse, SdkError>;

    /// `POST /api/process-data`
    async fn process_data(
        &self,
        request: &ProcessDataRequest,
    ) -> Result<ProcessDataResponse, SdkError>;

    /// `POST /api/export-csv`, returning the raw CSV bytes
    async fn export_csv(&self, request: &ExportCsvRequest) -> Result<Vec<u8>, SdkError>;
}
