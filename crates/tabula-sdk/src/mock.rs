//! Deterministic in-memory extraction service
//!
//! Returns pre-configured responses without making any network calls.
//! Clones share state, so a test can keep one handle for configuration
//! and inspection while the workflow owns another.
//!
//! # Examples
//!
//! ```
//! use tabula_sdk::{ExtractionService, MockService};
//!
//! let mock = MockService::new();
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//!
//! let health = runtime.block_on(mock.health()).unwrap();
//! assert_eq!(health.status.as_deref(), Some("healthy"));
//! assert_eq!(mock.calls().health, 1);
//! ```

use crate::error::SdkError;
use crate::protocol::{
    CreateSchemaRequest, CreateSchemaResponse, ExportCsvRequest, HealthStatus,
    ProcessDataRequest, ProcessDataResponse,
};
use crate::service::ExtractionService;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tabula_domain::{OperationKind, Record};
use tokio::sync::Semaphore;

/// Number of calls made per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `health` calls
    pub health: usize,
    /// `create_schema` calls
    pub create_schema: usize,
    /// `process_data` calls
    pub process_data: usize,
    /// `export_csv` calls
    pub export_csv: usize,
}

impl CallCounts {
    /// Total network calls across every operation
    pub fn total(&self) -> usize {
        self.health + self.create_schema + self.process_data + self.export_csv
    }
}

#[derive(Debug)]
struct MockState {
    health: Result<HealthStatus, SdkError>,
    create_schema: Result<CreateSchemaResponse, SdkError>,
    process_data: Result<ProcessDataResponse, SdkError>,
    export_csv: Result<Vec<u8>, SdkError>,
    calls: CallCounts,
    last_create_schema: Option<CreateSchemaRequest>,
    last_process_data: Option<ProcessDataRequest>,
    last_export_csv: Option<ExportCsvRequest>,
}

#[derive(Debug, Default)]
struct Gates {
    schema: Option<Arc<Semaphore>>,
    process: Option<Arc<Semaphore>>,
    export: Option<Arc<Semaphore>>,
}

impl Gates {
    fn get(&self, kind: OperationKind) -> Option<Arc<Semaphore>> {
        match kind {
            OperationKind::Schema => self.schema.clone(),
            OperationKind::Process => self.process.clone(),
            OperationKind::Export => self.export.clone(),
        }
    }

    fn slot(&mut self, kind: OperationKind) -> &mut Option<Arc<Semaphore>> {
        match kind {
            OperationKind::Schema => &mut self.schema,
            OperationKind::Process => &mut self.process,
            OperationKind::Export => &mut self.export,
        }
    }
}

/// Mock extraction service for deterministic testing
#[derive(Debug, Clone)]
pub struct MockService {
    state: Arc<Mutex<MockState>>,
    gates: Arc<Mutex<Gates>>,
}

impl MockService {
    /// Mock that accepts every request with small canned responses
    pub fn new() -> Self {
        let state = MockState {
            health: Ok(HealthStatus {
                status: Some("healthy".to_string()),
                model: Some("mock-model".to_string()),
            }),
            create_schema: Ok(CreateSchemaResponse {
                model_code: "class SingleData(BaseModel):\n    original: str".to_string(),
                wrapper_code: Some(
                    "class Final_data(BaseModel):\n    list_data: List[SingleData]".to_string(),
                ),
                message: Some("Schema created successfully and model initialized".to_string()),
            }),
            process_data: Ok(ProcessDataResponse {
                results: Vec::new(),
                total_items: 0,
            }),
            export_csv: Ok(Vec::new()),
            calls: CallCounts::default(),
            last_create_schema: None,
            last_process_data: None,
            last_export_csv: None,
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            gates: Arc::new(Mutex::new(Gates::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Configure the `health` outcome
    pub fn set_health(&self, outcome: Result<HealthStatus, SdkError>) {
        self.state().health = outcome;
    }

    /// Configure the `create_schema` outcome
    pub fn set_create_schema(&self, outcome: Result<CreateSchemaResponse, SdkError>) {
        self.state().create_schema = outcome;
    }

    /// Configure the `process_data` outcome
    pub fn set_process_data(&self, outcome: Result<ProcessDataResponse, SdkError>) {
        self.state().process_data = outcome;
    }

    /// Convenience: succeed processing with these records
    pub fn set_records(&self, records: Vec<Record>) {
        let total_items = records.len() as u64;
        self.set_process_data(Ok(ProcessDataResponse {
            results: records,
            total_items,
        }));
    }

    /// Configure the `export_csv` outcome
    pub fn set_export_csv(&self, outcome: Result<Vec<u8>, SdkError>) {
        self.state().export_csv = outcome;
    }

    /// Calls made so far
    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    /// Last schema creation request received
    pub fn last_create_schema(&self) -> Option<CreateSchemaRequest> {
        self.state().last_create_schema.clone()
    }

    /// Last processing request received
    pub fn last_process_data(&self) -> Option<ProcessDataRequest> {
        self.state().last_process_data.clone()
    }

    /// Last export request received
    pub fn last_export_csv(&self) -> Option<ExportCsvRequest> {
        self.state().last_export_csv.clone()
    }

    /// Hold responses for `kind` until [`MockService::release`] is called
    ///
    /// The call is counted as soon as it arrives; only the response waits.
    pub fn hold(&self, kind: OperationKind) {
        let mut gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        *gates.slot(kind) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let one held response for `kind` through
    pub fn release(&self, kind: OperationKind) {
        let gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(gate) = gates.get(kind) {
            gate.add_permits(1);
        }
    }

    async fn wait_gate(&self, kind: OperationKind) {
        let gate = {
            let gates = self.gates.lock().unwrap_or_else(|e| e.into_inner());
            gates.get(kind)
        };
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionService for MockService {
    async fn health(&self) -> Result<HealthStatus, SdkError> {
        let mut state = self.state();
        state.calls.health += 1;
        state.health.clone()
    }

    async fn create_schema(
        &self,
        request: &CreateSchemaRequest,
    ) -> Result<CreateSchemaResponse, SdkError> {
        {
            let mut state = self.state();
            state.calls.create_schema += 1;
            state.last_create_schema = Some(request.clone());
        }
        self.wait_gate(OperationKind::Schema).await;
        self.state().create_schema.clone()
    }

    async fn process_data(
        &self,
        request: &ProcessDataRequest,
    ) -> Result<ProcessDataResponse, SdkError> {
        {
            let mut state = self.state();
            state.calls.process_data += 1;
            state.last_process_data = Some(request.clone());
        }
        self.wait_gate(OperationKind::Process).await;
        self.state().process_data.clone()
    }

    async fn export_csv(&self, request: &ExportCsvRequest) -> Result<Vec<u8>, SdkError> {
        {
            let mut state = self.state();
            state.calls.export_csv += 1;
            state.last_export_csv = Some(request.clone());
        }
        self.wait_gate(OperationKind::Export).await;
        self.state().export_csv.clone()
    }
}
