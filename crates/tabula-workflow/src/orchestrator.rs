//! Orchestrator - performs the network round trips for a session
//!
//! The session lock is taken to begin an operation and again to finish
//! it, never across the network await, so operations of different kinds
//! can be in flight at the same time. Each call can be cancelled through
//! a [`CancellationToken`]; a cancelled or superseded call never applies
//! its result.

use crate::effect::OperationReport;
use crate::error::WorkflowError;
use crate::session::WorkflowSession;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tabula_domain::{LoadingSnapshot, OperationKind, ProcessingRequest};
use tabula_sdk::{ExtractionService, HealthStatus};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type Tokens = HashMap<u64, (OperationKind, CancellationToken)>;

fn lock_tokens(tokens: &StdMutex<Tokens>) -> std::sync::MutexGuard<'_, Tokens> {
    tokens.lock().unwrap_or_else(|e| e.into_inner())
}

/// A call's cancellation token, reachable from `cancel` and `reset`
/// until the call settles
struct Registration {
    id: u64,
    token: CancellationToken,
    tokens: Arc<StdMutex<Tokens>>,
}

impl Registration {
    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock_tokens(&self.tokens).remove(&self.id);
    }
}

/// A spawned operation
#[derive(Debug)]
pub struct OperationHandle {
    kind: OperationKind,
    token: CancellationToken,
    task: JoinHandle<OperationReport>,
}

impl OperationHandle {
    /// Operation this handle drives
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Token that cancels this operation
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop waiting for the service; the outcome is dropped
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the operation has settled
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the operation to settle
    pub async fn join(self) -> OperationReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => OperationReport::failure(
                self.kind,
                WorkflowError::Transport(format!("{} task failed: {}", self.kind, e)),
            ),
        }
    }
}

/// Drives a [`WorkflowSession`] against an [`ExtractionService`]
pub struct Orchestrator<S> {
    service: Arc<S>,
    session: Arc<Mutex<WorkflowSession>>,
    tokens: Arc<StdMutex<Tokens>>,
    next_id: Arc<AtomicU64>,
}

impl<S> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            session: Arc::clone(&self.session),
            tokens: Arc::clone(&self.tokens),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<S: ExtractionService + 'static> Orchestrator<S> {
    /// Orchestrate a fresh default session
    pub fn new(service: S) -> Self {
        Self::with_session(service, WorkflowSession::new())
    }

    /// Orchestrate an existing session
    pub fn with_session(service: S, session: WorkflowSession) -> Self {
        Self {
            service: Arc::new(service),
            session: Arc::new(Mutex::new(session)),
            tokens: Arc::new(StdMutex::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The service calls go to
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Lock the session for inspection or editing
    ///
    /// Do not hold the guard while awaiting an operation on this
    /// orchestrator.
    pub async fn session(&self) -> MutexGuard<'_, WorkflowSession> {
        self.session.lock().await
    }

    /// Current in-flight flags
    pub async fn loading(&self) -> LoadingSnapshot {
        self.session.lock().await.loading()
    }

    /// Check the service; does not touch the session
    pub async fn health(&self) -> Result<HealthStatus, WorkflowError> {
        let health = self.service.health().await?;
        debug!(model = ?health.model, "Service healthy");
        Ok(health)
    }

    /// Create the schema from the current draft
    pub async fn create_schema(&self) -> OperationReport {
        let registration = self.register(OperationKind::Schema);
        self.run_create_schema(registration).await
    }

    /// Process the pending text with the pending chunking parameters
    pub async fn process(&self) -> OperationReport {
        let registration = self.register(OperationKind::Process);
        self.run_process(registration).await
    }

    /// Replace the pending input, then process it
    pub async fn process_request(&self, request: ProcessingRequest) -> OperationReport {
        self.session.lock().await.set_processing_input(request);
        self.process().await
    }

    /// Export the current results as CSV
    pub async fn export(&self) -> OperationReport {
        let registration = self.register(OperationKind::Export);
        self.run_export(registration).await
    }

    /// [`Orchestrator::create_schema`] on a background task
    pub fn spawn_create_schema(&self) -> OperationHandle {
        let this = self.clone();
        self.spawn(OperationKind::Schema, move |registration| async move {
            this.run_create_schema(registration).await
        })
    }

    /// [`Orchestrator::process`] on a background task
    pub fn spawn_process(&self) -> OperationHandle {
        let this = self.clone();
        self.spawn(OperationKind::Process, move |registration| async move {
            this.run_process(registration).await
        })
    }

    /// [`Orchestrator::export`] on a background task
    pub fn spawn_export(&self) -> OperationHandle {
        let this = self.clone();
        self.spawn(OperationKind::Export, move |registration| async move {
            this.run_export(registration).await
        })
    }

    fn spawn<F, Fut>(&self, kind: OperationKind, run: F) -> OperationHandle
    where
        F: FnOnce(Registration) -> Fut,
        Fut: std::future::Future<Output = OperationReport> + Send + 'static,
    {
        // Registered before the task exists so cancel and reset can reach it
        let registration = self.register(kind);
        let token = registration.token.clone();
        let task = tokio::spawn(run(registration));
        OperationHandle { kind, token, task }
    }

    /// Cancel the in-flight call of `kind`
    ///
    /// Returns whether anything was in flight, including calls spawned
    /// but not yet started. The call settles as discarded and its
    /// loading flag is cleared immediately.
    pub async fn cancel(&self, kind: OperationKind) -> bool {
        let pending = {
            let tokens = lock_tokens(&self.tokens);
            let mut pending = 0;
            for (_, token) in tokens.values().filter(|(k, _)| *k == kind) {
                if !token.is_cancelled() {
                    token.cancel();
                    pending += 1;
                }
            }
            pending
        };
        let released = self.session.lock().await.cancel(kind);
        let cancelled = pending > 0 || released;
        if cancelled {
            info!(%kind, "Cancelled in-flight operation");
        }
        cancelled
    }

    /// Start over with a fresh seeded session, cancelling everything in flight
    pub async fn reset(&self) {
        for (_, token) in lock_tokens(&self.tokens).values() {
            token.cancel();
        }
        self.session.lock().await.reset();
    }

    fn register(&self, kind: OperationKind) -> Registration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        lock_tokens(&self.tokens).insert(id, (kind, token.clone()));
        Registration {
            id,
            token,
            tokens: Arc::clone(&self.tokens),
        }
    }

    // Each run checks its token under the session lock before `begin_*`.
    // `cancel` and `reset` trip tokens before taking that lock, so a call
    // they reach is either refused here or already holds a loading flag
    // they invalidate.

    async fn run_create_schema(&self, registration: Registration) -> OperationReport {
        let kind = OperationKind::Schema;
        let ticket = {
            let mut session = self.session.lock().await;
            if registration.is_cancelled() {
                return session.withdraw(kind);
            }
            match session.begin_create_schema() {
                Ok(ticket) => ticket,
                Err(e) => return session.reject(kind, e),
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = registration.token.cancelled() => None,
            result = self.service.create_schema(ticket.request()) => Some(result),
        };

        let mut session = self.session.lock().await;
        match outcome {
            Some(result) => session.finish_create_schema(ticket, result),
            None => session.abandon(ticket),
        }
    }

    async fn run_process(&self, registration: Registration) -> OperationReport {
        let kind = OperationKind::Process;
        let ticket = {
            let mut session = self.session.lock().await;
            if registration.is_cancelled() {
                return session.withdraw(kind);
            }
            match session.begin_process() {
                Ok(ticket) => ticket,
                Err(e) => return session.reject(kind, e),
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = registration.token.cancelled() => None,
            result = self.service.process_data(ticket.request()) => Some(result),
        };

        let mut session = self.session.lock().await;
        match outcome {
            Some(result) => session.finish_process(ticket, result),
            None => session.abandon(ticket),
        }
    }

    async fn run_export(&self, registration: Registration) -> OperationReport {
        let kind = OperationKind::Export;
        let ticket = {
            let mut session = self.session.lock().await;
            if registration.is_cancelled() {
                return session.withdraw(kind);
            }
            match session.begin_export() {
                Ok(ticket) => ticket,
                Err(e) => return session.reject(kind, e),
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = registration.token.cancelled() => None,
            result = self.service.export_csv(ticket.request()) => Some(result),
        };

        let mut session = self.session.lock().await;
        let report = match outcome {
            Some(result) => session.finish_export(ticket, result),
            None => session.abandon(ticket),
        };
        if let Some(error) = &report.error {
            warn!(%error, "Export failed");
        }
        report
    }
}
