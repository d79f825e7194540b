//! Command implementations.

pub mod health;
pub mod profile;
pub mod run;
pub mod template;

pub use self::health::execute_health;
pub use self::profile::execute_profile;
pub use self::run::{execute_run, run_pipeline, RunOutcome};
pub use self::template::execute_template;

use crate::config::Config;
use crate::error::Result;
use tabula_sdk::ExtractionClient;
use tabula_workflow::{Orchestrator, WorkflowSession};

/// Build an orchestrator for the configured service and session options.
pub fn connect(config: &Config) -> Result<Orchestrator<ExtractionClient>> {
    let client = ExtractionClient::with_timeout(&config.service_url()?, config.request_timeout())?;
    Ok(Orchestrator::with_session(
        client,
        WorkflowSession::with_options(config.session_options()),
    ))
}
