//! Health command implementation.

use crate::error::Result;
use crate::output::Formatter;
use tabula_sdk::ExtractionService;
use tabula_workflow::Orchestrator;

/// Execute the health command.
pub async fn execute_health<S: ExtractionService + 'static>(
    orchestrator: &Orchestrator<S>,
    url: &str,
    formatter: &Formatter,
) -> Result<()> {
    let health = orchestrator.health().await?;
    println!("{}", formatter.format_health(url, &health)?);
    Ok(())
}
