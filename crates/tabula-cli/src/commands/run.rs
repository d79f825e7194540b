//! Run command implementation: the whole workflow in one go.

use crate::cli::RunArgs;
use crate::commands::connect;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::report::settle;
use crate::schema_file;
use std::io::Read;
use std::path::{Path, PathBuf};
use tabula_domain::{ProcessingRequest, SchemaDefinition};
use tabula_sdk::ExtractionService;
use tabula_workflow::Orchestrator;
use tracing::info;

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Extracted record count
    pub records: usize,
    /// Where the CSV was written, if exported
    pub exported: Option<PathBuf>,
}

/// Execute the run command.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let definition = schema_file::read_definition(&args.schema)?;
    let text = read_text(&args.text)?;
    let request = ProcessingRequest::new(
        text,
        args.chunk_size.unwrap_or(config.settings.chunk_size),
        args.chunk_overlap.unwrap_or(config.settings.chunk_overlap),
    );

    let orchestrator = connect(config)?;
    run_pipeline(
        &orchestrator,
        definition,
        request,
        args.export.as_deref(),
        args.show_code,
        formatter,
    )
    .await?;

    Ok(())
}

/// Create the schema, process the text, print results and optionally export.
///
/// Stops at the first failed step and returns its error.
pub async fn run_pipeline<S: ExtractionService + 'static>(
    orchestrator: &Orchestrator<S>,
    definition: SchemaDefinition,
    request: ProcessingRequest,
    export: Option<&Path>,
    show_code: bool,
    formatter: &Formatter,
) -> Result<RunOutcome> {
    let download_to = export.unwrap_or_else(|| Path::new("results.csv"));

    orchestrator.session().await.load_draft(definition)?;
    settle(orchestrator.create_schema().await, formatter, download_to)?;

    if show_code {
        if let Some(handle) = orchestrator.session().await.state().compiled() {
            println!("{}", formatter.format_code(handle));
        }
    }

    settle(
        orchestrator.process_request(request).await,
        formatter,
        download_to,
    )?;

    let records = {
        let session = orchestrator.session().await;
        println!("{}", formatter.format_results(session.results())?);
        session.results().len()
    };

    let exported = match export {
        Some(_) => settle(orchestrator.export().await, formatter, download_to)?,
        None => None,
    };

    info!(records, exported = ?exported, "Run complete");
    Ok(RunOutcome { records, exported })
}

/// Read input text from a file, or from stdin for `-`.
fn read_text(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    std::fs::read_to_string(source)
        .map_err(|e| CliError::InvalidInput(format!("Cannot read text file {}: {}", source, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use serde_json::json;
    use tabula_domain::{FieldDefinition, ValidationError};
    use tabula_sdk::{MockService, SdkError};
    use tabula_workflow::WorkflowError;
    use tempfile::TempDir;

    fn definition() -> SchemaDefinition {
        SchemaDefinition {
            class_name: "Person".to_string(),
            fields: vec![FieldDefinition::new("name", "str", "full name")],
        }
    }

    fn formatter() -> Formatter {
        Formatter::new(OutputFormat::Quiet, false)
    }

    #[tokio::test]
    async fn test_pipeline_exports() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("people.csv");

        let mock = MockService::new();
        mock.set_records(vec![json!({"name": "Ada"}).as_object().cloned().unwrap()]);
        mock.set_export_csv(Ok(b"name\r\nAda\r\n".to_vec()));
        let orchestrator = Orchestrator::new(mock.clone());

        let outcome = run_pipeline(
            &orchestrator,
            definition(),
            ProcessingRequest::new("Ada went home.", 1000, 100),
            Some(&target),
            false,
            &formatter(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.records, 1);
        assert_eq!(outcome.exported, Some(target.clone()));
        assert_eq!(std::fs::read(&target).unwrap(), b"name\r\nAda\r\n");
        assert_eq!(mock.last_create_schema().unwrap().class_name, "Person");
    }

    #[tokio::test]
    async fn test_pipeline_stops_on_invalid_chunking() {
        let mock = MockService::new();
        let orchestrator = Orchestrator::new(mock.clone());

        let err = run_pipeline(
            &orchestrator,
            definition(),
            ProcessingRequest::new("hello", 100, 150),
            None,
            false,
            &formatter(),
        )
        .await
        .unwrap_err();

        match err {
            CliError::Workflow(WorkflowError::Validation(errors)) => assert!(errors.contains(
                &ValidationError::OverlapTooLarge {
                    overlap: 150,
                    size: 100
                }
            )),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.calls().process_data, 0);
    }

    #[tokio::test]
    async fn test_pipeline_surfaces_service_error() {
        let mock = MockService::new();
        mock.set_create_schema(Err(SdkError::Service {
            status: 400,
            message: "class_name required".to_string(),
        }));
        let orchestrator = Orchestrator::new(mock.clone());

        let err = run_pipeline(
            &orchestrator,
            definition(),
            ProcessingRequest::new("hello", 1000, 100),
            None,
            false,
            &formatter(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "class_name required");
        assert_eq!(mock.calls().process_data, 0);
    }

    #[test]
    fn test_read_text_missing_file() {
        assert!(matches!(
            read_text("/nonexistent/input.txt"),
            Err(CliError::InvalidInput(_))
        ));
    }
}
