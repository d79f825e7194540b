//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tabula_domain::{CompiledSchemaHandle, ResultSet, SchemaDraft};
use tabula_sdk::HealthStatus;
use tabula_workflow::{Level, Notification, WorkflowSession};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format extracted records.
    pub fn format_results(&self, results: &ResultSet) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(results.records())?),
            OutputFormat::Table => Ok(self.format_results_table(results)),
            OutputFormat::Quiet => Ok(results.len().to_string()),
        }
    }

    fn format_results_table(&self, results: &ResultSet) -> String {
        if results.is_empty() {
            return self.colorize("No results yet.", "yellow");
        }

        let columns = results.columns();
        let mut builder = Builder::default();
        builder.push_record(std::iter::once("#".to_string()).chain(columns.iter().cloned()));

        for (index, row) in results.rows().into_iter().enumerate() {
            builder.push_record(
                std::iter::once((index + 1).to_string()).chain(row.into_iter().map(cell)),
            );
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the field list of a draft.
    pub fn format_fields(&self, draft: &SchemaDraft) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&draft.to_definition())?),
            OutputFormat::Quiet => Ok(draft
                .fields()
                .iter()
                .map(|f| f.name.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["#", "Name", "Type", "Description"]);
                for (index, field) in draft.fields().iter().enumerate() {
                    builder.push_record([
                        (index + 1).to_string(),
                        field.name.clone(),
                        field.field_type.clone(),
                        field.description.clone(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));

                let state = if draft.is_frozen() { " (read-only)" } else { "" };
                Ok(format!("Class: {}{}\n{}", draft.class_name(), state, table))
            }
        }
    }

    /// Format the generated source of a compiled schema.
    pub fn format_code(&self, handle: &CompiledSchemaHandle) -> String {
        let mut out = handle.model_code.clone();
        if let Some(wrapper) = &handle.wrapper_code {
            out.push_str("\n\n");
            out.push_str(wrapper);
        }
        out
    }

    /// Format a one-screen summary of the session.
    pub fn format_status(&self, session: &WorkflowSession) -> String {
        let state = session.state();
        let loading = session.loading();
        let flag = |busy: bool| if busy { "running" } else { "idle" };

        let mut lines = vec![
            format!("Step:     {}", session.step()),
            format!(
                "Schema:   {}",
                state
                    .compiled()
                    .map(|h| format!("created ({})", h.class_name))
                    .unwrap_or_else(|| format!("draft, {} field(s)", session.draft().len()))
            ),
            format!("Text:     {} character(s)", session.text().chars().count()),
            format!(
                "Chunking: size {}, overlap {}",
                session.chunk_size(),
                session.chunk_overlap()
            ),
            format!("Results:  {} record(s)", session.results().len()),
            format!(
                "Loading:  schema {}, process {}, export {}",
                flag(loading.schema),
                flag(loading.process),
                flag(loading.export)
            ),
        ];

        let reachable: Vec<&str> = [
            tabula_domain::WorkflowStep::SchemaAuthoring,
            tabula_domain::WorkflowStep::Processing,
            tabula_domain::WorkflowStep::Results,
        ]
        .into_iter()
        .filter(|step| state.is_available(*step))
        .map(|step| step.as_str())
        .collect();
        lines.push(format!("Steps:    {}", reachable.join(", ")));

        lines.join("\n")
    }

    /// Format a health response.
    pub fn format_health(&self, url: &str, health: &HealthStatus) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(health)?),
            OutputFormat::Quiet => Ok(health.status.clone().unwrap_or_else(|| "ok".into())),
            OutputFormat::Table => Ok(self.success(&format!(
                "Service at {} is up (model: {})",
                url,
                health.model.as_deref().unwrap_or("unknown")
            ))),
        }
    }

    /// Format a workflow notification.
    pub fn notification(&self, notification: &Notification) -> String {
        match notification.level {
            Level::Success => self.success(&notification.message),
            Level::Error => self.error(&notification.message),
            Level::Info => self.info(&notification.message),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Render one table cell; missing keys are blank, strings unquoted.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabula_domain::{ColumnPolicy, Record};

    fn results(values: Vec<Value>) -> ResultSet {
        let mut results = ResultSet::with_policy(ColumnPolicy::FirstRecord);
        results.replace(
            values
                .into_iter()
                .map(|v| v.as_object().cloned().unwrap())
                .collect::<Vec<Record>>(),
        );
        results
    }

    #[test]
    fn test_results_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_results(&results(vec![
                json!({"name": "Ada", "tags": ["x", "y"]}),
                json!({"name": "Bo"}),
            ]))
            .unwrap();
        assert!(output.contains("name"));
        assert!(output.contains("Ada"));
        assert!(output.contains(r#"["x","y"]"#));
        assert!(!output.contains("\"Ada\""));
    }

    #[test]
    fn test_results_json_keeps_key_order() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter
            .format_results(&results(vec![json!({"z": 1, "a": 2})]))
            .unwrap();
        assert!(output.find("\"z\"").unwrap() < output.find("\"a\"").unwrap());
    }

    #[test]
    fn test_results_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter
            .format_results(&results(vec![json!({"a": 1}), json!({"a": 2})]))
            .unwrap();
        assert_eq!(output, "2");
    }

    #[test]
    fn test_empty_results() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_results(&ResultSet::new()).unwrap();
        assert!(output.contains("No results yet"));
    }

    #[test]
    fn test_fields_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_fields(&SchemaDraft::seeded()).unwrap();
        assert!(output.starts_with("Class: SingleData"));
        assert!(output.contains("list_of_suggest"));
        assert!(output.contains("List[str]"));
    }

    #[test]
    fn test_status_lists_reachable_steps() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_status(&WorkflowSession::new());
        assert!(output.contains("Step:     schema"));
        assert!(output.contains("Steps:    schema\n") || output.ends_with("Steps:    schema"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(
            formatter.notification(&Notification::error("No results to export")),
            "✗ No results to export"
        );
    }
}
