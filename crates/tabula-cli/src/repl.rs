//! Interactive REPL (Read-Eval-Print Loop) mode.
//!
//! The REPL walks one workflow session: edit the draft, create the schema,
//! load text, process it, inspect and export the results. Remote
//! operations run on a background task and can be cancelled with Ctrl-C.

use crate::commands;
use crate::config::{tabula_dir, Config};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::report::present;
use crate::schema_file;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::future::Future;
use std::path::PathBuf;
use tabula_domain::{FieldAttribute, WorkflowStep};
use tabula_sdk::ExtractionService;
use tabula_workflow::{OperationHandle, OperationReport, Orchestrator, WorkflowError};
use tracing::warn;

/// Run the interactive REPL.
pub async fn run_repl<S: ExtractionService + 'static>(
    orchestrator: &Orchestrator<S>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    println!(
        "{}",
        formatter.info("Tabula REPL - Type 'help' for commands, 'exit' to quit")
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config).map_err(|e| {
        CliError::Io(std::io::Error::other(format!(
            "Failed to initialize editor: {}",
            e
        )))
    })?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        let prompt = format!("tabula [{}]> ", orchestrator.session().await.step());

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(ReplCommand::Action(action)) => {
                        if let Err(e) = execute_action(action, orchestrator, config, formatter).await
                        {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// REPL command type.
#[derive(Debug, PartialEq)]
enum ReplCommand {
    Exit,
    Help,
    Action(ReplAction),
}

/// Something the REPL does to the session.
#[derive(Debug, PartialEq)]
enum ReplAction {
    Fields,
    Add,
    Set {
        index: usize,
        attribute: FieldAttribute,
        value: String,
    },
    Remove(usize),
    Class(String),
    Load(PathBuf),
    Create,
    Code,
    Text(PathBuf),
    Paste(String),
    Chunk { size: i64, overlap: i64 },
    Process,
    Results,
    Export(Option<PathBuf>),
    Step(WorkflowStep),
    Status,
    Health,
    Reset,
}

/// Parse a REPL command line.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.is_empty() {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    }

    let args = &parts[1..];
    let action = match parts[0] {
        "exit" | "quit" | "q" => return Ok(ReplCommand::Exit),
        "help" | "?" => return Ok(ReplCommand::Help),
        "fields" | "ls" => ReplAction::Fields,
        "add" => ReplAction::Add,
        "set" => parse_set_command(args)?,
        "rm" | "remove" => ReplAction::Remove(parse_index(args.first().copied(), "rm <n>")?),
        "class" => match args.first() {
            Some(name) => ReplAction::Class(name.to_string()),
            None => return Err(usage("class <name>")),
        },
        "load" => ReplAction::Load(parse_path(args, "load <schema-file>")?),
        "create" => ReplAction::Create,
        "code" => ReplAction::Code,
        "text" => ReplAction::Text(parse_path(args, "text <file>")?),
        "paste" => {
            let text = line
                .trim_start()
                .split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim())
                .unwrap_or_default();
            if text.is_empty() {
                return Err(usage("paste <text...>"));
            }
            ReplAction::Paste(text.to_string())
        }
        "chunk" => parse_chunk_command(args)?,
        "process" | "run" => ReplAction::Process,
        "results" => ReplAction::Results,
        "export" => ReplAction::Export(args.first().map(PathBuf::from)),
        "step" => {
            let step = args
                .first()
                .and_then(|s| WorkflowStep::parse(s))
                .ok_or_else(|| usage("step <schema|process|results>"))?;
            ReplAction::Step(step)
        }
        "status" => ReplAction::Status,
        "health" => ReplAction::Health,
        "reset" => ReplAction::Reset,
        _ => {
            return Err(CliError::InvalidInput(format!(
                "Unknown command: {}. Type 'help' for available commands.",
                parts[0]
            )))
        }
    };

    Ok(ReplCommand::Action(action))
}

fn usage(text: &str) -> CliError {
    CliError::InvalidInput(format!("Usage: {}", text))
}

/// Field numbers are shown starting at 1.
fn parse_index(arg: Option<&str>, usage_text: &str) -> Result<usize> {
    let number: usize = arg
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| usage(usage_text))?;
    number
        .checked_sub(1)
        .ok_or_else(|| CliError::InvalidInput("Field numbers start at 1".to_string()))
}

fn parse_path(args: &[&str], usage_text: &str) -> Result<PathBuf> {
    if args.is_empty() {
        return Err(usage(usage_text));
    }
    Ok(PathBuf::from(args.join(" ")))
}

fn parse_set_command(args: &[&str]) -> Result<ReplAction> {
    const USAGE: &str = "set <n> <name|type|description> <value...>";

    if args.len() < 2 {
        return Err(usage(USAGE));
    }
    let index = parse_index(Some(args[0]), USAGE)?;
    let attribute = FieldAttribute::parse(args[1]).ok_or_else(|| usage(USAGE))?;

    Ok(ReplAction::Set {
        index,
        attribute,
        value: args[2..].join(" "),
    })
}

fn parse_chunk_command(args: &[&str]) -> Result<ReplAction> {
    const USAGE: &str = "chunk <size> <overlap>";

    match args {
        [size, overlap] => Ok(ReplAction::Chunk {
            size: size.parse().map_err(|_| usage(USAGE))?,
            overlap: overlap.parse().map_err(|_| usage(USAGE))?,
        }),
        _ => Err(usage(USAGE)),
    }
}

/// Execute a REPL action.
async fn execute_action<S: ExtractionService + 'static>(
    action: ReplAction,
    orchestrator: &Orchestrator<S>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    match action {
        ReplAction::Fields => {
            let session = orchestrator.session().await;
            println!("{}", formatter.format_fields(session.draft())?);
        }
        ReplAction::Add => {
            let mut session = orchestrator.session().await;
            session.draft_mut().add_field()?;
            println!(
                "{}",
                formatter.success(&format!("Added field {}", session.draft().len()))
            );
        }
        ReplAction::Set {
            index,
            attribute,
            value,
        } => {
            orchestrator
                .session()
                .await
                .draft_mut()
                .update_field(index, attribute, value)?;
            println!("{}", formatter.success(&format!("Updated field {}", index + 1)));
        }
        ReplAction::Remove(index) => {
            orchestrator.session().await.draft_mut().remove_field(index)?;
            println!("{}", formatter.success(&format!("Removed field {}", index + 1)));
        }
        ReplAction::Class(name) => {
            orchestrator.session().await.draft_mut().set_class_name(name)?;
        }
        ReplAction::Load(path) => {
            let definition = schema_file::read_definition(&path)?;
            let fields = definition.fields.len();
            orchestrator.session().await.load_draft(definition)?;
            println!(
                "{}",
                formatter.success(&format!("Loaded {} field(s) from {}", fields, path.display()))
            );
        }
        ReplAction::Create => {
            let report = await_operation(orchestrator, orchestrator.spawn_create_schema()).await;
            present(&report, formatter, &config.export_path(EXPORT_FILE))?;
        }
        ReplAction::Code => {
            let session = orchestrator.session().await;
            match session.state().compiled() {
                Some(handle) => println!("{}", formatter.format_code(handle)),
                None => println!("{}", formatter.warning("Please create schema first")),
            }
        }
        ReplAction::Text(path) => {
            let text = std::fs::read_to_string(&path)?;
            let chars = text.chars().count();
            orchestrator.session().await.set_text(text);
            println!(
                "{}",
                formatter.success(&format!("Loaded {} character(s)", chars))
            );
        }
        ReplAction::Paste(text) => {
            orchestrator.session().await.set_text(text);
        }
        ReplAction::Chunk { size, overlap } => {
            orchestrator.session().await.set_chunking(size, overlap);
        }
        ReplAction::Process => {
            let report = await_operation(orchestrator, orchestrator.spawn_process()).await;
            present(&report, formatter, &config.export_path(EXPORT_FILE))?;
            if report.is_success() {
                let session = orchestrator.session().await;
                println!("{}", formatter.format_results(session.results())?);
            }
        }
        ReplAction::Results => {
            let session = orchestrator.session().await;
            println!("{}", formatter.format_results(session.results())?);
        }
        ReplAction::Export(path) => {
            let target = path.unwrap_or_else(|| config.export_path(EXPORT_FILE));
            let report = await_operation(orchestrator, orchestrator.spawn_export()).await;
            present(&report, formatter, &target)?;
        }
        ReplAction::Step(step) => {
            orchestrator
                .session()
                .await
                .select_step(step)
                .map_err(WorkflowError::from)?;
        }
        ReplAction::Status => {
            let session = orchestrator.session().await;
            println!("{}", formatter.format_status(&session));
        }
        ReplAction::Health => {
            commands::execute_health(orchestrator, &config.service_url()?, formatter).await?;
        }
        ReplAction::Reset => {
            orchestrator.reset().await;
            println!("{}", formatter.info("Started a new session"));
        }
    }

    Ok(())
}

const EXPORT_FILE: &str = tabula_workflow::EXPORT_FILE_NAME;

/// Wait for a spawned operation; Ctrl-C cancels it.
async fn await_operation<S: ExtractionService + 'static>(
    orchestrator: &Orchestrator<S>,
    handle: OperationHandle,
) -> OperationReport {
    await_interruptible(orchestrator, handle, tokio::signal::ctrl_c()).await
}

async fn await_interruptible<S, I>(
    orchestrator: &Orchestrator<S>,
    handle: OperationHandle,
    interrupt: I,
) -> OperationReport
where
    S: ExtractionService + 'static,
    I: Future<Output = std::io::Result<()>>,
{
    let kind = handle.kind();
    let token = handle.token();
    let join = handle.join();
    tokio::pin!(join);

    tokio::select! {
        report = &mut join => report,
        signal = interrupt => {
            match signal {
                Ok(()) => {
                    token.cancel();
                    orchestrator.cancel(kind).await;
                }
                Err(e) => warn!(error = %e, "Ctrl-C handler unavailable"),
            }
            join.await
        }
    }
}

fn get_history_path() -> Result<PathBuf> {
    let dir = tabula_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  Schema");
    println!("  fields                          - Show the schema draft");
    println!("  add                             - Append a blank field");
    println!("  set <n> <attr> <value...>       - Change a field attribute");
    println!("    attr: name | type | description");
    println!("    type: str, int, float, bool, List[str], List[int],");
    println!("          Dict[str,Any], Optional[str]");
    println!("  rm <n>                          - Remove a field");
    println!("  class <name>                    - Set the class name");
    println!("  load <file>                     - Replace the draft from a TOML/JSON file");
    println!("  create                          - Create the schema on the service");
    println!("  code                            - Show the generated model code");
    println!();
    println!("  Processing");
    println!("  text <file>                     - Load text to process from a file");
    println!("  paste <text...>                 - Set the text to process");
    println!("  chunk <size> <overlap>          - Set chunking (default: 1000 100)");
    println!("  process                         - Extract records from the text");
    println!();
    println!("  Results");
    println!("  results                         - Show extracted records");
    println!("  export [path]                   - Save results as CSV");
    println!();
    println!("  Session");
    println!("  step <schema|process|results>   - Go to an available step");
    println!("  status                          - Show session state");
    println!("  health                          - Check the extraction service");
    println!("  reset                           - Start over");
    println!("  help, ?                         - Show this help");
    println!("  exit, quit, q                   - Exit REPL");
    println!();
    println!("  Ctrl-C cancels a running create/process/export.");
    println!();
}
