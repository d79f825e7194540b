//! Tabula CLI - Schema-driven extraction of structured records from text.

use clap::Parser;
use tabula_cli::commands;
use tabula_cli::repl;
use tabula_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tabula_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load or create config
    let path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load_from(&path)?;
    if !config.exists() {
        config.save().ok();
    }

    // Override profile if specified
    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        None | Some(Command::Repl) => {
            let orchestrator = commands::connect(&config)?;
            repl::run_repl(&orchestrator, &config, &formatter).await?;
        }
        Some(Command::Health) => {
            let orchestrator = commands::connect(&config)?;
            commands::execute_health(&orchestrator, &config.service_url()?, &formatter).await?;
        }
        Some(Command::Run(args)) => {
            commands::execute_run(args, &config, &formatter).await?;
        }
        Some(Command::Template(args)) => {
            commands::execute_template(args, &formatter)?;
        }
        Some(Command::Profile(args)) => {
            commands::execute_profile(args, &mut config, &formatter)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` applies unless `-v` is given.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
