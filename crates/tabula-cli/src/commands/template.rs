//! Template command implementation.

use crate::cli::TemplateArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::schema_file;
use std::fs;
use tabula_domain::SchemaDraft;

/// Execute the template command.
pub fn execute_template(args: TemplateArgs, formatter: &Formatter) -> Result<()> {
    let contents = schema_file::to_toml(&SchemaDraft::seeded().to_definition())?;

    match args.output {
        Some(path) => {
            fs::write(&path, contents)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote schema template to {}", path.display()))
            );
        }
        None => print!("{}", contents),
    }

    Ok(())
}
