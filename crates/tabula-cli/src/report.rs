//! Rendering operation reports: notifications and file downloads.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::path::{Path, PathBuf};
use tabula_workflow::{Effect, Level, OperationReport};
use tracing::debug;

/// Print every notification of a report and save its download, if any.
///
/// Errors go to stderr, everything else to stdout. A download is written
/// to `download_to`; the written path is returned.
pub fn present(
    report: &OperationReport,
    formatter: &Formatter,
    download_to: &Path,
) -> Result<Option<PathBuf>> {
    let mut written = None;

    for effect in &report.effects {
        match effect {
            Effect::Notify(notification) if notification.level == Level::Error => {
                eprintln!("{}", formatter.notification(notification));
            }
            Effect::Notify(notification) => {
                println!("{}", formatter.notification(notification));
            }
            Effect::Navigate(step) => debug!(%step, "Navigated"),
            Effect::Download(download) => {
                save(&download.bytes, download_to)?;
                println!(
                    "{}",
                    formatter.info(&format!(
                        "Saved {} ({} bytes)",
                        download_to.display(),
                        download.bytes.len()
                    ))
                );
                written = Some(download_to.to_path_buf());
            }
        }
    }

    Ok(written)
}

/// Present a report that must have succeeded, or return its error unprinted.
///
/// Used by one-shot commands, where the caller reports the error once.
pub fn settle(
    report: OperationReport,
    formatter: &Formatter,
    download_to: &Path,
) -> Result<Option<PathBuf>> {
    if let Some(error) = report.error {
        return Err(error.into());
    }
    if report.discarded {
        return Err(CliError::NotPermitted(format!(
            "The {} request was cancelled",
            report.kind
        )));
    }
    present(&report, formatter, download_to)
}

fn save(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tabula_domain::OperationKind;
    use tabula_workflow::{Download, Notification};
    use tempfile::TempDir;

    #[test]
    fn test_download_written() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out").join("results.csv");
        let report = OperationReport::success(OperationKind::Export)
            .with(Effect::Notify(Notification::success("CSV exported successfully")))
            .with(Effect::Download(Download::csv(b"a\r\n1\r\n".to_vec())));

        let formatter = Formatter::new(OutputFormat::Table, false);
        let written = present(&report, &formatter, &target).unwrap();

        assert_eq!(written, Some(target.clone()));
        assert_eq!(fs::read(&target).unwrap(), b"a\r\n1\r\n");
    }

    #[test]
    fn test_settle_returns_error() {
        let report = OperationReport::failure(
            OperationKind::Export,
            tabula_domain::ValidationError::NoResults.into(),
        );
        let formatter = Formatter::new(OutputFormat::Table, false);
        let err = settle(report, &formatter, Path::new("results.csv")).unwrap_err();
        assert_eq!(err.to_string(), "No results to export");
    }

    #[test]
    fn test_no_download_nothing_written() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("results.csv");
        let report = OperationReport::success(OperationKind::Schema)
            .with(Effect::Notify(Notification::success("Schema created successfully")));

        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(present(&report, &formatter, &target).unwrap().is_none());
        assert!(!target.exists());
    }
}
