//! `validate` command.
//!
//! Loads each file through the same loader `run` uses and reports the
//! outcome per file. Every file is checked even after a failure; the first
//! failure becomes the command's error.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadWarning};
use crate::error::{CarouselError, ConfigError, Severity, ValidationIssue};

/// Outcome for a single file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    /// File as given on the command line.
    pub file: String,
    /// Whether the file would be accepted by `run`.
    pub valid: bool,
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
}

/// Validate configuration files without starting the widget.
///
/// # Errors
///
/// Returns the first file's error. With `--strict`, warnings count as
/// validation errors.
pub fn run(args: &ValidateArgs) -> Result<(), CarouselError> {
    let loader = ConfigLoader::with_defaults();
    let mut first_error = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let (report, error) = check_file(&loader, path, args.strict);

        match args.format {
            OutputFormat::Human => print_human(&report),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(&report).unwrap_or_default());
            }
        }

        if let Some(e) = error {
            first_error.get_or_insert(e);
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

/// Validates one file and builds its report.
pub fn check_file(
    loader: &ConfigLoader,
    path: &Path,
    strict: bool,
) -> (FileReport, Option<ConfigError>) {
    let file = path.display().to_string();

    match loader.load(path) {
        Ok(result) => {
            let warnings: Vec<String> = result.warnings.iter().map(ToString::to_string).collect();
            if strict && !result.warnings.is_empty() {
                let errors = result.warnings.into_iter().map(into_issue).collect::<Vec<_>>();
                let report = FileReport {
                    file: file.clone(),
                    valid: false,
                    errors: errors.iter().map(ToString::to_string).collect(),
                    warnings,
                };
                return (
                    report,
                    Some(ConfigError::ValidationError { path: file, errors }),
                );
            }
            (
                FileReport {
                    file,
                    valid: true,
                    errors: Vec::new(),
                    warnings,
                },
                None,
            )
        }
        Err(e) => {
            let errors = match &e {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            (
                FileReport {
                    file,
                    valid: false,
                    errors,
                    warnings: Vec::new(),
                },
                Some(e),
            )
        }
    }
}

fn into_issue(warning: LoadWarning) -> ValidationIssue {
    ValidationIssue {
        path: warning.location.unwrap_or_else(|| "<unknown>".to_string()),
        message: warning.message,
        severity: Severity::Error,
    }
}

fn print_human(report: &FileReport) {
    if report.valid {
        println!("{}: ok", report.file);
    } else {
        println!("{}: invalid", report.file);
    }
    for error in &report.errors {
        println!("  {error}");
    }
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
}
