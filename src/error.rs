//! Error types for `carousel`
//!
//! A single error hierarchy covering configuration loading, pool
//! construction, and presentation failures, with a mapping onto process
//! exit codes for the CLI.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `carousel` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, validation failure, unusable pool)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Presentation error (item failed to load, transition failed)
    pub const PRESENTATION_ERROR: i32 = 4;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `carousel` operations.
///
/// Aggregates the domain errors and maps each onto an exit code.
#[derive(Debug, Error)]
pub enum CarouselError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Item pool could not be built or sampled
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Presentation layer rejected an operation
    #[error(transparent)]
    Presentation(#[from] PresentationError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CarouselError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Pool(_) => ExitCode::CONFIG_ERROR,
            Self::Presentation(_) => ExitCode::PRESENTATION_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}")]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Dotted path to the problematic field (e.g., "pool.items[2]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Pool Errors
// ============================================================================

/// Item pool construction and selection errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The pool has no items
    #[error("item pool is empty")]
    Empty,

    /// Distinct mode needs at least two items to ever avoid a repeat
    #[error("item pool has {len} item(s); distinct mode needs at least 2")]
    TooSmallForDistinct {
        /// Number of configured items
        len: usize,
    },

    /// A direct selection referenced a slot past the end of the pool
    #[error("index {index} out of range for pool of {len} item(s)")]
    IndexOutOfRange {
        /// Zero-based index requested
        index: usize,
        /// Pool size
        len: usize,
    },
}

// ============================================================================
// Presentation Errors
// ============================================================================

/// Failures reported by a presentation port.
#[derive(Debug, Error)]
pub enum PresentationError {
    /// The item could not be loaded
    #[error("couldn't load '{item}': {reason}")]
    LoadFailed {
        /// Identifier of the item
        item: String,
        /// Human-readable reason
        reason: String,
    },

    /// A fade or overlay transition failed
    #[error("transition failed: {0}")]
    TransitionFailed(String),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `carousel` operations.
pub type Result<T> = std::result::Result<T, CarouselError>;

// ============================================================================
// Tests
// ============================================================================
