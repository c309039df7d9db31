//! Configuration
//!
//! Loading and validation of widget configuration files: pool contents,
//! sampling flags, countdown, trigger mode, command phrase, audio, and
//! presentation tuning.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
