//! Configuration loader.
//!
//! Pipeline:
//! 1. Size check
//! 2. Environment variable expansion (on raw text, before parsing)
//! 3. YAML deserialization into [`WidgetConfig`]
//! 4. Validation
//! 5. Freeze with `Arc`

use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;
use std::sync::Arc;

use crate::config::schema::WidgetConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Size limits.
    pub config_limits: ConfigLimits,
}

/// Resource limits, each overridable through the environment.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration size in bytes (`CAROUSEL_MAX_CONFIG_SIZE`).
    pub max_config_size: usize,

    /// Maximum number of pool items (`CAROUSEL_MAX_POOL_ITEMS`).
    pub max_pool_items: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("CAROUSEL_MAX_CONFIG_SIZE", 1024 * 1024),
            max_pool_items: env_or("CAROUSEL_MAX_POOL_ITEMS", 10_000),
        }
    }
}

/// A loaded, validated, frozen configuration.
#[derive(Debug)]
pub struct LoadResult {
    /// The configuration.
    pub config: Arc<WidgetConfig>,

    /// Non-fatal issues found while loading.
    pub warnings: Vec<LoadWarning>,
}

/// Non-fatal loading issue.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Where it was found (file or dotted field path).
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {location}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Loads widget configuration files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Loads and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        self.check_size(size)?;

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        self.load_from_str(&raw, path)
    }

    /// Loads and validates configuration text. `source` names the origin
    /// in errors and warnings.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus file access.
    pub fn load_from_str(&self, raw: &str, source: &Path) -> Result<LoadResult, ConfigError> {
        self.check_size(raw.len())?;
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env = EnvSubstitution::new(source);
        let expanded = env.substitute(raw)?;
        let mut warnings = env.warnings;

        let value: serde_yaml::Value =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                path: source.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;
        if value.is_null() {
            return Err(ConfigError::ParseError {
                path: source.to_path_buf(),
                line: None,
                message: "configuration file is empty".to_string(),
            });
        }

        let config: WidgetConfig =
            serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError {
                path: source.to_path_buf(),
                line: None,
                message: format!("invalid configuration: {e}"),
            })?;

        let result = Validator::new().validate(&config, &self.options.config_limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: source.display().to_string(),
                errors: result.errors,
            });
        }
        warnings.extend(result.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }

    fn check_size(&self, size: usize) -> Result<(), ConfigError> {
        let limit = self.options.config_limits.max_config_size;
        if size > limit {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{size} bytes"),
                expected: format!("at most {limit} bytes"),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse `${...}` expansion.
///
/// - `${VAR}`: value, or empty string with a warning when unset
/// - `${VAR:-default}`: value, or `default` when unset
/// - `${VAR:?message}`: value, or an error carrying `message`
/// - `$$`: a literal `$`
struct EnvSubstitution<'a> {
    source: &'a Path,
    warnings: Vec<LoadWarning>,
}

enum Fallback {
    Warn,
    Default(String),
    Required(String),
}

impl<'a> EnvSubstitution<'a> {
    const fn new(source: &'a Path) -> Self {
        Self {
            source,
            warnings: Vec::new(),
        }
    }

    fn substitute(&mut self, raw: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    out.push('$');
                }
                Some('{') => {
                    chars.next();
                    let (name, fallback) = self.parse_reference(&mut chars)?;
                    self.expand(&name, fallback, &mut out)?;
                }
                _ => out.push('$'),
            }
        }

        Ok(out)
    }

    fn expand(&mut self, name: &str, fallback: Fallback, out: &mut String) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(name) {
            out.push_str(&value);
            return Ok(());
        }
        match fallback {
            Fallback::Default(value) => out.push_str(&value),
            Fallback::Required(message) => {
                return Err(ConfigError::EnvVarNotSet {
                    var: name.to_string(),
                    location: if message.is_empty() {
                        self.source.display().to_string()
                    } else {
                        message
                    },
                });
            }
            Fallback::Warn => self.warnings.push(LoadWarning {
                message: format!("environment variable '{name}' is not set, using empty string"),
                location: Some(self.source.display().to_string()),
            }),
        }
        Ok(())
    }

    fn parse_reference(&self, chars: &mut Peekable<Chars<'_>>) -> Result<(String, Fallback), ConfigError> {
        let mut name = String::new();
        while let Some(c) = chars.next() {
            match c {
                '}' => return Ok((name, Fallback::Warn)),
                ':' if chars.peek() == Some(&'-') => {
                    chars.next();
                    let value = self.read_until_close(chars)?;
                    return Ok((name, Fallback::Default(value)));
                }
                ':' if chars.peek() == Some(&'?') => {
                    chars.next();
                    let message = self.read_until_close(chars)?;
                    return Ok((name, Fallback::Required(message)));
                }
                _ => name.push(c),
            }
        }
        Err(self.unclosed(&name))
    }

    /// Reads up to the matching `}`, keeping nested braces.
    fn read_until_close(&self, chars: &mut Peekable<Chars<'_>>) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1_usize;
        for c in chars.by_ref() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                }
                _ => {}
            }
            value.push(c);
        }
        Err(self.unclosed(&value))
    }

    fn unclosed(&self, fragment: &str) -> ConfigError {
        ConfigError::ParseError {
            path: PathBuf::from(self.source),
            line: None,
            message: format!("unclosed environment variable reference: ${{{fragment}"),
        }
    }
}

/// Reads a numeric limit from the environment, falling back to `default`.
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn substitute(raw: &str) -> (Result<String, ConfigError>, Vec<LoadWarning>) {
        let mut env = EnvSubstitution::new(Path::new("test.yaml"));
        let result = env.substitute(raw);
        (result, env.warnings)
    }

    #[test]
    fn env_set_variable_expands() {
        let (result, warnings) = substitute("path: ${PATH}");
        let result = result.unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
        assert!(warnings.is_empty());
    }

    #[test]
    fn env_default_used_when_unset() {
        let (result, _) = substitute("phrase: ${CAROUSEL_TEST_UNSET_PHRASE_Q1:-!img}");
        assert_eq!(result.unwrap(), "phrase: !img");
    }

    #[test]
    fn env_default_keeps_nested_braces() {
        let (result, _) = substitute("x: ${CAROUSEL_TEST_UNSET_NESTED_Q1:-{a: 1}}");
        assert_eq!(result.unwrap(), "x: {a: 1}");
    }

    #[test]
    fn env_required_missing_is_error() {
        let (result, _) = substitute("url: ${CAROUSEL_TEST_REQUIRED_Q1:?alert sound}");
        match result {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "CAROUSEL_TEST_REQUIRED_Q1");
                assert_eq!(location, "alert sound");
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn env_missing_without_default_warns() {
        let (result, warnings) = substitute("name: ${CAROUSEL_TEST_UNSET_WARN_Q1}");
        assert_eq!(result.unwrap(), "name: ");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("CAROUSEL_TEST_UNSET_WARN_Q1"));
    }

    #[test]
    fn escaped_dollar() {
        let (result, _) = substitute("alert_text: $$5 $x");
        assert_eq!(result.unwrap(), "alert_text: $5 $x");
    }

    #[test]
    fn unclosed_reference_is_error() {
        let (result, _) = substitute("name: ${OOPS");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn load_from_str_freezes_config() {
        let loader = ConfigLoader::with_defaults();
        let result = loader
            .load_from_str("pool:\n  items: [a.png, b.png]\n", Path::new("inline"))
            .unwrap();
        assert_eq!(result.config.pool.items.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn load_accepts_multi_word_phrase() {
        let loader = ConfigLoader::with_defaults();
        let result = loader
            .load_from_str(
                "pool:\n  items: [a.png]\ncommand:\n  phrase: \"!show img\"\n",
                Path::new("w.yaml"),
            )
            .unwrap();
        assert_eq!(result.config.command.phrase, "!show img");
    }

    #[test]
    fn load_reports_validation_errors() {
        let loader = ConfigLoader::with_defaults();
        let err = loader
            .load_from_str("pool:\n  items: []\n", Path::new("inline"))
            .unwrap_err();
        match err {
            ConfigError::ValidationError { errors, .. } => {
                assert_eq!(errors[0].path, "pool.items");
            }
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn load_surfaces_validation_warnings() {
        let loader = ConfigLoader::with_defaults();
        let result = loader
            .load_from_str("pool:\n  items: [a.png, a.png]\n", Path::new("inline"))
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some("pool.items[1]"));
    }

    #[test]
    fn empty_document_is_rejected() {
        let loader = ConfigLoader::with_defaults();
        let err = loader.load_from_str("", Path::new("inline")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn syntax_error_carries_line() {
        let loader = ConfigLoader::with_defaults();
        let err = loader
            .load_from_str("pool:\n  items: [a.png\n", Path::new("inline"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { line: Some(_), .. }));
    }

    #[test]
    fn bom_is_stripped() {
        let loader = ConfigLoader::with_defaults();
        assert!(
            loader
                .load_from_str("\u{feff}pool:\n  items: [a.png]\n", Path::new("inline"))
                .is_ok()
        );
    }

    #[test]
    fn size_limit_enforced() {
        let loader = ConfigLoader::new(LoaderOptions {
            config_limits: ConfigLimits {
                max_config_size: 8,
                ..ConfigLimits::default()
            },
        });
        let err = loader
            .load_from_str("pool:\n  items: [a.png]\n", Path::new("inline"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pool:\n  items: [x.png]").unwrap();
        let result = ConfigLoader::with_defaults().load(file.path()).unwrap();
        assert_eq!(result.config.pool.items, ["x.png"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ConfigLoader::with_defaults()
            .load(Path::new("/definitely/not/here.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }
}
