//! Configuration file loading and parsing.

use crate::types::HttpSettings;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory (relative to the project root) holding the config file.
pub const CONFIG_DIR: &str = ".httpreq";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

const ENV_PATTERN: &str = r"\$\{([^}:]+)(?::-([^}]*))?\}";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file this loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Load `.httpreq/config.yaml`, falling back to defaults when absent.
    pub fn load(&self) -> Result<HttpSettings, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(HttpSettings::default());
        }

        Self::load_file(&config_path)
    }

    /// Load an explicit config file. A missing file is an error.
    pub fn load_file(path: impl AsRef<Path>) -> Result<HttpSettings, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse YAML text (after `${VAR}` expansion) and validate it.
    pub fn parse(contents: &str) -> Result<HttpSettings, ConfigError> {
        let expanded = expand_env_vars(contents)?;

        let settings: HttpSettings =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        validate(&settings)?;
        Ok(settings)
    }

    /// Save settings to `.httpreq/config.yaml`.
    pub fn save(&self, settings: &HttpSettings) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(settings).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(config_dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let re = Regex::new(ENV_PATTERN).map_err(|e| ConfigError::ValidationError {
        message: e.to_string(),
    })?;
    let mut result = content.to_string();

    for cap in re.captures_iter(content) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match.as_str(), &value);
    }

    Ok(result)
}

fn validate(settings: &HttpSettings) -> Result<(), ConfigError> {
    if settings.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            message: "timeout_ms must be greater than 0".to_string(),
        });
    }

    if settings.connect_timeout_ms == Some(0) {
        return Err(ConfigError::ValidationError {
            message: "connect_timeout_ms must be greater than 0 when set".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, contents: &str) {
        let config_dir = dir.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join(CONFIG_FILE), contents).unwrap();
    }

    #[test]
    fn test_load_defaults_when_no_file() {
        let dir = tempdir().unwrap();
        let settings = ConfigLoader::new(dir.path()).load().unwrap();
        assert_eq!(settings, HttpSettings::default());
    }

    #[test]
    fn test_load_config_from_yaml_file() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
timeout_ms: 5000
retry_count: 2
retry_backoff_ms: 250
user_agent: fetcher/1.0
default_headers:
  Accept: application/json
"#,
        );

        let settings = ConfigLoader::new(dir.path()).load().unwrap();

        assert_eq!(settings.timeout_ms, 5000);
        assert_eq!(settings.retry_count, 2);
        assert_eq!(settings.retry_backoff_ms, 250);
        assert_eq!(settings.user_agent.as_deref(), Some("fetcher/1.0"));
        assert_eq!(
            settings.default_headers.get("Accept").map(String::as_str),
            Some("application/json")
        );
        assert!(settings.connect_timeout_ms.is_none());
    }

    #[test]
    fn test_load_file_missing_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        match ConfigLoader::load_file(&missing) {
            Err(ConfigError::NotFound { path }) => assert_eq!(path, missing),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("HTTPREQ_TEST_RETRIES", "4");
        let settings = ConfigLoader::parse("retry_count: ${HTTPREQ_TEST_RETRIES}").unwrap();
        assert_eq!(settings.retry_count, 4);
        std::env::remove_var("HTTPREQ_TEST_RETRIES");
    }

    #[test]
    fn test_env_var_default() {
        let result = expand_env_vars("timeout_ms: ${HTTPREQ_NONEXISTENT:-1500}").unwrap();
        assert_eq!(result, "timeout_ms: 1500");
    }

    #[test]
    fn test_env_var_missing_error() {
        match expand_env_vars("user_agent: ${HTTPREQ_MISSING_VAR}") {
            Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "HTTPREQ_MISSING_VAR"),
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_zero_timeouts() {
        match ConfigLoader::parse("timeout_ms: 0") {
            Err(ConfigError::ValidationError { message }) => {
                assert!(message.contains("timeout_ms"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        match ConfigLoader::parse("connect_timeout_ms: 0") {
            Err(ConfigError::ValidationError { message }) => {
                assert!(message.contains("connect_timeout_ms"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_with_line_number() {
        let bad_yaml = r#"
retry_count: 1
default_headers: [unclosed
"#;
        match ConfigLoader::parse(bad_yaml) {
            Err(ConfigError::ParseError { line, .. }) => assert!(line.is_some()),
            other => panic!("Expected ParseError with line number, got {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());

        let mut settings = HttpSettings::default();
        settings.retry_count = 7;
        settings.connect_timeout_ms = Some(900);
        settings
            .default_headers
            .insert("X-Trace".to_string(), "on".to_string());

        loader.save(&settings).unwrap();
        assert!(loader.config_path().exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded, settings);
    }
}
