//! Runtime configuration
//!
//! Everything the driver and client need is carried in [`Config`] and passed
//! in explicitly. Values come from a TOML file (every section optional),
//! then CLI overrides; the API key is read from the environment variable the
//! config names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::llm::ToolChoice;
use crate::llm::result_handler::ResultHandlerConfig;

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "turnloop.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("API key not found: set the {var} environment variable")]
    MissingApiKey { var: String },
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub sampling: SamplingConfig,
    pub driver: DriverConfig,
}

/// Endpoint location, model and credentials source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://text.octoai.run/v1".to_string(),
            model: "meta-llama-3.1-8b-instruct".to_string(),
            api_key_env: "OCTOAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ConfigError> {
        Self::api_key_from(&self.api_key_env, |var| std::env::var(var).ok())
    }

    fn api_key_from(
        var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        lookup(var)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                var: var.to_string(),
            })
    }
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub presence_penalty: f32,
    pub tool_choice: ToolChoice,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 10_000,
            top_p: 1.0,
            presence_penalty: 0.0,
            tool_choice: ToolChoice::Auto,
        }
    }
}

/// What the driver does when the model names a tool nobody registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownToolPolicy {
    /// Append a synthetic tool result saying no handler exists
    #[default]
    ErrorResult,
    /// Append nothing for that call; the endpoint may reject the next turn
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Upper bound on model requests per exchange
    pub max_turns: usize,
    pub unknown_tool: UnknownToolPolicy,
    /// Tool results above this many bytes are truncated or replaced
    pub result_limit: usize,
    pub truncate_results: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            unknown_tool: UnknownToolPolicy::ErrorResult,
            result_limit: 256_000,
            truncate_results: true,
        }
    }
}

impl DriverConfig {
    pub fn result_handler(&self) -> ResultHandlerConfig {
        ResultHandlerConfig {
            max_size_bytes: self.result_limit,
            truncate_enabled: self.truncate_results,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `turnloop.toml` in the
    /// working directory when present, or fall back to defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "client.base_url must not be empty".to_string(),
            });
        }
        if self.client.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "client.model must not be empty".to_string(),
            });
        }
        if self.driver.max_turns == 0 {
            return Err(ConfigError::Invalid {
                message: "driver.max_turns must be at least 1".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.sampling.temperature) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "sampling.temperature must be within 0.0..=2.0, got {}",
                    self.sampling.temperature
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_demo_scripts() {
        let config = Config::default();
        assert_eq!(config.client.model, "meta-llama-3.1-8b-instruct");
        assert_eq!(config.client.api_key_env, "OCTOAI_API_KEY");
        assert_eq!(config.sampling.temperature, 0.0);
        assert_eq!(config.sampling.max_tokens, 10_000);
        assert_eq!(config.sampling.tool_choice, ToolChoice::Auto);
        assert_eq!(config.driver.unknown_tool, UnknownToolPolicy::ErrorResult);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[client]
model = "meta-llama-3.1-70b-instruct"

[sampling]
temperature = 0.1
max_tokens = 4096
tool_choice = "required"

[driver]
unknown_tool = "skip"
max_turns = 3
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.client.model, "meta-llama-3.1-70b-instruct");
        assert_eq!(config.client.base_url, ClientConfig::default().base_url);
        assert_eq!(config.sampling.max_tokens, 4096);
        assert_eq!(config.sampling.tool_choice, ToolChoice::Required);
        assert_eq!(config.driver.unknown_tool, UnknownToolPolicy::Skip);
        assert_eq!(config.driver.max_turns, 3);
        assert!(config.driver.truncate_results);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[driver]\nmax_turns = 0").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client\nmodel = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_api_key_lookup() {
        let key = ClientConfig::api_key_from("MY_KEY", |_| Some("  secret \n".to_string()));
        assert_eq!(key.unwrap(), "secret");

        let err = ClientConfig::api_key_from("MY_KEY", |_| Some("   ".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "API key not found: set the MY_KEY environment variable"
        );

        assert!(ClientConfig::api_key_from("MY_KEY", |_| None).is_err());
    }
}
