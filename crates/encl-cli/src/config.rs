//! CLI configuration.
//!
//! Values are resolved in layers, highest precedence first:
//! command-line flags, environment variables, the config file, defaults.
//! Flags and environment variables are merged by clap before they reach
//! [`Overrides`], so this module only has to place them above the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::BasicAuth;
use crate::{CliError, CliResult};

/// Default API server URL.
pub const DEFAULT_API_SERVER_URL: &str = "https://api.enclave.io";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Discriminator value of a policy that matches every key: every role when
/// counting by role, every resource group when counting by group.
pub const DEFAULT_WILDCARD: &str = "*";

/// Config file name looked up in the search directories.
pub const CONFIG_FILE_NAME: &str = "encl.toml";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}

/// Config file contents. Every field is optional so that a partial file only
/// overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// API server URL.
    pub api_server_url: Option<String>,
    /// Basic authentication credentials.
    pub auth: Option<FileAuth>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Policy value that matches every role or resource group.
    pub wildcard: Option<String>,
    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

/// Credentials section of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuth {
    /// Username.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// API server URL.
    pub api_server_url: Option<String>,
    /// Username.
    pub username: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Output format.
    pub output_format: Option<OutputFormat>,
}

/// Fully resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// API server URL.
    pub api_server_url: String,
    /// Credentials, if any layer supplied a username or password.
    pub auth: Option<BasicAuth>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Policy value that matches every role or resource group.
    pub wildcard: String,
    /// Output format.
    pub output_format: OutputFormat,
    /// Config file that contributed to this configuration.
    pub source: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::from_layers(FileConfig::default(), None, &Overrides::default())
    }
}

impl CliConfig {
    /// Loads the configuration.
    ///
    /// An explicit config path must exist and parse. Implicit search paths
    /// are optional, and a file that fails to parse there is skipped.
    pub fn load(explicit: Option<&Path>, overrides: &Overrides) -> CliResult<Self> {
        if let Some(path) = explicit {
            let file = Self::read_file(path)?;
            return Self::from_layers(file, Some(path.to_path_buf()), overrides).validate();
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::read_file(&path) {
                Ok(file) => return Self::from_layers(file, Some(path), overrides).validate(),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Failed to load config file");
                }
            }
        }

        tracing::debug!("Config file not found, using defaults and overrides");
        Self::from_layers(FileConfig::default(), None, overrides).validate()
    }

    /// Rejects values no request could work with.
    pub fn validate(self) -> CliResult<Self> {
        if self.request_timeout_secs == 0 {
            return Err(CliError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }

    /// Merges the file layer, the override layer and the defaults.
    pub fn from_layers(file: FileConfig, source: Option<PathBuf>, overrides: &Overrides) -> Self {
        let file_auth = file.auth.unwrap_or_default();

        let username = non_empty(overrides.username.clone()).or(non_empty(file_auth.username));
        let password = non_empty(overrides.password.clone()).or(non_empty(file_auth.password));
        let auth = if username.is_some() || password.is_some() {
            Some(BasicAuth::new(
                username.unwrap_or_default(),
                password.unwrap_or_default(),
            ))
        } else {
            None
        };

        Self {
            api_server_url: non_empty(overrides.api_server_url.clone())
                .or(non_empty(file.api_server_url))
                .unwrap_or_else(|| DEFAULT_API_SERVER_URL.to_string()),
            auth,
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            wildcard: non_empty(file.wildcard).unwrap_or_else(|| DEFAULT_WILDCARD.to_string()),
            output_format: overrides
                .output_format
                .or(file.output_format)
                .unwrap_or_default(),
            source,
        }
    }

    /// Reads and parses a config file.
    pub fn read_file(path: &Path) -> CliResult<FileConfig> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            CliError::Config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Config file locations, highest precedence first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".").join(CONFIG_FILE_NAME)];
        if let Some(home) = dirs_next::home_dir() {
            paths.push(home.join(".enclave").join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from("/etc/enclave").join(CONFIG_FILE_NAME));
        paths
    }

    /// Returns the credentials or a configuration error.
    pub fn require_auth(&self) -> CliResult<&BasicAuth> {
        self.auth
            .as_ref()
            .ok_or_else(|| CliError::Config("authentication not configured".to_string()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
