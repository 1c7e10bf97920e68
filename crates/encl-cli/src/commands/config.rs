//! Configuration commands.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, output};
use crate::CliConfig;

/// One resolved configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ConfigEntry {
    /// Parameter name.
    #[tabled(rename = "Parameter")]
    pub parameter: String,
    /// Effective value.
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Runs a config command.
pub fn run_config(cmd: ConfigCommand, config: &CliConfig, format: OutputFormat) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => {
            info("Current configuration of the enclave CLI");
            output(&entries(config), format)
        }
        ConfigCommand::Path => {
            match &config.source {
                Some(path) => println!("{}", path.display()),
                None => info("No config file found; using defaults, environment and flags"),
            }
            Ok(())
        }
    }
}

/// Flattens the configuration, masking the password.
pub fn entries(config: &CliConfig) -> Vec<ConfigEntry> {
    let entry = |parameter: &str, value: String| ConfigEntry {
        parameter: parameter.to_string(),
        value,
    };

    let (username, password) = match &config.auth {
        Some(auth) => (auth.username().to_string(), "****".to_string()),
        None => ("(not set)".to_string(), "(not set)".to_string()),
    };

    vec![
        entry("api_server_url", config.api_server_url.clone()),
        entry("auth.username", username),
        entry("auth.password", password),
        entry("request_timeout_secs", config.request_timeout_secs.to_string()),
        entry("wildcard", config.wildcard.clone()),
        entry("output_format", format!("{:?}", config.output_format).to_lowercase()),
        entry(
            "config_file",
            config
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        ),
    ]
}
