//! Sync configuration file handling

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// JIRA integration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraIntegration {
    /// JIRA instance URL (e.g., "https://company.atlassian.net")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Environment variable holding the account email (enables basic auth)
    #[serde(default = "default_email_env")]
    pub email_env: String,

    /// Page size for search requests
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_token_env() -> String {
    "JIRA_API_TOKEN".to_string()
}

fn default_email_env() -> String {
    "JIRA_EMAIL".to_string()
}

fn default_max_results() -> u32 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for JiraIntegration {
    fn default() -> Self {
        Self {
            url: None,
            token_env: default_token_env(),
            email_env: default_email_env(),
            max_results: default_max_results(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl JiraIntegration {
    /// Read the API token from the configured environment variable
    pub fn token(&self) -> Option<String> {
        read_env(&self.token_env)
    }

    /// Read the account email from the configured environment variable
    pub fn email(&self) -> Option<String> {
        read_env(&self.email_env)
    }
}

fn read_env(var: &str) -> Option<String> {
    std::env::var(var.trim_start_matches('$'))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// beads (bd) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeadsSettings {
    /// bd executable
    #[serde(default = "default_program")]
    pub program: String,

    /// Directory to run bd in (defaults to the current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Flags passed to bd before every command (e.g. `--no-daemon`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_flags: Vec<String>,
}

fn default_program() -> String {
    "bd".to_string()
}

impl Default for BeadsSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            workdir: None,
            global_flags: Vec::new(),
        }
    }
}

/// Sync behavior settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Label marking issues created by this tool
    #[serde(default = "default_marker_label")]
    pub marker_label: String,
}

fn default_marker_label() -> String {
    "jira-synced".to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            marker_label: default_marker_label(),
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub jira: JiraIntegration,

    #[serde(default)]
    pub beads: BeadsSettings,

    #[serde(default)]
    pub sync: SyncSettings,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the default config file, falling back to defaults if it does not exist
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::SyncError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading sync configuration");

        let content = fs::read_to_string(path)?;
        // An empty file is a valid "all defaults" config
        let config: Self = if content.trim().is_empty() {
            Self::new()
        } else {
            serde_yaml::from_str(&content)?
        };

        tracing::debug!(
            jira_url = ?config.jira.url,
            marker = %config.sync.marker_label,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Get the default config path (~/.config/jira-beads-sync/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("jira-beads-sync");
        path.push("config.yaml");
        path
    }

    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.sync.marker_label.trim().is_empty() {
            return Err(crate::SyncError::Config(
                "sync.marker_label must not be empty".to_string(),
            ));
        }

        if self.jira.max_results == 0 {
            return Err(crate::SyncError::Config(
                "jira.max_results must be at least 1".to_string(),
            ));
        }

        if self.jira.timeout_secs == 0 {
            return Err(crate::SyncError::Config(
                "jira.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.beads.program.trim().is_empty() {
            return Err(crate::SyncError::Config(
                "beads.program must not be empty".to_string(),
            ));
        }

        if let Some(ref url) = self.jira.url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(crate::SyncError::Config(format!(
                    "jira.url must start with http:// or https://: {}",
                    url
                )));
            }
        }

        Ok(())
    }
}
