//! Startup configuration.
//!
//! Secrets and deployment coordinates come from flags or the environment
//! through `clap`. The owner mapping comes from a YAML file because it is
//! edited by people and mounted into the container.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use pipeline::{OwnerMapping, SyncError};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/config/config.yaml";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// YAML file
// ---------------------------------------------------------------------------

/// Contents of the YAML configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// `None` disables owner to assignee propagation.
    #[serde(default)]
    pub tracker_id_to_github_username_mapping: Option<OwnerMapping>,
}

impl ConfigFile {
    pub fn parse(yaml: &str) -> Result<Self, SyncError> {
        // An empty document is YAML null; treat it as an empty file.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| SyncError::Configuration {
            message: format!("could not parse config file as YAML: {e}"),
        })
    }

    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| SyncError::Configuration {
            message: format!("could not read config file {}: {e}", path.display()),
        })?;
        Self::parse(&yaml)
    }
}

// ---------------------------------------------------------------------------
// Command line and environment
// ---------------------------------------------------------------------------

/// Relays Pivotal Tracker activity webhooks to the linked GitHub issues.
///
/// Every setting can be given as a flag or through its environment variable.
#[derive(Parser)]
#[command(name = "story-sync")]
#[command(version)]
pub struct Settings {
    /// YAML file holding the Tracker owner to GitHub login mapping
    #[arg(long, env = "STORY_SYNC_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config_path: PathBuf,

    /// GitHub organisation that owns the issue repository
    #[arg(long, env = "GITHUB_ORG", value_parser = NonEmptyStringValueParser::new())]
    pub github_org: String,

    /// Repository holding the linked issues
    #[arg(long, env = "GITHUB_REPO", value_parser = NonEmptyStringValueParser::new())]
    pub github_repo: String,

    /// GitHub token with write access to the repository's issues
    #[arg(
        long,
        env = "GITHUB_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub github_token: String,

    /// Tracker API token used to read stories
    #[arg(
        long,
        env = "TRACKER_API_TOKEN",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub tracker_api_token: String,

    /// Username the webhook must present
    #[arg(long, env = "BASIC_AUTH_USERNAME", value_parser = NonEmptyStringValueParser::new())]
    pub basic_auth_username: String,

    /// Password the webhook must present
    #[arg(
        long,
        env = "BASIC_AUTH_PASSWORD",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    pub basic_auth_password: String,

    /// Address the webhook listener binds to
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Timeout of every outbound Tracker and GitHub call, in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: u64,
}

impl Settings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
