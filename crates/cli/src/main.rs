//! `story-sync` entry point.
//!
//! This binary is the composition root for the relay. Responsibilities:
//!
//! 1. **Parse settings**: read secrets and deployment coordinates from flags
//!    or the environment with `clap`. Missing or empty values stop the
//!    process with a usage error.
//! 2. **Wire observability**: install `tracing-subscriber` with a JSON layer
//!    and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry OTLP
//!    exporter. Every span and event emitted in the workspace flows through it.
//!    The owner mapping is then loaded from the YAML config file; a problem
//!    there stops the process before the server binds.
//! 3. **Construct infrastructure**: build one shared `reqwest::Client` and the
//!    [`tracker::TrackerClient`] and [`github::GitHubClient`] adapters on top
//!    of it.
//! 4. **Serve**: hand everything to [`listener::serve`] until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use github::GitHubClient;
use listener::{AppState, BasicAuthCredentials};
use tracing::info;
use tracker::TrackerClient;

mod config;
mod telemetry;

use config::{ConfigFile, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    let _telemetry = telemetry::init()?;

    let file = ConfigFile::load(&settings.config_path)?;
    match &file.tracker_id_to_github_username_mapping {
        Some(mapping) => info!(entries = mapping.len(), "Loaded owner mapping"),
        None => info!("No owner mapping configured; assignees will not be changed"),
    }

    let http = reqwest::Client::builder()
        .timeout(settings.http_timeout())
        .build()
        .context("building HTTP client")?;

    let state = AppState {
        resolver: Arc::new(TrackerClient::new(
            http.clone(),
            settings.tracker_api_token,
        )),
        issues: Arc::new(GitHubClient::new(
            http,
            settings.github_org,
            settings.github_repo,
            settings.github_token,
        )),
        owners: file.tracker_id_to_github_username_mapping,
        credentials: BasicAuthCredentials::new(
            settings.basic_auth_username,
            settings.basic_auth_password,
        ),
    };

    listener::serve(settings.listen_addr, state).await?;
    Ok(())
}
