mod metrics;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use changelog_jira_core::{
    load_config, validate_config, IssueLookup, JiraClient, Pipeline, SanitizedConfig,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the config file
const CONFIG_ENV: &str = "CHANGELOG_JIRA_CONFIG";

/// Config file used when present and `CHANGELOG_JIRA_CONFIG` is unset
const DEFAULT_CONFIG_PATH: &str = "changelog-jira.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("changelog-jira {}", VERSION);

    // Determine config path; without a file everything comes from the environment
    let config_path = match std::env::var(CONFIG_ENV) {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        }
    };

    // Load configuration
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("No config file, reading configuration from environment"),
    }
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Create issue lookup client
    let lookup: Arc<dyn IssueLookup> =
        Arc::new(JiraClient::new(&config.jira).context("Failed to create Jira client")?);
    info!(
        "Using {} issue lookup at {}",
        lookup.name(),
        config.jira.rest_base_url()
    );

    let pipeline = Pipeline::new(&config, lookup).context("Failed to build pipeline")?;

    let start = Instant::now();
    let summary = pipeline.run().await.context("Changelog generation failed")?;
    metrics::RUN_DURATION.observe(start.elapsed().as_secs_f64());
    metrics::TICKETS_FOUND.set(summary.tickets as i64);

    info!(
        "Wrote {:?}: {} entries in {} blocks, {}/{} issues resolved",
        config.changelog.output, summary.entries, summary.blocks, summary.resolved, summary.tickets
    );

    if let Some(path) = &config.metrics.textfile {
        metrics::write_textfile(path).await?;
        info!("Metrics written to {:?}", path);
    }

    Ok(())
}
