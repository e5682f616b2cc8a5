//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! This binary reads `CommandEnvelope` messages as newline-delimited JSON
//! from stdin, dispatches them through the host command channel, and writes
//! `ResponseEnvelope` and `EventEnvelope` messages to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.
//!
//! Usage: `polydraw-host [CONFIG_PATH]` (defaults to the platform config dir).

use std::path::PathBuf;

use polydraw::PolydrawConfig;
use polydraw::host::handler::PolydrawHost;
use polydraw::host::stdio::{EVENT_CAPACITY, run_stdio_bridge};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("polydraw=info,polydraw_search=info")
            }),
        )
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(PolydrawConfig::default_config_path);
    let mut config = PolydrawConfig::load_or_default(&config_path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", config_path.display()))?;
    config.apply_env_overrides();

    if config.search.access_token().is_none() {
        tracing::warn!("no Mapbox access token configured; searching Nominatim only");
    }

    tracing::info!(
        config = %config_path.display(),
        drawing = %config.storage.drawing_path.display(),
        locale = config.ui.locale.tag(),
        "polydraw-host starting"
    );

    let (event_tx, _event_rx) = tokio::sync::broadcast::channel(EVENT_CAPACITY);
    let host = PolydrawHost::from_config(
        &config,
        tokio::runtime::Handle::current(),
        event_tx.clone(),
    )
    .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?
    .with_config_path(config_path.clone());

    run_stdio_bridge(host, event_tx).await.map_err(|e| {
        tracing::error!(error = %e, "polydraw-host exited with error");
        anyhow::anyhow!("polydraw-host failed: {e}")
    })?;

    tracing::info!("polydraw-host shut down cleanly");
    Ok(())
}
