// Standalone MCP server binary

use anyhow::{Context, Result};
use std::sync::Arc;
use zenodo_mcp::{build_registry, CachedDispatcher, McpServer, ServerSettings};
use zenodo_sdk::ZenodoClient;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Zenodo MCP Server starting...");

    let client = ZenodoClient::from_env().context("Failed to configure Zenodo client")?;
    let settings = ServerSettings::from_env();

    tracing::info!(
        cache_ttl_secs = settings.cache_ttl.as_secs(),
        download_dir = %settings.download_dir.display(),
        "Settings loaded"
    );

    let registry = build_registry(client, &settings).context("Failed to register tools")?;
    tracing::info!("Registered {} tools", registry.len());

    let dispatcher = CachedDispatcher::new(Arc::new(registry), &settings);
    McpServer::new(dispatcher).start().await?;

    Ok(())
}
