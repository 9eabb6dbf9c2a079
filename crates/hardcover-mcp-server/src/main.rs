use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use hardcover_mcp_server::errors::ServerError;
use hardcover_mcp_server::graphql::GraphQLClient;
use hardcover_mcp_server::server::Server;
use tracing::info;

mod runtime;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, clap::Parser)]
#[command(
    version,
    styles = STYLES,
    about = "Hardcover MCP Server - search books and manage a reading library from an AI agent",
)]
struct Args {
    /// Path to the config file
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: runtime::Config = match Args::parse().config {
        Some(config_path) => runtime::read_config(config_path)?,
        None => runtime::read_config_from_env()?,
    };

    let _guard = runtime::setup_logging(&config)?;

    info!(
        "Hardcover MCP Server v{} // Licensed under MIT",
        std::env!("CARGO_PKG_VERSION")
    );

    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ServerError::EnvironmentVariable("HARDCOVER_API_KEY".to_string()))?;
    let settings = config.tool_settings();

    let client = GraphQLClient::new(
        config.endpoint.into_inner(),
        &api_key,
        config.timeout,
        config.headers,
    )?;
    info!(
        endpoint = %client.endpoint(),
        timeout = ?config.timeout,
        max_search_limit = settings.max_search_limit,
        "Configured Hardcover client"
    );

    Ok(Server::builder()
        .transport(config.transport)
        .client(client)
        .settings(settings)
        .build()
        .start()
        .await?)
}
