//! Google MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server exposing Gmail, Google Calendar and
//! Google Maps as tools over stdio.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use google_mcp_server_rust::config::Config;
use google_mcp_server_rust::gateway::Dispatcher;
use google_mcp_server_rust::google::{
    token_source_from_config, CalendarClient, GmailClient, MapsClient, TokenSource,
};
use google_mcp_server_rust::mcp::server::McpServer;
use google_mcp_server_rust::tools::{build_registry, Backends};

/// Google MCP Server
#[derive(Parser)]
#[command(name = "google-mcp-server")]
#[command(author, version, about = "Google MCP Server - Gmail, Calendar and Maps tools over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the authorized-user credentials file
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Timeout in seconds for each upstream request
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the available tools and exit
    Tools,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::new().context("failed to load configuration")?;
    if let Some(path) = cli.credentials {
        config = config.with_credentials_path(path);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }

    let backends = build_backends(&config).context("failed to set up Google clients")?;
    let registry = build_registry(&backends).context("failed to register tools")?;

    match cli.command {
        Some(Commands::Tools) => {
            for tool in registry.list() {
                println!("{:<28} {}", tool.name, tool.description);
            }
        }
        None => {
            if !config.credentials_exist() {
                tracing::warn!(
                    path = %config.credentials_path.display(),
                    "no Google credentials found; Gmail and Calendar tools will fail with an authentication error"
                );
            }
            if config.maps_api_key.is_none() {
                tracing::warn!("GOOGLE_MAPS_API_KEY is not set; Maps tools will fail with an authentication error");
            }

            tracing::info!(tools = registry.len(), "starting MCP server on stdio");
            let dispatcher = Dispatcher::new(Arc::new(registry), config.request_timeout);
            McpServer::new(dispatcher)
                .run_stdio()
                .await
                .context("MCP server stopped with an error")?;
        }
    }

    Ok(())
}

fn build_backends(config: &Config) -> anyhow::Result<Backends> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("google-mcp-server/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let tokens: Arc<dyn TokenSource> = Arc::from(token_source_from_config(config));

    Ok(Backends {
        gmail: Arc::new(GmailClient::new(http.clone(), Arc::clone(&tokens))),
        calendar: Arc::new(CalendarClient::new(http.clone(), tokens)),
        maps: Arc::new(MapsClient::new(http, config.maps_api_key.clone())),
    })
}
