use std::net::{IpAddr, SocketAddr};

use bon::bon;
use rmcp::ServiceExt as _;
use rmcp::transport::stdio;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::StreamableHttpService;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::ServerError;
use crate::graphql::GraphQLClient;
use crate::server_handler::HardcoverMcpServerHandler;
use crate::tools::ToolSettings;

/// A Hardcover MCP Server
pub struct Server {
    transport: Transport,
    client: GraphQLClient,
    settings: ToolSettings,
}

/// How the server talks to MCP clients
#[derive(Debug, Clone, Default, PartialEq, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transport {
    /// JSON-RPC over stdin and stdout
    #[default]
    Stdio,

    /// Streamable HTTP, served at `/mcp`
    StreamableHttp {
        /// The IP address to bind to
        #[serde(default = "defaults::address")]
        address: IpAddr,

        /// The port to bind to
        #[serde(default = "defaults::port")]
        port: u16,
    },
}

#[bon]
impl Server {
    #[builder]
    pub fn new(transport: Transport, client: GraphQLClient, settings: ToolSettings) -> Self {
        Self {
            transport,
            client,
            settings,
        }
    }

    /// Serve until the client disconnects or the process is asked to stop
    pub async fn start(self) -> Result<(), ServerError> {
        let handler = HardcoverMcpServerHandler::new(self.client, self.settings);

        match self.transport {
            Transport::StreamableHttp { address, port } => {
                info!(port = ?port, address = ?address, "Starting MCP server in Streamable HTTP mode");
                let listen_address = SocketAddr::new(address, port);
                let service = StreamableHttpService::new(
                    move || Ok(handler.clone()),
                    LocalSessionManager::default().into(),
                    Default::default(),
                );
                let router = axum::Router::new().nest_service("/mcp", service);

                let tcp_listener = tokio::net::TcpListener::bind(listen_address).await?;
                axum::serve(tcp_listener, router)
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
            }
            Transport::Stdio => {
                info!("Starting MCP server in stdio mode");
                let service = handler
                    .serve(stdio())
                    .await
                    .inspect_err(|e| {
                        error!("serving error: {:?}", e);
                    })
                    .map_err(|e| ServerError::McpInitializeError(e.to_string()))?;

                tokio::select! {
                    quit = service.waiting() => {
                        let reason = quit?;
                        info!(?reason, "MCP client disconnected");
                    }
                    () = shutdown_signal() => {}
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

mod defaults {
    use std::net::{IpAddr, Ipv4Addr};

    pub(super) fn address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    pub(super) const fn port() -> u16 {
        5000
    }
}
