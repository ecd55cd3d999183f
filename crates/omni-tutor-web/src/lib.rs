//! Browser-based chat UI for the omni-tutor learning assistant.
//!
//! `omni-tutor-web` provides an axum web server with an embedded chat page,
//! a WebSocket endpoint that streams replies as they are generated, and a
//! REST API for clients that prefer request/response turns.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use omni_tutor::prelude::*;
//! use omni_tutor_web::{WebConfig, spawn_web};
//!
//! let client = ChatClient::new(ClientConfig::default())?;
//! let (addr, _sessions) = spawn_web(Arc::new(client), WebConfig::default()).await?;
//! println!("Open http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──ws {chat, reset}──▶ ws.rs ──run_turn──▶ CompletionClient ──SSE──▶ endpoint
//!    ▲                            │
//!    └──snapshot / text_delta / assistant_message / error
//!
//! curl ──/api/sessions/*──▶ api.rs ──run_turn──▶ CompletionClient
//! ```
//!
//! Every session lives in a [`SessionRegistry`]. A WebSocket connection gets
//! its own session for as long as it stays open; REST sessions live until
//! deleted.

mod api;
pub mod protocol;
pub mod registry;
mod server;
pub mod snapshot;
mod ws;

pub use api::INDEX_HTML;
pub use protocol::{ClientMessage, WsMessage};
pub use registry::{SessionRegistry, SharedSession};
pub use snapshot::{OptionsSnapshot, SessionSnapshot};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use omni_tutor::client::CompletionClient;
use omni_tutor::turn::ModelSettings;
use tracing::info;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:8501`.
    pub bind_addr: SocketAddr,
    /// Directory to serve instead of the embedded page.
    ///
    /// If `None`, `GET /` returns the built-in chat page.
    pub static_dir: Option<PathBuf>,
    /// Model name and token cap sent with every completion request.
    pub settings: ModelSettings,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            static_dir: None,
            settings: ModelSettings::default(),
        }
    }
}

/// Spawn the web server on a Tokio task.
///
/// Returns the bound address and the registry holding every live session.
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(
    client: Arc<dyn CompletionClient>,
    config: WebConfig,
) -> std::io::Result<(SocketAddr, SessionRegistry)> {
    let sessions = SessionRegistry::new();
    let state = api::AppState {
        sessions: sessions.clone(),
        client,
        settings: Arc::new(config.settings),
    };
    let router = server::build_router(state, config.static_dir);
    let addr = server::start_server(router, config.bind_addr).await?;
    info!("Listening on http://{addr}");
    Ok((addr, sessions))
}
