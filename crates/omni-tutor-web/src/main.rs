//! Omni AI Learning Assistant: browser chat tutor.
//!
//! Serves the chat page and streams tutor replies from an OpenAI-compatible
//! completion endpoint (DeepSeek by default).
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run -p omni-tutor-web
//! OPENAI_API_KEY=sk-... cargo run -p omni-tutor-web -- --port 8080 -v
//! cargo run -p omni-tutor-web -- --secrets ~/.config/omni-tutor/secrets.toml
//! ```
//!
//! Then open the printed URL in a browser.
//!
//! ## Sending messages without the page
//!
//! **WebSocket** (connect to `/ws`):
//! ```json
//! {"type": "chat", "message": "What is 2+2?", "subject": "Mathematics", "style": "Concise"}
//! ```
//!
//! **REST** (`POST /api/sessions`, then `POST /api/sessions/{id}/chat`):
//! ```json
//! {"message": "What is 2+2?", "subject": "Mathematics", "style": "Concise", "temperature": 0.3}
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use omni_tutor::credentials::CredentialSource;
use omni_tutor::prelude::*;
use omni_tutor::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SECRETS_PATH};
use omni_tutor_web::{WebConfig, spawn_web};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Omni AI Learning Assistant.
#[derive(Parser)]
#[command(about = "Subject tutor chat with a browser-based UI")]
struct Args {
    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port for the web UI server.
    #[arg(long, default_value_t = 8501)]
    port: u16,

    /// Model name sent to the completion endpoint.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible provider.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Environment variable holding the API key.
    #[arg(long, default_value = DEFAULT_API_KEY_ENV)]
    api_key_env: String,

    /// TOML secrets file consulted when the variable is unset.
    #[arg(long, default_value = DEFAULT_SECRETS_PATH)]
    secrets: PathBuf,

    /// Cap on tokens generated per reply.
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Serve this directory instead of the built-in page.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match args.verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // 1. Completion client. The key is looked up again on every turn, so a
    //    missing key only surfaces as a per-turn configuration error.
    let credentials = CredentialResolver::new(&args.api_key_env, &args.secrets);
    match credentials.resolve_with_source() {
        Ok((_, CredentialSource::Environment)) => {
            info!("Using API key from ${}", args.api_key_env);
        }
        Ok((_, CredentialSource::SecretsFile)) => {
            info!("Using API key from {}", args.secrets.display());
        }
        Err(e) => warn!("{e}; questions will fail until a key is provided"),
    }

    let client = ChatClient::new(ClientConfig {
        base_url: args.base_url,
        credentials,
        ..Default::default()
    })
    .map_err(|e| e.to_string())?;
    info!("Completion endpoint: {} (model {})", client.endpoint(), args.model);

    // 2. Spawn the web server.
    let web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
        static_dir: args.static_dir,
        settings: ModelSettings {
            model: args.model,
            max_tokens: args.max_tokens,
        },
    };
    let (addr, sessions) = spawn_web(Arc::new(client), web_config)
        .await
        .map_err(|e| format!("failed to start web server: {e}"))?;
    println!("Omni AI Learning Assistant: http://{addr}");

    // 3. Run until interrupted.
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for Ctrl-C: {e}"))?;
    info!("Shutting down ({} live sessions)", sessions.len());
    Ok(())
}
