//! Core of the Omni AI Learning Assistant: a subject tutor that forwards
//! questions to a hosted, OpenAI-compatible chat-completion API and relays
//! the streamed answer.
//!
//! The crate owns everything between a UI shell and the remote endpoint:
//!
//! - [`catalog`]: the closed [`Subject`](catalog::Subject) and
//!   [`Style`](catalog::Style) sets offered by the UI.
//! - [`prompt`]: pure prompt assembly from (subject, style), the session
//!   history and the new user turn.
//! - [`session`]: the per-session, append-only [`ConversationHistory`](session::ConversationHistory)
//!   and the owned [`Session`](session::Session) context.
//! - [`credentials`]: API key resolution (environment first, secrets file second).
//! - [`client`]: the [`CompletionClient`](client::CompletionClient) seam and its
//!   reqwest-backed [`ChatClient`](client::ChatClient).
//! - [`api`]: SSE decoding of the streaming response.
//! - [`turn`]: one user turn end to end, appending the finished reply.
//!
//! # Getting started
//!
//! ```ignore
//! use omni_tutor::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let client = ChatClient::new(ClientConfig::default()).map_err(|e| e.to_string())?;
//!     let mut session = Session::new();
//!     let config = SessionConfig::new(Subject::Mathematics, Style::Concise, 0.3);
//!
//!     let reply = run_turn(
//!         &mut session,
//!         &client,
//!         &config,
//!         &ModelSettings::default(),
//!         "What is 2+2?",
//!         |fragment| print!("{fragment}"),
//!     )
//!     .await
//!     .map_err(|e| e.to_string())?;
//!
//!     println!("\n{} messages, last reply {} chars", session.history.len(), reply.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod client;
pub mod credentials;
pub mod error;
pub mod prelude;
pub mod prompt;
pub mod session;
pub mod turn;

use serde::{Deserialize, Serialize};

// ── Constants ──────────────────────────────────────────────────────

/// Base URL of the hosted completion provider. The client appends
/// `/chat/completions`.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Default model for all turns.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Environment variable consulted first for the API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Secrets store consulted when the environment variable is unset.
pub const DEFAULT_SECRETS_PATH: &str = ".omni-tutor/secrets.toml";

/// Title shown by UI shells.
pub const APP_TITLE: &str = "Omni AI Learning Assistant";

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in the conversation.
///
/// `System` only ever appears in outgoing requests; a session history holds
/// `User` and `Assistant` messages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message. Immutable once created.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body (OpenAI-compatible schema).
///
/// `temperature` is always serialized: `0.0` is a meaningful setting and
/// providers default to `1.0` when it is absent.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

/// Extra options honoured in streaming mode.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Ask the server to send a final chunk carrying token usage.
    pub include_usage: bool,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}
