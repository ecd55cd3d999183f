//! Convenience re-exports for common `omni-tutor` types.
//!
//! Meant to be glob-imported by UI shells:
//!
//! ```ignore
//! use omni_tutor::prelude::*;
//! ```
//!
//! Wire-level types (SSE decoder, stream events) are left out; import
//! those from [`crate::api`] directly when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ChatRequest, Message, MessageRole};

// ── Catalog and prompt ──────────────────────────────────────────────
pub use crate::catalog::{Style, Subject};
pub use crate::prompt::{PromptRequest, SystemPromptBuilder, assemble, system_prompt};

// ── Session state ───────────────────────────────────────────────────
pub use crate::session::{ConversationHistory, Session, SessionConfig};

// ── Completion client ───────────────────────────────────────────────
pub use crate::client::{ChatClient, ClientConfig, CompletionClient, FragmentStream};
pub use crate::credentials::CredentialResolver;

// ── Turns and errors ────────────────────────────────────────────────
pub use crate::error::{ConfigError, RemoteError, TutorError};
pub use crate::turn::{ModelSettings, run_turn};
