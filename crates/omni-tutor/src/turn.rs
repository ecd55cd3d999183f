//! One user turn, end to end.
//!
//! [`run_turn`] is the only place a session history changes during a
//! conversation:
//!
//! 1. The prompt is assembled from the history as it was before the turn.
//! 2. The completion is started. A configuration error stops here and
//!    leaves the history untouched.
//! 3. The user message is appended. A remote error while starting the
//!    request, or anywhere in the stream, keeps it and appends nothing else.
//! 4. Each fragment is handed to `on_fragment` as it arrives.
//! 5. When the stream completes, the concatenated reply is appended as one
//!    assistant message.

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::client::CompletionClient;
use crate::error::TutorError;
use crate::prompt::assemble;
use crate::session::{Session, SessionConfig};
use crate::{DEFAULT_MODEL, Message};

/// Model parameters that do not come from the UI controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    /// Model identifier sent with every request.
    pub model: String,
    /// Optional cap on generated tokens.
    pub max_tokens: Option<u32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
        }
    }
}

/// Run one turn against `session` and return the full reply.
pub async fn run_turn(
    session: &mut Session,
    client: &dyn CompletionClient,
    config: &SessionConfig,
    settings: &ModelSettings,
    user_text: &str,
    mut on_fragment: impl FnMut(&str) + Send,
) -> Result<String, TutorError> {
    let request = assemble(config, &session.history, user_text).into_chat_request(
        settings.model.clone(),
        config.temperature(),
        settings.max_tokens,
    );

    info!(
        session = %session.id,
        subject = %config.subject,
        style = %config.style,
        temperature = config.temperature(),
        "Starting turn"
    );

    let mut fragments = match client.stream(request).await {
        Ok(stream) => stream,
        Err(e) => {
            if e.is_remote() {
                session.history.append(Message::user(user_text));
            }
            warn!(session = %session.id, kind = e.kind(), "Turn failed: {e}");
            return Err(e);
        }
    };

    session.history.append(Message::user(user_text));

    let mut reply = String::new();
    while let Some(fragment) = fragments.next().await {
        match fragment {
            Ok(text) => {
                on_fragment(&text);
                reply.push_str(&text);
            }
            Err(e) => {
                let e = TutorError::from(e);
                warn!(session = %session.id, kind = e.kind(), "Turn failed mid-stream: {e}");
                return Err(e);
            }
        }
    }

    debug!(session = %session.id, chars = reply.len(), "Turn complete");
    session.history.append(Message::assistant(reply.clone()));
    Ok(reply)
}
