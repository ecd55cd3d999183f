//! WebSocket message types.
//!
//! Both directions are JSON objects discriminated on a `type` field.

use serde::{Deserialize, Serialize};

use crate::snapshot::SessionSnapshot;

/// A message sent from the server to a WebSocket client.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Authoritative session state (on connect, after reset, after a failed turn).
    Snapshot { data: SessionSnapshot },
    /// The user's question, echoed for display as soon as it is accepted.
    UserMessage { content: String },
    /// Streaming token delta of the in-flight reply.
    TextDelta { delta: String },
    /// The finished reply, now part of the history.
    AssistantMessage { content: String },
    /// A failed turn or a rejected client message.
    Error { kind: String, message: String },
}

impl WsMessage {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        WsMessage::Error {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// A message sent from a WebSocket client to the server.
///
/// Subject and style arrive as raw strings so that values outside the
/// catalog are reported as configuration errors rather than dropped as
/// malformed frames.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submit a question with the control values at submission time.
    Chat {
        message: String,
        subject: String,
        style: String,
        #[serde(default)]
        temperature: Option<f32>,
    },
    /// Clear the conversation and greet for `subject`.
    Reset { subject: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_delta_serializes_with_type_tag() {
        let msg = WsMessage::TextDelta {
            delta: "hello".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "text_delta");
        assert_eq!(json["delta"], "hello");
    }

    #[test]
    fn error_serializes_kind_and_message() {
        let json = serde_json::to_value(WsMessage::error("configuration", "no key")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["kind"], "configuration");
        assert_eq!(json["message"], "no key");
    }

    #[test]
    fn assistant_message_serializes() {
        let msg = WsMessage::AssistantMessage {
            content: "4".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "assistant_message");
        assert_eq!(json["content"], "4");
    }

    #[test]
    fn chat_frame_deserializes_without_temperature() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"chat","message":"What is 2+2?","subject":"Mathematics","style":"Concise"}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Chat {
                message: "What is 2+2?".into(),
                subject: "Mathematics".into(),
                style: "Concise".into(),
                temperature: None,
            }
        );
    }

    #[test]
    fn reset_frame_deserializes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"reset","subject":"History"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Reset {
                subject: "History".into()
            }
        );
    }
}
