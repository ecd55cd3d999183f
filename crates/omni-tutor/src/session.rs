//! Per-session conversation state.
//!
//! A [`Session`] is the owned context a UI shell passes explicitly into
//! every turn. Its [`ConversationHistory`] is append-only, always starts
//! with an assistant greeting and is only cleared by an explicit reset.
//! Nothing here is shared between sessions or persisted.

use serde::Serialize;
use uuid::Uuid;

use crate::Message;
use crate::catalog::{Style, Subject};

/// Greeting seeded into every new history.
pub const SEED_GREETING: &str =
    "Hello! I am your Omni Learning Assistant. Please select a subject to start!";

/// Default creativity setting.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Greeting seeded after an explicit reset.
pub fn reset_greeting(subject: Subject) -> String {
    format!("Reset successful. Let's start discussing **{subject}**!")
}

/// Clamp a temperature into `[0.0, 1.0]`. Non-finite input falls back to
/// [`DEFAULT_TEMPERATURE`].
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        DEFAULT_TEMPERATURE
    }
}

/// UI control values captured when a turn is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SessionConfig {
    pub subject: Subject,
    pub style: Style,
    temperature: f32,
}

impl SessionConfig {
    pub fn new(subject: Subject, style: Style, temperature: f32) -> Self {
        Self {
            subject,
            style,
            temperature: clamp_temperature(temperature),
        }
    }

    /// Parse raw control values. Unknown subjects or styles are a
    /// configuration error; a missing temperature takes the default.
    pub fn parse(
        subject: &str,
        style: &str,
        temperature: Option<f32>,
    ) -> Result<Self, crate::error::ConfigError> {
        Ok(Self::new(
            subject.parse()?,
            style.parse()?,
            temperature.unwrap_or(DEFAULT_TEMPERATURE),
        ))
    }

    /// Sampling temperature, always within `[0.0, 1.0]`.
    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(Subject::default(), Style::default(), DEFAULT_TEMPERATURE)
    }
}

/// Ordered, append-only message list with at least one message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// A history holding only the seed greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(SEED_GREETING)],
        }
    }

    /// Add a message at the tail.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop everything and seed a reset greeting naming `subject`.
    pub fn clear(&mut self, subject: Subject) {
        self.messages.clear();
        self.messages.push(Message::assistant(reset_greeting(subject)));
    }

    /// All messages in chronological order.
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: a history always holds at least its greeting.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// One user's conversation context.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    pub history: ConversationHistory,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: ConversationHistory::new(),
        }
    }

    /// Clear the history and greet the user for `subject`.
    pub fn reset(&mut self, subject: Subject) {
        self.history.clear(subject);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
