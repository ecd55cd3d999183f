//! System prompt assembly.
//!
//! [`system_prompt`] substitutes the subject into a fixed role line, picks
//! the instruction block of the selected [`Style`] and appends the
//! guidelines every turn carries (LaTeX for formulas, reaction equations,
//! fenced code, refusal of off-topic gossip). [`assemble`] combines that
//! with the session history and the new user turn into a [`PromptRequest`].
//!
//! Temperature never appears in prompt text; it only travels as a model
//! parameter in [`PromptRequest::into_chat_request`].

use crate::catalog::{Style, Subject};
use crate::session::{ConversationHistory, SessionConfig};
use crate::{ChatRequest, Message, StreamOptions};

/// Builder for multi-section system prompts.
///
/// Sections are joined with double newlines. Empty sections are skipped.
///
/// # Example
///
/// ```
/// use omni_tutor::prompt::SystemPromptBuilder;
///
/// let prompt = SystemPromptBuilder::new("You are a tutor.")
///     .section("Teaching Style", "Be brief.")
///     .section("Empty", "")
///     .build();
///
/// assert!(prompt.contains("## Teaching Style"));
/// assert!(!prompt.contains("## Empty"));
/// ```
pub struct SystemPromptBuilder {
    sections: Vec<String>,
    heading_prefix: String,
}

impl SystemPromptBuilder {
    /// Create a new builder with an initial preamble section.
    ///
    /// The preamble is included as-is. Subsequent sections added via
    /// `section()` get `## ` prefixed headings.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            sections: vec![preamble.into()],
            heading_prefix: "##".to_string(),
        }
    }

    /// Append a named section with a markdown heading.
    ///
    /// Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections
                .push(format!("{} {heading}\n\n{content}", self.heading_prefix));
        }
        self
    }

    /// Append a section rendered as a numbered list, one item per line.
    pub fn numbered_section<I, S>(self, heading: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        self.section(heading, body)
    }

    /// Build the final system prompt by joining all sections with double newlines.
    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

/// Guidelines embedded in every prompt, in order.
fn guidelines(subject: Subject) -> [String; 5] {
    [
        "If formulas are involved, you MUST use LaTeX format (e.g., $E=mc^2$).".to_string(),
        "If biology/chemical reactions are involved, clearly list the reaction equations."
            .to_string(),
        "If code is involved, use fenced code blocks.".to_string(),
        format!(
            "Sternly refuse to answer entertainment or gossip questions irrelevant to {subject}."
        ),
        "Always respond in English.".to_string(),
    ]
}

/// Build the system prompt for a subject and teaching style.
pub fn system_prompt(subject: Subject, style: Style) -> String {
    SystemPromptBuilder::new(format!(
        "You are a senior expert tutor in the field of {subject}."
    ))
    .section("Teaching Style", style.instructions())
    .numbered_section("Guidelines", guidelines(subject))
    .build()
}

/// A fully specified request for one turn. Derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub system_instructions: String,
    /// History as it was before this turn.
    pub history: Vec<Message>,
    pub user_turn: String,
}

impl PromptRequest {
    /// Outgoing message list: system prompt, history, then the new user turn.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(&self.system_instructions));
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(&self.user_turn));
        messages
    }

    /// Convert into a streaming chat request for `model`.
    pub fn into_chat_request(
        self,
        model: impl Into<String>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> ChatRequest {
        ChatRequest {
            model: model.into(),
            messages: self.messages(),
            temperature,
            max_tokens,
            stream: true,
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
        }
    }
}

/// Assemble the request for a turn from the session configuration, the
/// current history and the user's new text.
pub fn assemble(
    config: &SessionConfig,
    history: &ConversationHistory,
    user_turn: impl Into<String>,
) -> PromptRequest {
    PromptRequest {
        system_instructions: system_prompt(config.subject, config.style),
        history: history.all().to_vec(),
        user_turn: user_turn.into(),
    }
}
