//! Serializable projections for REST and WebSocket transport.

use omni_tutor::catalog::{Style, Subject};
use omni_tutor::session::{DEFAULT_TEMPERATURE, Session};
use omni_tutor::{APP_TITLE, Message};
use serde::Serialize;
use uuid::Uuid;

/// A session's id and full history, in order.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub messages: Vec<Message>,
}

impl SessionSnapshot {
    pub fn from_session(session: &Session) -> Self {
        Self {
            id: session.id,
            messages: session.history.all().to_vec(),
        }
    }
}

/// Range and default of the creativity slider.
#[derive(Clone, Debug, Serialize)]
pub struct TemperatureRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub default: f32,
}

/// Everything the page needs to build its controls.
#[derive(Clone, Debug, Serialize)]
pub struct OptionsSnapshot {
    pub title: &'static str,
    pub subjects: Vec<Subject>,
    pub styles: Vec<Style>,
    pub default_subject: Subject,
    pub default_style: Style,
    pub temperature: TemperatureRange,
}

impl OptionsSnapshot {
    pub fn current() -> Self {
        Self {
            title: APP_TITLE,
            subjects: Subject::ALL.to_vec(),
            styles: Style::ALL.to_vec(),
            default_subject: Subject::default(),
            default_style: Style::default(),
            temperature: TemperatureRange {
                min: 0.0,
                max: 1.0,
                step: 0.1,
                default: DEFAULT_TEMPERATURE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_tutor::session::SEED_GREETING;

    #[test]
    fn snapshot_of_new_session_holds_greeting() {
        let session = Session::new();
        let snap = SessionSnapshot::from_session(&session);
        assert_eq!(snap.id, session.id);
        assert_eq!(snap.messages, vec![Message::assistant(SEED_GREETING)]);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["messages"][0]["role"], "assistant");
    }

    #[test]
    fn options_list_catalog_in_order() {
        let json = serde_json::to_value(OptionsSnapshot::current()).unwrap();
        assert_eq!(json["title"], "Omni AI Learning Assistant");
        assert_eq!(json["subjects"].as_array().unwrap().len(), 6);
        assert_eq!(json["subjects"][0], "Computer Science");
        assert_eq!(json["styles"][2], "Socratic");
        assert_eq!(json["default_style"], "Concise");
        assert_eq!(json["temperature"]["max"], 1.0);
    }
}
