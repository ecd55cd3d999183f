//! The closed sets of subjects and teaching styles offered by the UI.
//!
//! Both are plain enums with exhaustive matches; parsing anything outside
//! the set is a [`ConfigError`], never a silent default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

/// Subject domain the tutor specialises in for a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Subject {
    #[default]
    ComputerScience,
    Mathematics,
    Physics,
    Biology,
    Literature,
    History,
}

impl Subject {
    /// Every subject, in selector order.
    pub const ALL: [Subject; 6] = [
        Subject::ComputerScience,
        Subject::Mathematics,
        Subject::Physics,
        Subject::Biology,
        Subject::Literature,
        Subject::History,
    ];

    /// Display label, also the text substituted into prompts.
    pub fn label(self) -> &'static str {
        match self {
            Subject::ComputerScience => "Computer Science",
            Subject::Mathematics => "Mathematics",
            Subject::Physics => "Physics",
            Subject::Biology => "Biology",
            Subject::Literature => "Literature",
            Subject::History => "History",
        }
    }

    fn id(self) -> &'static str {
        match self {
            Subject::ComputerScience => "computer_science",
            Subject::Mathematics => "mathematics",
            Subject::Physics => "physics",
            Subject::Biology => "biology",
            Subject::Literature => "literature",
            Subject::History => "history",
        }
    }
}

/// Teaching style selecting one instruction block of the system prompt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
    #[default]
    Concise,
    Detailed,
    Socratic,
}

impl Style {
    /// Every style, in selector order.
    pub const ALL: [Style; 3] = [Style::Concise, Style::Detailed, Style::Socratic];

    pub fn label(self) -> &'static str {
        match self {
            Style::Concise => "Concise",
            Style::Detailed => "Detailed",
            Style::Socratic => "Socratic",
        }
    }

    /// The instruction block embedded verbatim in the system prompt.
    pub fn instructions(self) -> &'static str {
        match self {
            Style::Concise => {
                "Provide direct answers with minimal fluff. If it's a STEM question, \
                 list formulas and results directly."
            }
            Style::Detailed => {
                "Teach like a patient tutor. 1. Give the direct conclusion first; \
                 2. Break down the principles step-by-step; 3. Use real-world analogies."
            }
            Style::Socratic => {
                "Do not give the answer directly. Guide the user to think for themselves \
                 by asking leading questions and providing hints step-by-step."
            }
        }
    }
}

/// Match `s` against a label or snake_case id, ignoring ASCII case and
/// surrounding whitespace.
fn matches_name(s: &str, label: &str, id: &str) -> bool {
    let s = s.trim();
    s.eq_ignore_ascii_case(label) || s.eq_ignore_ascii_case(id)
}

impl FromStr for Subject {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| matches_name(s, subject.label(), subject.id()))
            .ok_or_else(|| ConfigError::UnknownSubject(s.to_string()))
    }
}

impl FromStr for Style {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| matches_name(s, style.label(), &style.label().to_ascii_lowercase()))
            .ok_or_else(|| ConfigError::UnknownStyle(s.to_string()))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Serialized in label form so the browser can show the value as-is.
macro_rules! label_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

label_serde!(Subject);
label_serde!(Style);
