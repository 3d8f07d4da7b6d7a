//! In-memory conversation transcript.
//!
//! Turns are only ever appended; the whole sequence is replayed as context on
//! every chat request.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::suggestion::MedicineSuggestion;
use crate::types::{Content, ROLE_MODEL, ROLE_USER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Model => ROLE_MODEL,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the text of a turn holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    Text,
    /// Canonical text of a [`MedicineSuggestion`]
    Suggestion,
    /// Marker-prefixed error string
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub kind: TurnKind,
}

impl Turn {
    pub fn is_structured(&self) -> bool {
        self.kind == TurnKind::Suggestion
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn of the given kind
    pub fn append(&mut self, role: Role, text: impl Into<String>, kind: TurnKind) -> &Turn {
        self.turns.push(Turn {
            role,
            text: text.into(),
            kind,
        });
        &self.turns[self.turns.len() - 1]
    }

    /// Appends a structured model turn, keeping only its canonical text
    pub fn append_suggestion(&mut self, suggestion: &MedicineSuggestion) -> &Turn {
        self.append(Role::Model, suggestion.to_canonical_text(), TurnKind::Suggestion)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns as role/text pairs, in order.
    ///
    /// Error turns are included as-is.
    pub fn as_api_context(&self) -> Vec<Content> {
        self.turns
            .iter()
            .map(|turn| Content::with_role(turn.role.as_str(), turn.text.clone()))
            .collect()
    }
}
