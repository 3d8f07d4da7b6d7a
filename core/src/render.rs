//! Maps a turn to what the surface should paint.

use crate::suggestion::MedicineSuggestion;
use crate::transcript::{Role, Turn};

/// Prefix carried by failure text on the single string channel
pub const API_ERROR_MARKER: &str = "**API Error:**";

pub const PRESCRIPTION_HEADING: &str = "⚠️ Prescription Information";
pub const OTC_HEADING: &str = "💊 Suggested OTC Information";

/// Presentation variant of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    User,
    Model,
    Error,
    Prescription,
    OverTheCounter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Suggestion {
        heading: &'static str,
        medicine: String,
        purpose: String,
        dosage: String,
        note: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub role: Role,
    pub variant: Variant,
    pub body: MessageBody,
}

/// Builds the visual message for `text`.
///
/// With `structured` set, `text` is expected to be a medicine suggestion;
/// anything that does not decode is shown as plain text instead.
pub fn render(text: &str, role: Role, structured: bool) -> RenderedMessage {
    if structured {
        if let Ok(suggestion) = MedicineSuggestion::decode(text) {
            return render_suggestion(suggestion, role);
        }
    }

    if let Some(rest) = text.strip_prefix(API_ERROR_MARKER) {
        return RenderedMessage {
            role,
            variant: Variant::Error,
            body: MessageBody::Text(rest.trim_start().to_string()),
        };
    }

    let variant = match role {
        Role::User => Variant::User,
        Role::Model => Variant::Model,
    };

    RenderedMessage {
        role,
        variant,
        body: MessageBody::Text(text.to_string()),
    }
}

/// Renders a transcript turn
pub fn render_turn(turn: &Turn) -> RenderedMessage {
    render(&turn.text, turn.role, turn.is_structured())
}

fn render_suggestion(suggestion: MedicineSuggestion, role: Role) -> RenderedMessage {
    let (variant, heading) = if suggestion.is_prescription() {
        (Variant::Prescription, PRESCRIPTION_HEADING)
    } else {
        (Variant::OverTheCounter, OTC_HEADING)
    };

    RenderedMessage {
        role,
        variant,
        body: MessageBody::Suggestion {
            heading,
            medicine: suggestion.medicine_name,
            purpose: suggestion.purpose,
            dosage: suggestion.dosage,
            note: suggestion.warning,
        },
    }
}
