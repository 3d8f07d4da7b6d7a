//! Submission gate in front of the two mode controllers.

use tracing::debug;

use crate::client::Transport;
use crate::session::ChatSession;
use crate::surface::ChatSurface;

/// What started a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The send button
    Send,
    /// The suggest-medicine button
    Suggest,
    /// The primary submission key; always routes to chat
    EnterKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Chat,
    Structured,
}

impl Trigger {
    pub fn mode(self) -> Mode {
        match self {
            Trigger::Send | Trigger::EnterKey => Mode::Chat,
            Trigger::Suggest => Mode::Structured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Blank prompt: nothing sent, nothing recorded
    Ignored,
    Completed,
}

/// Runs one submission with input disabled for its whole duration.
pub async fn submit<T, S>(
    session: &mut ChatSession<T, S>,
    trigger: Trigger,
    raw: &str,
) -> Submission
where
    T: Transport,
    S: ChatSurface,
{
    let prompt = raw.trim();
    if prompt.is_empty() {
        return Submission::Ignored;
    }

    debug!(?trigger, "Submitting prompt");
    session.surface_mut().set_input_enabled(false);

    match trigger.mode() {
        Mode::Chat => {
            session.persist_user(prompt);
            session.run_chat(prompt).await;
        }
        Mode::Structured => session.run_structured(prompt).await,
    }

    // Controllers report failures as turns, so this always runs.
    session.surface_mut().set_input_enabled(true);
    Submission::Completed
}
