// Core of the MediAI chat client:
// - Gemini gateway with retry/backoff and failure classification
// - Request/response data structures
// - Transcript, renderer mapping and medicine suggestion codec
// - Mode controllers and the submission gate
// - Configuration loading and shared error types

// Export client module - gateway and transports
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

pub mod retry;
pub use retry::{execute_with_retry, RetryPolicy};

pub mod suggestion;
pub use suggestion::{MedicineSuggestion, PRESCRIPTION_SENTINEL};

pub mod transcript;
pub use transcript::{Role, Transcript, Turn, TurnKind};

pub mod render;
pub use render::{render, render_turn, MessageBody, RenderedMessage, Variant, API_ERROR_MARKER};

pub mod surface;
pub use surface::ChatSurface;

pub mod session;
pub use session::ChatSession;

pub mod input;
pub use input::{submit, Submission, Trigger};
