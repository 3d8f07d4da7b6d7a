//! The two mode controllers: open chat and structured medicine suggestion.
//!
//! A [`ChatSession`] owns the transcript, so everything that mutates it goes
//! through `&mut self` and at most one turn is ever in flight.

use tracing::{debug, warn};

use crate::client::{error_text, GatewayOutcome, GeminiGateway, Transport};
use crate::render::{render, render_turn};
use crate::suggestion::{response_schema, MedicineSuggestion, PRESCRIPTION_SENTINEL};
use crate::surface::ChatSurface;
use crate::transcript::{Role, Transcript, TurnKind};
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Tool, ROLE_USER};

pub const GREETING: &str = "Hello! I am MediAI, your non-diagnostic medical information assistant. I have two modes: CHATS (for general info) and SUGGEST MEDICINE (for specific medicine advice).";

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are a professional, empathetic medical information assistant named MediAI. Provide educational and preliminary, non-diagnostic information only. Remember the primary safety disclaimer is displayed constantly to the user. Keep responses clear and concise (under 200 words).";

pub const CHAT_THINKING: &str = "AI is consulting its knowledge...";
pub const SUGGESTION_THINKING: &str = "AI is generating a structured medicine suggestion...";

/// Reason used when the gateway hands back neither text nor a failure
pub const EMPTY_RESPONSE: &str = "The response was empty.";

const RAW_EXCERPT_CHARS: usize = 50;

/// Drug / drug-class selection policy for structured requests
pub fn suggestion_instruction() -> String {
    format!(
        "Identify a medicine or a common drug class used to treat the user's symptom/condition and fill out the provided JSON schema. \
         For common, mild issues (like headache, fever, mild allergy), suggest a specific Over-The-Counter (OTC) medicine and specific dosage. \
         For chronic or serious conditions (like diabetes, hypertension), suggest the **primary drug class** used for treatment \
         (e.g., 'ACE Inhibitor' for high blood pressure, 'Metformin' for Type 2 Diabetes) and **MANDATORILY** set the dosage field to '{}'. \
         Ensure the 'warning' field is filled with a specific, concise safety note (e.g., 'Do not exceed daily limit').",
        PRESCRIPTION_SENTINEL
    )
}

pub struct ChatSession<T: Transport, S: ChatSurface> {
    gateway: GeminiGateway<T>,
    surface: S,
    transcript: Transcript,
    manual_key: Option<String>,
}

impl<T: Transport, S: ChatSurface> ChatSession<T, S> {
    pub fn new(gateway: GeminiGateway<T>, surface: S) -> Self {
        Self {
            gateway,
            surface,
            transcript: Transcript::new(),
            manual_key: None,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn gateway(&self) -> &GeminiGateway<T> {
        &self.gateway
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The manual key is read at call time; blank clears it
    pub fn set_manual_key(&mut self, key: Option<String>) {
        self.manual_key = key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
    }

    pub fn manual_key(&self) -> Option<&str> {
        self.manual_key.as_deref()
    }

    /// Paints the greeting without adding it to the transcript
    pub fn greet(&mut self) {
        self.surface.paint(render(GREETING, Role::Model, false));
    }

    /// Appends a turn and paints it
    pub(crate) fn persist(&mut self, role: Role, text: String, kind: TurnKind) {
        let message = render_turn(self.transcript.append(role, text, kind));
        self.surface.paint(message);
    }

    pub(crate) fn persist_user(&mut self, prompt: &str) {
        self.persist(Role::User, prompt.to_string(), TurnKind::Text);
    }

    fn persist_suggestion(&mut self, suggestion: &MedicineSuggestion) {
        let message = render_turn(self.transcript.append_suggestion(suggestion));
        self.surface.paint(message);
    }

    fn persist_error(&mut self, reason: &str) {
        self.persist(Role::Model, error_text(reason), TurnKind::Error);
    }

    /// History plus the new prompt, with search grounding enabled
    pub fn chat_request(&self, prompt: &str) -> GenerateContentRequest {
        let mut contents = self.transcript.as_api_context();
        contents.push(Content::with_role(ROLE_USER, prompt));

        GenerateContentRequest {
            contents,
            tools: Some(vec![Tool::google_search()]),
            system_instruction: Some(Content::instruction(CHAT_SYSTEM_INSTRUCTION)),
            generation_config: None,
        }
    }

    /// The prompt alone, constrained to the medicine suggestion schema.
    /// Search grounding cannot be combined with a response schema.
    pub fn suggestion_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::with_role(ROLE_USER, prompt)],
            tools: None,
            system_instruction: Some(Content::instruction(suggestion_instruction())),
            generation_config: Some(GenerationConfig::json_schema(response_schema())),
        }
    }

    /// One open chat turn. The user turn must already be in the transcript.
    pub async fn run_chat(&mut self, prompt: &str) {
        self.surface.show_thinking(CHAT_THINKING);

        let request = self.chat_request(prompt);
        let outcome = self
            .gateway
            .call(&request, self.manual_key.as_deref(), false)
            .await;

        self.surface.clear_thinking();

        match outcome {
            GatewayOutcome::Content(text) if !text.is_empty() => {
                self.persist(Role::Model, text, TurnKind::Text)
            }
            GatewayOutcome::Content(_) => self.persist_error(EMPTY_RESPONSE),
            GatewayOutcome::Failure(reason) => self.persist_error(&reason),
        }
    }

    /// One structured suggestion turn; persists the user prompt itself.
    pub async fn run_structured(&mut self, prompt: &str) {
        self.surface.show_thinking(SUGGESTION_THINKING);

        let request = self.suggestion_request(prompt);
        let outcome = self
            .gateway
            .call(&request, self.manual_key.as_deref(), true)
            .await;

        self.surface.clear_thinking();
        self.persist_user(prompt);

        match outcome {
            GatewayOutcome::Content(text) if !text.is_empty() => {
                match MedicineSuggestion::decode(&text) {
                    Ok(suggestion) => {
                        debug!(
                            medicine = %suggestion.medicine_name,
                            prescription = suggestion.is_prescription(),
                            "Decoded medicine suggestion"
                        );
                        self.persist_suggestion(&suggestion);
                    }
                    Err(e) => {
                        warn!(error = %e, raw = %text, "Failed to parse structured JSON response");
                        let excerpt: String = text.chars().take(RAW_EXCERPT_CHARS).collect();
                        self.persist_error(&format!(
                            "Failed to parse structured JSON response: {}. Raw: {}...",
                            e, excerpt
                        ));
                    }
                }
            }
            GatewayOutcome::Content(_) => self.persist_error(EMPTY_RESPONSE),
            GatewayOutcome::Failure(reason) => self.persist_error(&reason),
        }
    }
}
