use thiserror::Error;

/// Number of error-body characters kept in an HTTP failure message
pub const ERROR_BODY_EXCERPT_CHARS: usize = 150;

/// Configuration and local I/O errors
#[derive(Error, Debug)]
pub enum MediError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
}

/// Result type for configuration and local operations
pub type MediResult<T> = Result<T, MediError>;

/// Classified failure of a single gateway attempt.
///
/// The `Display` text is what ends up in front of the user once the retry
/// budget is spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayFailure {
    /// HTTP 403 naming unregistered callers while a manual key was supplied
    #[error("Invalid API Key (403): The key provided is likely incorrect or expired.")]
    InvalidManualKey,

    /// HTTP 403 naming unregistered callers with only the fallback key
    #[error("Authentication Failure (403): The API key could not be provided by the execution environment. Please enter a key below to proceed.")]
    MissingEnvironmentKey,

    #[error("HTTP Error {status} ({status_text}). Details: {body_excerpt}...")]
    Http {
        status: u16,
        status_text: String,
        body_excerpt: String,
    },

    /// Success status without `candidates[0].content.parts[0].text`
    #[error("API response structure unexpected or model returned no content.")]
    Structure,

    #[error("Failed to parse API response: {0}")]
    MalformedBody(String),

    #[error("Request failed: {0}")]
    Transport(String),
}

impl GatewayFailure {
    /// Classifies a non-success HTTP response.
    pub fn from_status(status: u16, status_text: &str, body: &str, manual_key: bool) -> Self {
        if status == 403 && body.contains("unregistered callers") {
            return if manual_key {
                GatewayFailure::InvalidManualKey
            } else {
                GatewayFailure::MissingEnvironmentKey
            };
        }

        GatewayFailure::Http {
            status,
            status_text: status_text.to_string(),
            body_excerpt: body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect(),
        }
    }
}

/// A structured response that does not match the medicine suggestion shape
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
}
