//! Weather provider error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No API key configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl WeatherError {
    /// User-friendly error message for UI display.
    ///
    /// Upstream response bodies are untrusted, so they are never echoed here.
    pub fn user_message(&self) -> String {
        match self {
            Self::CityNotFound(_) => "City not found".to_string(),
            Self::Api { status, .. } if *status >= 500 => {
                "Weather service is unavailable. Please try again later.".to_string()
            }
            Self::Api { .. } => "Weather service error. Please try again.".to_string(),
            Self::Parse(_) => "Received an unexpected response. Please try again.".to_string(),
            Self::MissingApiKey => "Weather API key is missing. Check settings.".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error means the city does not exist upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CityNotFound(_))
    }
}
