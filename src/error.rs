//! Error types and handling for the `TripScout` pricing layer

use thiserror::Error;

/// Main error type for the `TripScout` library
#[derive(Error, Debug)]
pub enum TripScoutError {
    /// Missing provider credentials or a rejected token exchange
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// Non-success provider response, unparsable body or exhausted token retry
    #[error("Provider error: {message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// Malformed candidate input
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Planner output that could not be used
    #[error("Planner error: {message}")]
    Planner { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl TripScoutError {
    /// Create a new authentication error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new provider error without an HTTP status
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            status: None,
            message: message.into(),
        }
    }

    /// Create a new provider error for a non-success HTTP status
    pub fn provider_status<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Provider {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new planner error
    pub fn planner<S: Into<String>>(message: S) -> Self {
        Self::Planner {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status reported by the provider, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            TripScoutError::Provider { status, .. } => *status,
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripScoutError::Auth { .. } => {
                "Unable to authenticate with the pricing provider. Please check your API key and secret."
                    .to_string()
            }
            TripScoutError::Provider { .. } => {
                "The pricing provider could not be reached or returned an error.".to_string()
            }
            TripScoutError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripScoutError::Planner { message } => message.clone(),
            TripScoutError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TripScoutError {
    fn from(err: reqwest::Error) -> Self {
        Self::Provider {
            status: err.status().map(|s| s.as_u16()),
            message: format!("Request failed: {err}"),
        }
    }
}

impl From<serde_json::Error> for TripScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::provider(format!("Failed to decode provider response: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let auth_err = TripScoutError::auth("missing key");
        assert!(matches!(auth_err, TripScoutError::Auth { .. }));

        let provider_err = TripScoutError::provider_status(500, "boom");
        assert!(matches!(provider_err, TripScoutError::Provider { .. }));
        assert_eq!(provider_err.status(), Some(500));

        let validation_err = TripScoutError::validation("missing check_out_date");
        assert!(matches!(validation_err, TripScoutError::Validation { .. }));
        assert_eq!(validation_err.status(), None);
    }

    #[test]
    fn test_user_messages() {
        let auth_err = TripScoutError::auth("test");
        assert!(auth_err.user_message().contains("authenticate"));

        let provider_err = TripScoutError::provider("test");
        assert!(provider_err.user_message().contains("pricing provider"));

        let validation_err = TripScoutError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: TripScoutError = json_err.into();
        assert!(matches!(err, TripScoutError::Provider { status: None, .. }));
        assert!(err.to_string().contains("Failed to decode"));
    }

    #[test]
    fn test_config_user_message_points_at_config_file() {
        let err = TripScoutError::config("bad currency");
        assert!(err.user_message().contains("config file"));
        assert!(err.to_string().contains("bad currency"));
    }
}
