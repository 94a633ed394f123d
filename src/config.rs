//! Configuration management for `TripScout`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripScoutError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for `TripScout`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripScoutConfig {
    /// Amadeus pricing API configuration
    pub amadeus: AmadeusConfig,
    /// Hotel and flight normalization limits
    pub pricing: PricingConfig,
    /// HTTP boundary configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Amadeus API configuration settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AmadeusConfig {
    /// Client id used for the client-credentials exchange
    pub api_key: Option<String>,
    /// Client secret used for the client-credentials exchange
    pub api_secret: Option<String>,
    /// Base URL for the Amadeus API
    #[serde(default = "default_amadeus_base_url")]
    pub base_url: String,
    /// Request timeout in seconds, applied to every outbound call
    #[serde(default = "default_amadeus_timeout")]
    pub timeout_seconds: u32,
    /// Currency requested for flight offers
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Seconds subtracted from the token lifetime before it is considered stale
    #[serde(default = "default_token_safety_margin")]
    pub token_safety_margin_seconds: u64,
}

/// Limits applied while normalizing provider payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Hotel ids passed to the offers endpoint
    #[serde(default = "default_max_hotel_ids")]
    pub max_hotel_ids: usize,
    /// Hotels kept per destination
    #[serde(default = "default_max_hotels")]
    pub max_hotels: usize,
    /// Flight offers kept per destination
    #[serde(default = "default_max_flights")]
    pub max_flights: usize,
    /// Minimum star rating for rated hotels
    #[serde(default = "default_min_hotel_rating")]
    pub min_hotel_rating: f64,
}

/// HTTP boundary settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Upper bound for a whole aggregation run triggered over HTTP
    #[serde(default = "default_aggregation_timeout")]
    pub aggregation_timeout_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_amadeus_base_url() -> String {
    "https://test.api.amadeus.com".to_string()
}

fn default_amadeus_timeout() -> u32 {
    30
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_token_safety_margin() -> u64 {
    60
}

fn default_max_hotel_ids() -> usize {
    20
}

fn default_max_hotels() -> usize {
    10
}

fn default_max_flights() -> usize {
    10
}

fn default_min_hotel_rating() -> f64 {
    3.0
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_aggregation_timeout() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for AmadeusConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: default_amadeus_base_url(),
            timeout_seconds: default_amadeus_timeout(),
            currency: default_currency(),
            token_safety_margin_seconds: default_token_safety_margin(),
        }
    }
}

// Keeps the secret out of logs.
impl std::fmt::Debug for AmadeusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmadeusConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("currency", &self.currency)
            .field(
                "token_safety_margin_seconds",
                &self.token_safety_margin_seconds,
            )
            .finish()
    }
}

impl AmadeusConfig {
    /// Per-request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }

    /// Token safety margin
    #[must_use]
    pub fn token_safety_margin(&self) -> Duration {
        Duration::from_secs(self.token_safety_margin_seconds)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            max_hotel_ids: default_max_hotel_ids(),
            max_hotels: default_max_hotels(),
            max_flights: default_max_flights(),
            min_hotel_rating: default_min_hotel_rating(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            aggregation_timeout_seconds: default_aggregation_timeout(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn aggregation_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregation_timeout_seconds)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripScoutConfig {
    /// Load configuration from the given file (or the default path) and environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPSCOUT_AMADEUS__BASE_URL style overrides
        builder = builder.add_source(
            Environment::with_prefix("TRIPSCOUT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripScoutConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_credential_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Path given as `--config <path>` or `--config=<path>` on the command line
    #[must_use]
    pub fn config_path_from_args<I>(args: I) -> Option<PathBuf>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                return args.next().filter(|p| !p.is_empty()).map(PathBuf::from);
            }
            if let Some(path) = arg.strip_prefix("--config=") {
                return (!path.is_empty()).then(|| PathBuf::from(path));
            }
        }
        None
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripscout").join("config.toml"))
    }

    /// Fall back to the plain `AMADEUS_API_KEY` / `AMADEUS_API_SECRET` variables
    pub fn apply_credential_env(&mut self) {
        if self.amadeus.api_key.is_none() {
            self.amadeus.api_key = std::env::var("AMADEUS_API_KEY").ok();
        }
        if self.amadeus.api_secret.is_none() {
            self.amadeus.api_secret = std::env::var("AMADEUS_API_SECRET").ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.amadeus.base_url.is_empty() {
            self.amadeus.base_url = default_amadeus_base_url();
        }
        if self.amadeus.timeout_seconds == 0 {
            self.amadeus.timeout_seconds = default_amadeus_timeout();
        }
        if self.amadeus.currency.is_empty() {
            self.amadeus.currency = default_currency();
        }
        if self.pricing.max_hotel_ids == 0 {
            self.pricing.max_hotel_ids = default_max_hotel_ids();
        }
        if self.pricing.max_hotels == 0 {
            self.pricing.max_hotels = default_max_hotels();
        }
        if self.pricing.max_flights == 0 {
            self.pricing.max_flights = default_max_flights();
        }
        if self.server.aggregation_timeout_seconds == 0 {
            self.server.aggregation_timeout_seconds = default_aggregation_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    ///
    /// Missing credentials are allowed here; the token exchange reports them as an
    /// authentication error on first use.
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.amadeus.api_key {
            if api_key.trim().is_empty() {
                return Err(TripScoutError::config(
                    "Amadeus API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        if let Some(api_secret) = &self.amadeus.api_secret {
            if api_secret.trim().is_empty() {
                return Err(TripScoutError::config(
                    "Amadeus API secret cannot be empty if provided. Either remove it or provide a valid secret.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.amadeus.timeout_seconds > 300 {
            return Err(
                TripScoutError::config("Amadeus API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.amadeus.token_safety_margin_seconds > 600 {
            return Err(TripScoutError::config(
                "Token safety margin cannot exceed 600 seconds",
            )
            .into());
        }

        if self.pricing.max_hotel_ids > 100 {
            return Err(TripScoutError::config("Maximum hotel ids cannot exceed 100").into());
        }

        if self.pricing.max_hotels > 50 {
            return Err(TripScoutError::config("Maximum hotels cannot exceed 50").into());
        }

        if self.pricing.max_flights > 250 {
            return Err(TripScoutError::config("Maximum flights cannot exceed 250").into());
        }

        if !(0.0..=5.0).contains(&self.pricing.min_hotel_rating) {
            return Err(TripScoutError::config(
                "Minimum hotel rating must be between 0 and 5",
            )
            .into());
        }

        if self.server.aggregation_timeout_seconds > 900 {
            return Err(TripScoutError::config(
                "Aggregation timeout cannot exceed 900 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripScoutError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.amadeus.base_url.starts_with("http://")
            && !self.amadeus.base_url.starts_with("https://")
        {
            return Err(TripScoutError::config(
                "Amadeus base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        let currency = &self.amadeus.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(TripScoutError::config(format!(
                "Invalid currency code '{currency}'. Expected an ISO 4217 code such as INR"
            ))
            .into());
        }

        Ok(())
    }
}
