//! Application configuration loaded from environment variables.
//!
//! Secrets (client secret, webhook verify token) are injected as environment
//! variables by the deployment and read once at startup.

use std::env;
use std::str::FromStr;

const DEFAULT_STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_STRAVA_OAUTH_URL: &str = "https://www.strava.com/oauth/token";
const DEFAULT_STRAVA_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";
const DEFAULT_SIGNATURE: &str = "-- ride-goal";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Public host name used to build OAuth redirect URLs
    pub public_domain: String,
    /// GCP project ID; `None` selects the in-memory store
    pub gcp_project_id: Option<String>,
    /// Server port
    pub port: u16,

    // --- Strava endpoints ---
    pub strava_api_url: String,
    pub strava_oauth_url: String,
    pub strava_authorize_url: String,
    /// Per-call timeout for outbound Strava requests
    pub http_timeout_secs: u64,
    /// `per_page` sent to the activity listing endpoint
    pub strava_page_size: u32,

    // --- Annotation ---
    /// Goal applied when the user has not set one
    pub default_goal_meters: f64,
    /// Marker appended to every rendered description
    pub annotation_signature: String,

    /// Body limit for `/upload`
    pub max_upload_bytes: usize,

    // --- Secrets ---
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// Webhook verification token
    pub webhook_verify_token: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            public_domain: "localhost:8080".to_string(),
            gcp_project_id: None,
            port: 8080,
            strava_api_url: DEFAULT_STRAVA_API_URL.to_string(),
            strava_oauth_url: DEFAULT_STRAVA_OAUTH_URL.to_string(),
            strava_authorize_url: DEFAULT_STRAVA_AUTHORIZE_URL.to_string(),
            http_timeout_secs: 10,
            strava_page_size: 100,
            default_goal_meters: 5_000_000.0,
            annotation_signature: DEFAULT_SIGNATURE.to_string(),
            max_upload_bytes: 32 * 1024 * 1024,
            strava_client_secret: "test_secret".to_string(),
            webhook_verify_token: "test_verify_token".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let config = Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            public_domain: env::var("PUBLIC_DOMAIN").unwrap_or(defaults.public_domain),
            gcp_project_id: env::var("GCP_PROJECT_ID")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            port: parsed("PORT", defaults.port)?,
            strava_api_url: env::var("STRAVA_API_URL").unwrap_or(defaults.strava_api_url),
            strava_oauth_url: env::var("STRAVA_OAUTH_URL").unwrap_or(defaults.strava_oauth_url),
            strava_authorize_url: env::var("STRAVA_AUTHORIZE_URL")
                .unwrap_or(defaults.strava_authorize_url),
            http_timeout_secs: parsed("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            strava_page_size: parsed("STRAVA_PAGE_SIZE", defaults.strava_page_size)?,
            default_goal_meters: parsed("DEFAULT_GOAL_METERS", defaults.default_goal_meters)?,
            annotation_signature: env::var("ANNOTATION_SIGNATURE")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.annotation_signature),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,

            // Secrets
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            webhook_verify_token: required("WEBHOOK_VERIFY_TOKEN")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the annotation pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.annotation_signature.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "ANNOTATION_SIGNATURE",
                "must not be empty".to_string(),
            ));
        }
        if !(self.default_goal_meters.is_finite() && self.default_goal_meters > 0.0) {
            return Err(ConfigError::Invalid(
                "DEFAULT_GOAL_METERS",
                "must be a positive number".to_string(),
            ));
        }
        if self.strava_page_size == 0 {
            return Err(ConfigError::Invalid(
                "STRAVA_PAGE_SIZE",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::Invalid(name, e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", " test_secret\n");
        env::set_var("WEBHOOK_VERIFY_TOKEN", "test_verify");
        env::set_var("ANNOTATION_SIGNATURE", "-- my rides \n");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.webhook_verify_token, "test_verify");
        assert_eq!(config.annotation_signature, "-- my rides");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_empty_signature_rejected() {
        let config = Config {
            annotation_signature: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid("ANNOTATION_SIGNATURE", _))
        ));
    }

    #[test]
    fn test_non_positive_goal_rejected() {
        let config = Config {
            default_goal_meters: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
