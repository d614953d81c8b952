use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. Runtime platform
/// settings (moderation flags, expiry window, chat targets) live in the
/// `site_config` database row, not here.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Moderation classifier endpoint (default: Mistral moderation API).
    pub classifier_url: String,
    /// Classifier call timeout in seconds (default: `10`).
    pub classifier_timeout_secs: u64,
    /// Chat bot API base URL (default: `https://api.telegram.org`).
    pub bot_api_base: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                                      |
    /// |---------------------------|----------------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                                    |
    /// | `PORT`                    | `3000`                                       |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`                      |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                         |
    /// | `CLASSIFIER_URL`          | `https://api.mistral.ai/v1/moderations`      |
    /// | `CLASSIFIER_TIMEOUT_SECS` | `10`                                         |
    /// | `BOT_API_BASE`            | `https://api.telegram.org`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let classifier_url = std::env::var("CLASSIFIER_URL")
            .unwrap_or_else(|_| "https://api.mistral.ai/v1/moderations".into());

        let classifier_timeout_secs: u64 = std::env::var("CLASSIFIER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("CLASSIFIER_TIMEOUT_SECS must be a valid u64");

        let bot_api_base =
            std::env::var("BOT_API_BASE").unwrap_or_else(|_| "https://api.telegram.org".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            classifier_url,
            classifier_timeout_secs,
            bot_api_base,
        }
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }
}
