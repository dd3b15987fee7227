use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const SETTINGS_FILE_FORMAT: config::FileFormat = config::FileFormat::Yaml;
const DEFAULT_SETTINGS_STR: &str = include_str!("default.yaml");

/// Prefix for environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "CUBECHRONO";

/// Server settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Address to listen on.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Base URL of the external API.
    pub api_url: String,
    /// Timeout for each API request, in seconds.
    pub request_timeout_secs: u64,
    /// Largest number of scrambles served per request.
    pub max_scramble_count: i64,
    /// Lifetime of the `access_token` cookie, in seconds.
    pub access_token_max_age_secs: i64,
    /// Lifetime of the `refresh_token` cookie, in seconds.
    pub refresh_token_max_age_secs: i64,
    /// Whether token cookies are marked `Secure`.
    pub secure_cookies: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            api_url: cubechrono_api_client::DEFAULT_API_URL.to_owned(),
            request_timeout_secs: 30,
            max_scramble_count: 100,
            access_token_max_age_secs: 15 * 60,
            refresh_token_max_age_secs: 30 * 24 * 60 * 60,
            secure_cookies: true,
        }
    }
}

impl Settings {
    /// Loads the built-in defaults, then the file at `path` (if any), then
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Same as [`Settings::load()`], but reads environment variables from `env`
    /// instead of the process environment if it is `Some`.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULT_SETTINGS_STR,
            SETTINGS_FILE_FORMAT,
        ));

        if let Some(path) = path {
            log::info!("loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns the address to bind, such as `0.0.0.0:3000`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the API request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
