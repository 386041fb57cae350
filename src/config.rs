use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Upload cap shared by the gateway and the upload client.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_API_BASE: &str = "/api";

pub const DEFAULT_COLD_START_HINT: &str = "Could not reach the inference backend. \
It may be waking up from a cold start; wait a few seconds and press Predict again.";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            service_name: "gateway".to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: Duration::from_millis(DEFAULT_UPSTREAM_TIMEOUT_MS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            upstream_url: lookup("FLASK_URL")
                .map(|url| trim_base(&url))
                .unwrap_or(defaults.upstream_url),
            upstream_timeout: parse_var(&lookup, "UPSTREAM_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.upstream_timeout),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL. Relative bases are resolved against an origin.
    pub api_base: String,
    pub max_upload_bytes: u64,
    /// Shown when the gateway cannot be reached at all.
    pub cold_start_hint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cold_start_hint: DEFAULT_COLD_START_HINT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            api_base: lookup("BACKEND_URL")
                .map(|url| trim_base(&url))
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_base),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            cold_start_hint: lookup("COLD_START_HINT").unwrap_or(defaults.cold_start_hint),
        })
    }

    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = trim_base(base);
        self
    }

    /// Full URL of `path` on the gateway.
    pub fn endpoint(&self, origin: &str, path: &str) -> String {
        if self.api_base.starts_with("http://") || self.api_base.starts_with("https://") {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}{}{}", trim_base(origin), self.api_base, path)
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
