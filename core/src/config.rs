//! Client configuration: where the push service lives and who we are.
//!
//! # Design
//! `Config` is an explicit value, validated once at construction and shared
//! read-only by every request afterwards. Request URLs are the API root with
//! the operation path appended verbatim, but both halves are checked so a
//! malformed root or path fails here instead of on the wire.

use url::Url;

use crate::error::ConfigError;

pub const API_ROOT_ENV: &str = "PUSH_SERVICE_API_ROOT";
pub const APP_NAME_ENV: &str = "PUSH_SERVICE_APP_NAME";

/// Validated push service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    api_root: String,
    app_name: String,
}

impl Config {
    /// Build a configuration from an API root such as
    /// `http://push-service.example.com` and the application name registered
    /// with the push service. A trailing `/` on the root is dropped.
    pub fn new(api_root: &str, app_name: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(api_root).map_err(|e| ConfigError::InvalidApiRoot {
            root: api_root.to_string(),
            reason: e.to_string(),
        })?;

        let unsupported = |reason: &str| ConfigError::UnsupportedApiRoot {
            root: api_root.to_string(),
            reason: reason.to_string(),
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(unsupported("scheme must be http or https"));
        }
        if parsed.host_str().is_none() {
            return Err(unsupported("missing host"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(unsupported("query and fragment are not allowed"));
        }

        if app_name.is_empty() {
            return Err(ConfigError::EmptyAppName);
        }

        Ok(Self {
            api_root: api_root.strip_suffix('/').unwrap_or(api_root).to_string(),
            app_name: app_name.to_string(),
        })
    }

    /// Read `PUSH_SERVICE_API_ROOT` and `PUSH_SERVICE_APP_NAME`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_root = std::env::var(API_ROOT_ENV).map_err(|_| ConfigError::MissingEnv(API_ROOT_ENV))?;
        let app_name = std::env::var(APP_NAME_ENV).map_err(|_| ConfigError::MissingEnv(APP_NAME_ENV))?;
        Self::new(&api_root, &app_name)
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Join `path` onto the API root. An empty path means `/`.
    pub fn endpoint(&self, path: &str) -> Result<String, ConfigError> {
        let path = if path.is_empty() { "/" } else { path };
        let invalid = |reason| ConfigError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if path.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        if path.contains('#') {
            return Err(invalid("must not contain a fragment"));
        }

        let url = format!("{}{}", self.api_root, path);
        Url::parse(&url).map_err(|_| invalid("does not form a valid URL"))?;
        Ok(url)
    }
}
