//! Provider configuration
//!
//! Values come from the provider block first and fall back to `INWX_*`
//! environment variables.

use serde::Deserialize;
use url::Url;

use inwx_domrobot::{Credentials, DEFAULT_API_URL};

use crate::error::{ProviderError, ProviderResult};

pub const ENV_USERNAME: &str = "INWX_USERNAME";
pub const ENV_PASSWORD: &str = "INWX_PASSWORD";
pub const ENV_TAN: &str = "INWX_TAN";
pub const ENV_API_URL: &str = "INWX_API_URL";
pub const ENV_DEBUG: &str = "INWX_DEBUG";
pub const ENV_COOKIE_FILE: &str = "INWX_COOKIE_FILE";

/// The `provider "inwx"` block as written by the user. Every attribute is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderBlock {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub tan: Option<String>,
    #[serde(default)]
    pub debug: Option<bool>,
    /// Keep the session cookie in this file between runs
    #[serde(default)]
    pub cookie_file: Option<String>,
}

/// Resolved provider configuration
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub tan: Option<String>,
    pub debug: bool,
    pub cookie_file: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            username: String::new(),
            password: String::new(),
            tan: None,
            debug: false,
            cookie_file: None,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"********")
            .field("tan", &self.tan.as_ref().map(|_| "********"))
            .field("debug", &self.debug)
            .field("cookie_file", &self.cookie_file)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve `block` against the process environment.
    pub fn resolve(block: ProviderBlock) -> Self {
        Self::resolve_with(block, |name| std::env::var(name).ok())
    }

    /// Resolve `block`, looking up missing values with `env`.
    pub fn resolve_with<F>(block: ProviderBlock, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |name: &str| env(name).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            api_url: block
                .api_url
                .or_else(|| env(ENV_API_URL))
                .unwrap_or(defaults.api_url),
            username: block.username.or_else(|| env(ENV_USERNAME)).unwrap_or_default(),
            password: block.password.or_else(|| env(ENV_PASSWORD)).unwrap_or_default(),
            tan: block.tan.or_else(|| env(ENV_TAN)),
            debug: block
                .debug
                .or_else(|| env(ENV_DEBUG).map(|v| parse_flag(&v)))
                .unwrap_or(defaults.debug),
            cookie_file: block.cookie_file.or_else(|| env(ENV_COOKIE_FILE)),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ProviderResult<()> {
        if self.username.trim().is_empty() {
            return Err(ProviderError::Configuration(format!(
                "username is required (set it in the provider block or via {ENV_USERNAME})"
            )));
        }
        if self.password.is_empty() {
            return Err(ProviderError::Configuration(format!(
                "password is required (set it in the provider block or via {ENV_PASSWORD})"
            )));
        }
        let url = Url::parse(&self.api_url).map_err(|e| {
            ProviderError::Configuration(format!("invalid api_url '{}': {e}", self.api_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::Configuration(format!(
                "api_url '{}' must use http or https",
                self.api_url
            )));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        let credentials = Credentials::new(&self.username, &self.password);
        match &self.tan {
            Some(tan) => credentials.with_tan(tan),
            None => credentials,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
