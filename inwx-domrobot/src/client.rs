//! HTTP client for the DomRobot endpoint
//!
//! One [`Client`] corresponds to one registrar session:
//! - **Cookie jar** - the session cookie set by `account.login` is replayed on every call,
//!   and optionally persisted to a cookie file after every exchange
//! - **One call at a time** - an async mutex is held for the whole request/response exchange
//! - **No retries** - transport failures surface immediately, the caller decides

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::sync::Mutex;
use url::Url;

use crate::error::{ApiError, Result};
use crate::traits::RpcTransport;
use crate::types::{Params, RpcRequest, RpcResponse};
use crate::utils::log_sanitizer::{redact_params, truncate_for_log};

/// Production endpoint.
pub const DEFAULT_API_URL: &str = "https://api.domrobot.com/jsonrpc/";

/// Operational test environment (OTE) endpoint.
pub const OTE_API_URL: &str = "https://api.ote.domrobot.com/jsonrpc/";

const CONTENT_TYPE_JSON: &str = "application/json; charset=UTF-8";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Builder for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    api_url: String,
    debug: bool,
    cookie_file: Option<PathBuf>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            debug: false,
            cookie_file: None,
        }
    }
}

impl ClientBuilder {
    /// Endpoint to talk to. Defaults to [`DEFAULT_API_URL`].
    #[must_use]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Log request and response bodies (secrets redacted, bodies truncated).
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Persist session cookies in `path`: loaded on build, saved after every exchange.
    /// A missing file is an empty jar.
    #[must_use]
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let api_url = parse_api_url(&self.api_url)?;
        let jar = Arc::new(Jar::default());
        if let Some(path) = &self.cookie_file {
            load_cookies(path, &jar, &api_url)?;
        }

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(USER_AGENT)
            .no_gzip()
            .build()
            .map_err(|e| ApiError::Transport {
                method: "client.build".to_string(),
                detail: e.to_string(),
            })?;

        Ok(Client {
            http,
            api_url,
            debug: self.debug,
            jar,
            cookie_file: self.cookie_file,
            lock: Mutex::new(()),
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ApiError::InvalidUrl {
        url: raw.to_string(),
        detail: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::InvalidUrl {
            url: raw.to_string(),
            detail: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

fn cookie_file_error(action: &str, path: &Path, e: &std::io::Error) -> ApiError {
    ApiError::CookieFile {
        action: action.to_string(),
        path: path.display().to_string(),
        detail: e.to_string(),
    }
}

/// One `name=value` pair per line, scoped to the API URL.
fn load_cookies(path: &Path, jar: &Jar, api_url: &Url) -> Result<()> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(cookie_file_error("load", path, &e)),
    };
    let mut loaded = 0usize;
    for pair in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        jar.add_cookie_str(pair, api_url);
        loaded += 1;
    }
    log::debug!("[inwx] loaded {loaded} cookie(s) from {}", path.display());
    Ok(())
}

fn save_cookies(path: &Path, jar: &Jar, api_url: &Url) -> Result<()> {
    // Cookie 请求头形如 "a=1; b=2"
    let lines = jar
        .cookies(api_url)
        .and_then(|header| header.to_str().ok().map(str::to_string))
        .map(|header| header.replace("; ", "\n") + "\n")
        .unwrap_or_default();
    std::fs::write(path, lines).map_err(|e| cookie_file_error("save", path, &e))
}

/// DomRobot JSON-RPC client.
pub struct Client {
    http: reqwest::Client,
    api_url: Url,
    debug: bool,
    jar: Arc<Jar>,
    cookie_file: Option<PathBuf>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url.as_str())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Endpoint this client posts to.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// `true` once the endpoint has set at least one cookie (i.e. a session exists).
    pub fn has_session_cookie(&self) -> bool {
        self.jar.cookies(&self.api_url).is_some()
    }

    /// Writes the jar to the cookie file, if one is configured. Called with the lock held.
    fn persist_cookies(&self) -> Result<()> {
        match &self.cookie_file {
            Some(path) => save_cookies(path, &self.jar, &self.api_url),
            None => Ok(()),
        }
    }

    /// Performs one exchange under the lock. Returns the body text when `read_body` is set.
    async fn exchange(&self, method: &str, params: &Params, read_body: bool) -> Result<Option<String>> {
        let body = serde_json::to_string(&RpcRequest { method, params }).map_err(|e| {
            ApiError::Serialization {
                method: method.to_string(),
                detail: e.to_string(),
            }
        })?;

        let _guard = self.lock.lock().await;

        log::debug!("[inwx] POST {method}");
        if self.debug {
            log::debug!(
                "[inwx] Request Body: {}",
                truncate_for_log(&redact_params(params).to_string())
            );
        }

        let response = self
            .http
            .post(self.api_url.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                method: method.to_string(),
                detail: e.to_string(),
            })?;

        let status_code = response.status().as_u16();
        log::debug!("[inwx] {method} Response Status: {status_code}");
        self.persist_cookies()?;

        if !read_body {
            return Ok(None);
        }

        let text = response.text().await.map_err(|e| ApiError::Transport {
            method: method.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

        if self.debug {
            log::debug!("[inwx] {method} Response Body: {}", truncate_for_log(&text));
        }

        if !response_is_json(&text) {
            log::error!("[inwx] {method} returned a non-JSON body (HTTP {status_code})");
        }

        Ok(Some(text))
    }
}

fn response_is_json(text: &str) -> bool {
    matches!(text.trim_start().chars().next(), Some('{' | '['))
}

#[async_trait]
impl RpcTransport for Client {
    async fn call(&self, method: &str, params: Params) -> Result<RpcResponse> {
        let text = self.exchange(method, &params, true).await?.unwrap_or_default();
        let body: Value = serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            method: method.to_string(),
            detail: format!("{e}, body: {}", truncate_for_log(&text)),
        })?;
        let response = RpcResponse::from_json(method, body)?;
        if !response.is_success() {
            log::warn!(
                "[inwx] {method} answered code {}: {}",
                response.code,
                response.msg
            );
        }
        Ok(response)
    }

    async fn call_no_response_body(&self, method: &str, params: Params) -> Result<()> {
        self.exchange(method, &params, false).await.map(|_| ())
    }
}
