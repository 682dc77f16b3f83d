use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for every DomRobot exchange.
///
/// Every variant that originates from a single RPC call carries the method name
/// (`domain.create`, `nameserver.info`, ...) so that diagnostics can point at the
/// failing operation. Nothing is retried; the variants only classify why the
/// exchange failed.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ApiError {
    /// The HTTP exchange itself failed (connection refused, TLS, unreadable body).
    #[error("[{method}] could not execute request: {detail}")]
    Transport {
        /// RPC method being called.
        method: String,
        /// Error details from the HTTP client.
        detail: String,
    },

    /// The request parameters could not be encoded as JSON.
    #[error("[{method}] could not marshal request parameters to json: {detail}")]
    Serialization {
        /// RPC method being called.
        method: String,
        /// Error details from the encoder.
        detail: String,
    },

    /// The response body was not JSON, or `resData` did not have the expected shape.
    #[error("[{method}] could not decode response: {detail}")]
    Decode {
        /// RPC method being called.
        method: String,
        /// What went wrong, including a truncated copy of the offending body.
        detail: String,
    },

    /// The registrar answered with a status code the caller does not accept.
    #[error("[{method}] API response not status code {expected}. Got response: {raw}")]
    Api {
        /// RPC method being called.
        method: String,
        /// Status code of the response.
        code: i64,
        /// Human readable `msg` of the response.
        message: String,
        /// Accepted codes, for the error message (`1000` or `1000 or 1001`).
        expected: String,
        /// The raw JSON response.
        raw: String,
    },

    /// Login answered with an authentication-error code and no TAN is configured.
    #[error(
        "[account.login] login requires a TAN (response code {code}) but none is configured"
    )]
    TanRequired {
        /// Status code of the login response.
        code: i64,
    },

    /// The session cookie file could not be read or written.
    #[error("could not {action} cookie file '{path}': {detail}")]
    CookieFile {
        /// `load` or `save`.
        action: String,
        /// Path of the cookie file.
        path: String,
        /// I/O error text.
        detail: String,
    },

    /// The configured endpoint is not a usable URL.
    #[error("invalid API URL '{url}': {detail}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        detail: String,
    },
}

impl ApiError {
    /// Status code reported by the registrar, if the error came from a decoded response.
    pub fn status_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } | Self::TanRequired { code } => Some(*code),
            _ => None,
        }
    }

    /// Raw response body attached to status-code errors.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Api { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias for DomRobot calls.
pub type Result<T> = std::result::Result<T, ApiError>;
