//! # inwx-domrobot
//!
//! Async client for the [INWX](https://www.inwx.com/) DomRobot JSON-RPC API.
//!
//! DomRobot is a session-based API: `account.login` sets a cookie which every
//! later call must replay, and the registrar does not expect concurrent calls
//! within one session. [`Client`] therefore keeps a cookie jar and serializes
//! every exchange behind one async mutex.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use inwx_domrobot::{Client, Credentials, OTE_API_URL, Params, RpcTransport, session};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder().api_url(OTE_API_URL).build()?;
//!     session::login(&client, &Credentials::new("user", "password")).await?;
//!
//!     let mut params = Params::new();
//!     params.insert("domain".into(), json!("example.com"));
//!     let info = client.call("domain.info", params).await?.ensure_completed()?;
//!     println!("{:?}", info.res_data);
//!
//!     session::logout(&client).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Status Codes
//!
//! [`RpcTransport::call`] only decodes the envelope. Callers decide which codes
//! they accept:
//!
//! - [`RpcResponse::ensure_success`]: `1000` or `1001` (pending)
//! - [`RpcResponse::ensure_completed`]: exactly `1000`
//!
//! Everything else becomes [`ApiError::Api`] carrying the raw response.
//!
//! ## Loosely typed payloads
//!
//! `resData` is decoded with [`RpcResponse::res_data`] into caller-defined
//! structs. The [`lenient`] helpers accept numbers encoded as floats or strings
//! and booleans encoded as `1` or `"true"`.

mod client;
mod error;
pub mod session;
mod traits;
mod types;
mod utils;

pub use client::{Client, ClientBuilder, DEFAULT_API_URL, OTE_API_URL};
pub use error::{ApiError, Result};
pub use session::{Credentials, LoginOutcome};
pub use traits::RpcTransport;
pub use types::{
    AUTHENTICATION_ERROR, COMMAND_SUCCESSFUL, COMMAND_SUCCESSFUL_ENDING_SESSION,
    COMMAND_SUCCESSFUL_PENDING, OBJECT_DOES_NOT_EXIST, Params, RpcRequest, RpcResponse,
};
pub use utils::lenient;
pub use utils::log_sanitizer::truncate_for_log;
