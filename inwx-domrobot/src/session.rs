//! Session management: `account.login`, `account.unlock`, `account.logout`.
//!
//! Written against [`RpcTransport`] so the TAN rules can be exercised without a
//! network. The session itself lives in the transport (cookie jar).

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::traits::RpcTransport;
use crate::types::{
    AUTHENTICATION_ERROR, COMMAND_SUCCESSFUL, COMMAND_SUCCESSFUL_ENDING_SESSION, Params,
};

/// Account credentials.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// One-time code for accounts with a second factor.
    pub tan: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("tan", &self.tan.as_ref().map(|_| "********"))
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            tan: None,
        }
    }

    #[must_use]
    pub fn with_tan(mut self, tan: impl Into<String>) -> Self {
        self.tan = Some(tan.into());
        self
    }

    /// The TAN, if one is configured and not blank.
    fn usable_tan(&self) -> Option<&str> {
        self.tan
            .as_deref()
            .map(str::trim)
            .filter(|tan| !tan.is_empty())
    }
}

/// How a session was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Password login was sufficient.
    LoggedIn,
    /// The account additionally had to be unlocked with the TAN.
    Unlocked,
}

#[derive(Debug, Default, Deserialize)]
struct LoginData {
    #[serde(default)]
    tfa: Option<Value>,
}

impl LoginData {
    /// `tfa` is `"0"` (or absent) for accounts without a second factor.
    fn requires_second_factor(&self) -> bool {
        match &self.tfa {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty() && s != "0",
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    }
}

/// Log in and, where the registrar demands it, unlock the session with the TAN.
///
/// `account.unlock` is only ever called when a non-blank TAN is configured;
/// otherwise an authentication-error answer becomes [`ApiError::TanRequired`].
pub async fn login<T>(transport: &T, credentials: &Credentials) -> Result<LoginOutcome>
where
    T: RpcTransport + ?Sized,
{
    let mut params = Params::new();
    params.insert("user".to_string(), Value::from(credentials.username.as_str()));
    params.insert("pass".to_string(), Value::from(credentials.password.as_str()));

    let response = transport.call("account.login", params).await?;
    match response.code {
        COMMAND_SUCCESSFUL => {
            let data: LoginData = response.res_data_opt()?.unwrap_or_default();
            if !data.requires_second_factor() {
                log::debug!("[inwx] logged in as {}", credentials.username);
                return Ok(LoginOutcome::LoggedIn);
            }
            match credentials.usable_tan() {
                Some(tan) => unlock(transport, tan).await.map(|()| LoginOutcome::Unlocked),
                None => Err(ApiError::TanRequired {
                    code: response.code,
                }),
            }
        }
        AUTHENTICATION_ERROR => match credentials.usable_tan() {
            Some(tan) => unlock(transport, tan).await.map(|()| LoginOutcome::Unlocked),
            None => {
                log::warn!("[inwx] login for {} requires a TAN", credentials.username);
                Err(ApiError::TanRequired {
                    code: response.code,
                })
            }
        },
        _ => Err(response.into_api_error("1000")),
    }
}

async fn unlock<T>(transport: &T, tan: &str) -> Result<()>
where
    T: RpcTransport + ?Sized,
{
    let mut params = Params::new();
    params.insert("tan".to_string(), Value::from(tan));
    transport
        .call("account.unlock", params)
        .await?
        .ensure_completed()?;
    log::debug!("[inwx] session unlocked");
    Ok(())
}

/// End the session.
pub async fn logout<T>(transport: &T) -> Result<()>
where
    T: RpcTransport + ?Sized,
{
    let response = transport.call("account.logout", Params::new()).await?;
    if response.code == COMMAND_SUCCESSFUL_ENDING_SESSION {
        return Ok(());
    }
    response.ensure_success().map(|_| ())
}
