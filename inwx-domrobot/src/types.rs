//! Wire types of the DomRobot JSON-RPC protocol.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::utils::lenient;
use crate::utils::log_sanitizer::truncate_for_log;

/// Named parameters of an RPC call.
pub type Params = Map<String, Value>;

/// Command completed successfully.
pub const COMMAND_SUCCESSFUL: i64 = 1000;

/// Command completed successfully; the action is pending at the registry.
pub const COMMAND_SUCCESSFUL_PENDING: i64 = 1001;

/// Command completed successfully; the session has ended (`account.logout`).
pub const COMMAND_SUCCESSFUL_ENDING_SESSION: i64 = 1500;

/// Authentication error. On `account.login` this means a second factor is required.
pub const AUTHENTICATION_ERROR: i64 = 2200;

/// The addressed object does not exist.
pub const OBJECT_DOES_NOT_EXIST: i64 = 2303;

/// Request body: `{"method": ..., "params": {...}}`.
#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub method: &'a str,
    pub params: &'a Params,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(deserialize_with = "lenient::int")]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(rename = "resData", default)]
    res_data: Option<Value>,
}

/// Decoded DomRobot response.
///
/// `resData` stays raw JSON until a caller decodes it with [`RpcResponse::res_data`],
/// because every method returns a different, loosely typed shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    method: String,
    /// Status code.
    pub code: i64,
    /// Status message.
    pub msg: String,
    /// Additional reason given for errors.
    pub reason: Option<String>,
    /// Result payload.
    pub res_data: Option<Value>,
    raw: Value,
}

impl RpcResponse {
    /// Decode a response body received for `method`.
    pub fn from_json(method: &str, body: Value) -> Result<Self> {
        let envelope: Envelope =
            serde_json::from_value(body.clone()).map_err(|e| ApiError::Decode {
                method: method.to_string(),
                detail: format!("{e}, body: {}", truncate_for_log(&body.to_string())),
            })?;
        Ok(Self {
            method: method.to_string(),
            code: envelope.code,
            msg: envelope.msg.unwrap_or_default(),
            reason: envelope.reason,
            res_data: envelope.res_data,
            raw: body,
        })
    }

    /// RPC method this response belongs to.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The complete response as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// `true` for 1000 and 1001.
    pub fn is_success(&self) -> bool {
        matches!(self.code, COMMAND_SUCCESSFUL | COMMAND_SUCCESSFUL_PENDING)
    }

    /// Accept 1000 and 1001, reject everything else with the raw body attached.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.into_api_error("1000 or 1001"))
        }
    }

    /// Accept only 1000. Reads and some updates must not be pending.
    pub fn ensure_completed(self) -> Result<Self> {
        if self.code == COMMAND_SUCCESSFUL {
            Ok(self)
        } else {
            Err(self.into_api_error("1000"))
        }
    }

    /// Convert into [`ApiError::Api`], `expected` naming the accepted codes.
    pub fn into_api_error(self, expected: &str) -> ApiError {
        let message = match &self.reason {
            Some(reason) if !reason.is_empty() => format!("{} ({reason})", self.msg),
            _ => self.msg.clone(),
        };
        ApiError::Api {
            method: self.method,
            code: self.code,
            message,
            expected: expected.to_string(),
            raw: self.raw.to_string(),
        }
    }

    /// Decode `resData` into `T`. A missing payload is a decode error.
    pub fn res_data<T: DeserializeOwned>(&self) -> Result<T> {
        match self.res_data_opt()? {
            Some(data) => Ok(data),
            None => Err(ApiError::Decode {
                method: self.method.clone(),
                detail: "response has no resData".to_string(),
            }),
        }
    }

    /// Decode `resData` into `T`; `None` when the payload is missing or `null`.
    pub fn res_data_opt<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match &self.res_data {
            None | Some(Value::Null) => Ok(None),
            Some(data) => T::deserialize(data).map(Some).map_err(|e| ApiError::Decode {
                method: self.method.clone(),
                detail: format!(
                    "unexpected resData shape: {e}, resData: {}",
                    truncate_for_log(&data.to_string())
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_encoding() {
        let mut params = Params::new();
        params.insert("domain".to_string(), json!("example.com"));
        let body = serde_json::to_value(RpcRequest {
            method: "domain.info",
            params: &params,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"method": "domain.info", "params": {"domain": "example.com"}})
        );
    }

    #[test]
    fn float_code_is_decoded() {
        let response =
            RpcResponse::from_json("domain.check", json!({"code": 1000.0, "msg": "ok"})).unwrap();
        assert_eq!(response.code, 1000);
        assert!(response.is_success());
        assert_eq!(response.res_data, None);
    }

    #[test]
    fn missing_code_is_decode_error() {
        let err = RpcResponse::from_json("domain.check", json!({"msg": "??"})).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn pending_accepted_by_success_only() {
        let response =
            RpcResponse::from_json("domain.create", json!({"code": 1001, "msg": "pending"}))
                .unwrap();
        assert!(response.clone().ensure_success().is_ok());
        let err = response.ensure_completed().unwrap_err();
        assert_eq!(err.status_code(), Some(1001));
    }

    #[test]
    fn error_carries_raw_body() {
        let body = json!({"code": 2302, "msg": "Object exists", "reason": "duplicate"});
        let err = RpcResponse::from_json("contact.create", body.clone())
            .unwrap()
            .ensure_success()
            .unwrap_err();
        match err {
            ApiError::Api {
                method,
                code,
                message,
                raw,
                ..
            } => {
                assert_eq!(method, "contact.create");
                assert_eq!(code, 2302);
                assert_eq!(message, "Object exists (duplicate)");
                assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn res_data_shapes() {
        #[derive(Deserialize)]
        struct Created {
            #[serde(deserialize_with = "lenient::int")]
            id: i64,
        }

        let response =
            RpcResponse::from_json("contact.create", json!({"code": 1000, "resData": {"id": 42.0}}))
                .unwrap();
        assert_eq!(response.res_data::<Created>().unwrap().id, 42);

        let empty = RpcResponse::from_json("contact.create", json!({"code": 1000})).unwrap();
        assert!(matches!(
            empty.res_data::<Created>(),
            Err(ApiError::Decode { .. })
        ));
        assert!(empty.res_data_opt::<Created>().unwrap().is_none());

        let wrong =
            RpcResponse::from_json("contact.create", json!({"code": 1000, "resData": [1, 2]}))
                .unwrap();
        assert!(wrong.res_data::<Created>().is_err());
    }
}
