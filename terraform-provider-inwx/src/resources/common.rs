//! Resource 公共工具函数

use std::collections::BTreeMap;

use serde_json::Value;

use inwx_domrobot::{OBJECT_DOES_NOT_EXIST, Params, RpcResponse, RpcTransport};

use crate::error::{ApiResultExt, ProviderResult};

// ============ 参数构建 ============

/// Builds the `params` object of an RPC call.
#[derive(Debug, Default)]
pub(crate) struct ParamsBuilder {
    params: Params,
}

impl ParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Only sets `key` when a value is present.
    pub fn set_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Only sets `key` when `plan` differs from `prior`.
    pub fn set_changed<V>(self, key: &str, plan: &V, prior: &V) -> Self
    where
        V: PartialEq + Clone + Into<Value>,
    {
        if plan == prior {
            self
        } else {
            self.set(key, plan.clone())
        }
    }

    /// Like [`Self::set_changed`] for optional strings; clearing sends `""`.
    pub fn set_changed_str(self, key: &str, plan: Option<&str>, prior: Option<&str>) -> Self {
        if plan == prior {
            self
        } else {
            self.set(key, plan.unwrap_or_default())
        }
    }

    /// Like [`Self::set_changed`] for optional values that cannot be cleared;
    /// removing the attribute leaves the remote value alone.
    pub fn set_changed_opt<V>(self, key: &str, plan: Option<&V>, prior: Option<&V>) -> Self
    where
        V: PartialEq + Clone + Into<Value>,
    {
        match plan {
            Some(value) if plan != prior => self.set(key, value.clone()),
            _ => self,
        }
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn build(self) -> Params {
        self.params
    }
}

/// `extra_data`-style string maps as a JSON object.
pub(crate) fn string_map(map: &BTreeMap<String, String>) -> Value {
    Value::Object(
        map.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

// ============ RPC 调用 ============

/// Call and accept 1000/1001.
pub(crate) async fn call_success(
    client: &dyn RpcTransport,
    method: &str,
    params: Params,
    summary: &str,
) -> ProviderResult<RpcResponse> {
    client
        .call(method, params)
        .await
        .and_then(RpcResponse::ensure_success)
        .context(summary)
}

/// Call and accept only 1000.
pub(crate) async fn call_completed(
    client: &dyn RpcTransport,
    method: &str,
    params: Params,
    summary: &str,
) -> ProviderResult<RpcResponse> {
    client
        .call(method, params)
        .await
        .and_then(RpcResponse::ensure_completed)
        .context(summary)
}

/// Call a lookup: 1000 is the object, "object does not exist" is `None`.
pub(crate) async fn call_lookup(
    client: &dyn RpcTransport,
    method: &str,
    params: Params,
    summary: &str,
) -> ProviderResult<Option<RpcResponse>> {
    let response = client.call(method, params).await.context(summary)?;
    if response.code == OBJECT_DOES_NOT_EXIST {
        return Ok(None);
    }
    response.ensure_completed().map(Some).context(summary)
}

/// Call an endpoint whose response body is not inspected.
pub(crate) async fn call_no_body(
    client: &dyn RpcTransport,
    method: &str,
    params: Params,
    summary: &str,
) -> ProviderResult<()> {
    client
        .call_no_response_body(method, params)
        .await
        .context(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_opt_skips_none() {
        let params = ParamsBuilder::new()
            .set("domain", "example.com")
            .set_opt("name", None::<String>)
            .set_opt("ttl", Some(3600))
            .build();
        assert_eq!(Value::Object(params), json!({"domain": "example.com", "ttl": 3600}));
    }

    #[test]
    fn set_changed_only_on_difference() {
        let params = ParamsBuilder::new()
            .set_changed("period", &"1Y".to_string(), &"1Y".to_string())
            .set_changed("transferLock", &false, &true)
            .set_changed_str("org", None, Some("ACME"))
            .set_changed_opt("prio", None::<&i64>, Some(&10))
            .set_changed_opt("ttl", Some(&300), Some(&3600))
            .build();
        assert_eq!(
            Value::Object(params),
            json!({"transferLock": false, "org": "", "ttl": 300})
        );
    }

    #[test]
    fn string_map_to_object() {
        let mut map = BTreeMap::new();
        map.insert("ACCEPT-TRUSTEE-TAC".to_string(), "1".to_string());
        assert_eq!(string_map(&map), json!({"ACCEPT-TRUSTEE-TAC": "1"}));
    }
}
