//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::env;

use async_trait::async_trait;
use inwx_domrobot::{ApiError, OTE_API_URL, Params, RpcResponse, RpcTransport};
use serde_json::{json, Value};
use terraform_provider_inwx::{InwxProvider, ProviderBlock, ProviderConfig, ProviderResult};
use tokio::sync::Mutex;

/// 跳过测试的宏（当环境变量缺失时）
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("跳过测试: 缺少环境变量 {}", $var);
                return;
            }
        )+
    };
}

/// 断言 `Result` 为 `Ok`，并解包返回内部值（失败则直接让测试失败）。
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got Err({:?})", res.as_ref().err());
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: Err({:?})",
            format_args!($($msg)+),
            res.as_ref().err()
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Transport answering from per-method queues, recording `(method, params)`.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub async fn reply(&self, method: &str, body: Value) {
        self.replies
            .lock()
            .await
            .entry(method.to_string())
            .or_default()
            .push_back(body);
    }

    pub async fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().await.clone()
    }

    pub async fn params_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    async fn next(&self, method: &str, params: Params) -> Option<Value> {
        self.calls
            .lock()
            .await
            .push((method.to_string(), Value::Object(params)));
        self.replies
            .lock()
            .await
            .get_mut(method)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn call(&self, method: &str, params: Params) -> inwx_domrobot::Result<RpcResponse> {
        match self.next(method, params).await {
            Some(body) => RpcResponse::from_json(method, body),
            None => Err(ApiError::Transport {
                method: method.to_string(),
                detail: "no scripted reply".to_string(),
            }),
        }
    }

    async fn call_no_response_body(&self, method: &str, params: Params) -> inwx_domrobot::Result<()> {
        self.next(method, params).await;
        Ok(())
    }
}

pub fn success(data: Value) -> Value {
    json!({"code": 1000, "msg": "Command completed successfully", "resData": data})
}

pub fn success_empty() -> Value {
    json!({"code": 1000, "msg": "Command completed successfully"})
}

/// Provider logged in to OTE (or `INWX_API_URL`) with `INWX_*` credentials.
pub async fn ote_provider() -> ProviderResult<InwxProvider> {
    let block = ProviderBlock {
        api_url: Some(env::var("INWX_API_URL").unwrap_or_else(|_| OTE_API_URL.to_string())),
        ..ProviderBlock::default()
    };
    InwxProvider::configure(ProviderConfig::resolve(block)).await
}
