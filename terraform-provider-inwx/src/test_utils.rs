//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use inwx_domrobot::{ApiError, Params, RpcResponse, RpcTransport};
use serde_json::{json, Value};
use tokio::sync::RwLock;

// ===== MockTransport =====

/// One recorded RPC call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
    pub with_body: bool,
}

/// Scripted [`RpcTransport`]: answers from per-method queues and records every call.
pub struct MockTransport {
    responses: RwLock<HashMap<String, VecDeque<Value>>>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queue the raw response body for the next call of `method`.
    pub async fn respond(&self, method: &str, body: Value) {
        self.responses
            .write()
            .await
            .entry(method.to_string())
            .or_default()
            .push_back(body);
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn methods(&self) -> Vec<String> {
        self.calls
            .read()
            .await
            .iter()
            .map(|c| c.method.clone())
            .collect()
    }

    /// Params of every call made to `method`, oldest first.
    pub async fn params_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.params.clone())
            .collect()
    }

    async fn record(&self, method: &str, params: Params, with_body: bool) -> Option<Value> {
        self.calls.write().await.push(RecordedCall {
            method: method.to_string(),
            params: Value::Object(params),
            with_body,
        });
        self.responses
            .write()
            .await
            .get_mut(method)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, method: &str, params: Params) -> inwx_domrobot::Result<RpcResponse> {
        match self.record(method, params, true).await {
            Some(body) => RpcResponse::from_json(method, body),
            None => Err(ApiError::Transport {
                method: method.to_string(),
                detail: "no scripted response".to_string(),
            }),
        }
    }

    async fn call_no_response_body(
        &self,
        method: &str,
        params: Params,
    ) -> inwx_domrobot::Result<()> {
        self.record(method, params, false).await;
        Ok(())
    }
}

// ===== 响应工厂 =====

/// `{"code": 1000, "msg": ..., "resData": data}`
pub fn ok(data: Value) -> Value {
    json!({"code": 1000, "msg": "Command completed successfully", "resData": data})
}

/// `{"code": 1000}` without payload
pub fn ok_empty() -> Value {
    json!({"code": 1000, "msg": "Command completed successfully"})
}

/// `{"code": 1001, ...}`
pub fn pending(data: Value) -> Value {
    json!({"code": 1001, "msg": "Command completed successfully; action pending", "resData": data})
}

/// Error response with the given code
pub fn failure(code: i64, msg: &str) -> Value {
    json!({"code": code, "msg": msg})
}
