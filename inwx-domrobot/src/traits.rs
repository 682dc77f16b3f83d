use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Params, RpcResponse};

/// DomRobot 传输层 Trait
///
/// The seam between resource handlers and the network. [`crate::Client`] is the
/// production implementation; tests substitute a scripted double.
///
/// Implementations must serialize calls: the registrar session is a single
/// cookie and the API is not safe to drive concurrently from one session.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Call `method` and decode the response envelope.
    ///
    /// The status code is NOT checked here; callers pick
    /// [`RpcResponse::ensure_success`] or [`RpcResponse::ensure_completed`].
    async fn call(&self, method: &str, params: Params) -> Result<RpcResponse>;

    /// Call `method` without decoding the response body.
    ///
    /// Only transport failures are reported.
    async fn call_no_response_body(&self, method: &str, params: Params) -> Result<()> {
        self.call(method, params).await.map(|_| ())
    }
}
