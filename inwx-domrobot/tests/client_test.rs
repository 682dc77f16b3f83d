//! Client 回环测试
//!
//! Runs the real [`Client`] against a local stub endpoint:
//! ```bash
//! cargo test -p inwx-domrobot --test client_test
//! ```

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{StubReply, StubServer};
use inwx_domrobot::{ApiError, Client, Credentials, LoginOutcome, Params, RpcTransport, session};
use serde_json::json;

fn domain_params(domain: &str) -> Params {
    let mut params = Params::new();
    params.insert("domain".to_string(), json!(domain));
    params
}

#[tokio::test]
async fn login_cookie_is_replayed_on_later_calls() {
    let server = StubServer::start(Duration::ZERO, |req| match req.method.as_str() {
        "account.login" => StubReply::json(json!({"code": 1000, "msg": "ok", "resData": {"tfa": "0"}}))
            .with_cookie("domrobot=session-1234; Path=/"),
        _ => StubReply::json(json!({"code": 1000, "msg": "ok", "resData": {"domain": "example.com"}})),
    })
    .await;
    let client = server.client();

    let outcome = require_ok!(session::login(&client, &Credentials::new("alice", "secret")).await);
    assert_eq!(outcome, LoginOutcome::LoggedIn);
    assert!(client.has_session_cookie());

    let info = require_ok!(client.call("domain.info", domain_params("example.com")).await);
    assert_eq!(info.code, 1000);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].cookie, None);
    assert_eq!(requests[1].cookie.as_deref(), Some("domrobot=session-1234"));
}

#[tokio::test]
async fn request_is_json_rpc_post() {
    let server = StubServer::start(Duration::ZERO, |_| {
        StubReply::json(json!({"code": 1000, "msg": "ok"}))
    })
    .await;
    let client = server.client();

    require_ok!(client.call("domain.check", domain_params("example.org")).await);

    let requests = server.requests();
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json; charset=UTF-8")
    );
    assert_eq!(
        requests[0].body,
        json!({"method": "domain.check", "params": {"domain": "example.org"}})
    );
}

#[tokio::test]
async fn concurrent_calls_are_serialized() {
    let server = StubServer::start(Duration::from_millis(40), |_| {
        StubReply::json(json!({"code": 1000, "msg": "ok"}))
    })
    .await;
    let client = Arc::new(server.client());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .call("domain.info", domain_params(&format!("example{i}.com")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "call failed: {result:?}");
    }

    assert_eq!(server.requests().len(), 4);
    assert_eq!(server.max_in_flight(), 1);
}

#[tokio::test]
async fn error_code_is_not_checked_by_call() {
    let server = StubServer::start(Duration::ZERO, |_| {
        StubReply::json(json!({"code": 2303, "msg": "Object does not exist"}))
    })
    .await;
    let client = server.client();

    let response = require_ok!(client.call("contact.info", Params::new()).await);
    assert_eq!(response.code, 2303);
    let err = response.ensure_success().unwrap_err();
    assert!(err.to_string().contains("Object does not exist"));
}

#[tokio::test]
async fn envelope_without_code_is_decode_error() {
    let server = StubServer::start(Duration::ZERO, |_| StubReply::json(json!("maintenance"))).await;
    let client = server.client();

    let err = client.call("domain.info", Params::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn no_response_body_variant_ignores_payload() {
    let server = StubServer::start(Duration::ZERO, |_| StubReply::json(json!("ignored"))).await;
    let client = server.client();

    require_ok!(client.call_no_response_body("host.delete", Params::new()).await);
    assert_eq!(server.requests()[0].method, "host.delete");
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Client::builder()
        .api_url(format!("http://127.0.0.1:{port}/jsonrpc/"))
        .build()
        .unwrap();

    let err = client.call("domain.info", Params::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }), "{err:?}");
}

#[tokio::test]
async fn session_survives_in_cookie_file() {
    let server = StubServer::start(Duration::ZERO, |req| match req.method.as_str() {
        "account.login" => StubReply::json(json!({"code": 1000, "msg": "ok", "resData": {"tfa": "0"}}))
            .with_cookie("domrobot=session-5678; Path=/"),
        _ => StubReply::json(json!({"code": 1000, "msg": "ok"})),
    })
    .await;
    let path = std::env::temp_dir().join(format!("inwx-session-{}.cookies", std::process::id()));
    let _ = std::fs::remove_file(&path);

    let first = require_ok!(Client::builder().api_url(&server.url).cookie_file(&path).build());
    require_ok!(session::login(&first, &Credentials::new("alice", "secret")).await);
    let saved = require_ok!(std::fs::read_to_string(&path));
    assert_eq!(saved.trim(), "domrobot=session-5678");

    // 新的 Client 从文件恢复会话，无需再次登录
    let second = require_ok!(Client::builder().api_url(&server.url).cookie_file(&path).build());
    assert!(second.has_session_cookie());
    require_ok!(second.call("domain.info", domain_params("example.com")).await);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, "domain.info");
    assert_eq!(requests[1].cookie.as_deref(), Some("domrobot=session-5678"));
    let _ = std::fs::remove_file(&path);
}
