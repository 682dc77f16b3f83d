//! 共享测试工具和辅助函数

#![allow(dead_code)]

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use inwx_domrobot::{Client, Credentials, OTE_API_URL};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

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
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
    ($expr:expr, $($msg:tt)+) => {{
        let res = $expr;
        assert!(
            res.is_ok(),
            "{}: {res:?}",
            format_args!($($msg)+)
        );
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// One request as seen by [`StubServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// `method` field of the JSON-RPC body.
    pub method: String,
    /// Decoded request body.
    pub body: Value,
    pub cookie: Option<String>,
    pub content_type: Option<String>,
}

/// What the stub answers: JSON body plus an optional `Set-Cookie` value.
pub struct StubReply {
    pub body: Value,
    pub set_cookie: Option<String>,
}

impl StubReply {
    pub fn json(body: Value) -> Self {
        Self {
            body,
            set_cookie: None,
        }
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.set_cookie = Some(cookie.to_string());
        self
    }
}

type Handler = dyn Fn(&RecordedRequest) -> StubReply + Send + Sync;

/// Minimal HTTP/1.1 endpoint on 127.0.0.1 speaking just enough to stand in
/// for DomRobot. Every connection serves one request and is then closed.
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    max_in_flight: Arc<AtomicUsize>,
}

impl StubServer {
    /// Start serving; `delay` is spent inside every request so overlapping
    /// exchanges would be observable.
    pub async fn start<F>(delay: Duration, handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let handler: Arc<Handler> = Arc::new(handler);

        {
            let requests = Arc::clone(&requests);
            let max_in_flight = Arc::clone(&max_in_flight);
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        break;
                    };
                    let requests = Arc::clone(&requests);
                    let in_flight = Arc::clone(&in_flight);
                    let max_in_flight = Arc::clone(&max_in_flight);
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_in_flight.fetch_max(now, Ordering::SeqCst);
                        serve_one(stream, delay, &*handler, &requests).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            });
        }

        Self {
            url: format!("http://{addr}/jsonrpc/"),
            requests,
            max_in_flight,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of requests the stub ever handled at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn client(&self) -> Client {
        Client::builder().api_url(&self.url).debug(true).build().unwrap()
    }
}

async fn serve_one(
    stream: TcpStream,
    delay: Duration,
    handler: &Handler,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0usize;
    let mut cookie = None;
    let mut content_type = None;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            return;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            break;
        }
        if let Some((name, value)) = trimmed.split_once(':') {
            let value = value.trim().to_string();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "cookie" => cookie = Some(value),
                "content-type" => content_type = Some(value),
                _ => {}
            }
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let recorded = RecordedRequest {
        method: body["method"].as_str().unwrap_or_default().to_string(),
        body,
        cookie,
        content_type,
    };
    requests.lock().unwrap().push(recorded.clone());

    tokio::time::sleep(delay).await;

    let reply = handler(&recorded);
    let payload = reply.body.to_string();
    let mut head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json; charset=UTF-8\r\nContent-Length: {}\r\nConnection: close\r\n",
        payload.len()
    );
    if let Some(set_cookie) = reply.set_cookie {
        head.push_str(&format!("Set-Cookie: {set_cookie}\r\n"));
    }
    head.push_str("\r\n");

    let mut stream = reader.into_inner();
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(payload.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// OTE 测试上下文
pub struct OteContext {
    pub client: Client,
    pub credentials: Credentials,
}

impl OteContext {
    pub fn from_env() -> Option<Self> {
        let username = env::var("INWX_USERNAME").ok()?;
        let password = env::var("INWX_PASSWORD").ok()?;
        let mut credentials = Credentials::new(username, password);
        if let Ok(tan) = env::var("INWX_TAN") {
            credentials = credentials.with_tan(tan);
        }
        let api_url = env::var("INWX_API_URL").unwrap_or_else(|_| OTE_API_URL.to_string());
        let client = Client::builder().api_url(api_url).build().ok()?;
        Some(Self {
            client,
            credentials,
        })
    }
}
