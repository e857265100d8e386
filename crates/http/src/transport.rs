//! HTTP transport implementation
//!
//! Implements the ns-core `Transport` trait over reqwest. Request and
//! response bodies are streamed, never buffered whole.
//!
//! The request timeout is an idle timeout: a call fails only when no bytes
//! move for that long, so large transfers are not cut off.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};
use tokio::time::Instant;
use reqwest::Client;
use tokio_util::io::{ReaderStream, StreamReader};

use ns_core::error::{ECONNREFUSED, ECONNRESET, ETIMEDOUT};
use ns_core::{BodyReader, Error, HttpRequest, HttpResponse, Method, Result, Transport};

/// User agent sent with every request
const USER_AGENT: &str = concat!("ns/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed transport
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
        };
        let idle = request.timeout;
        let progress = Progress::new();

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            let tracker = progress.clone();
            let chunks = ReaderStream::new(body).inspect_ok(move |_| tracker.touch());
            builder = builder.body(reqwest::Body::wrap_stream(chunks));
        }

        let response = tokio::select! {
            result = builder.send() => result.map_err(map_error)?,
            () = progress.stalled(idle) => {
                return Err(Error::transport(ETIMEDOUT, "request timed out"));
            }
        };
        let status = response.status().as_u16();
        tracing::debug!(status, url = %request.url, "Received response");

        let chunks = Box::pin(response.bytes_stream().map_err(body_error));
        let body: BodyReader = Box::new(StreamReader::new(Box::pin(idle_timeout(chunks, idle))));

        Ok(HttpResponse { status, body })
    }
}

/// Time of the last request-body chunk handed to the connection
#[derive(Debug, Clone)]
struct Progress {
    start: Instant,
    last_ms: Arc<AtomicU64>,
}

impl Progress {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            last_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn touch(&self) {
        let elapsed = u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_ms.store(elapsed, Ordering::Relaxed);
    }

    fn last(&self) -> Instant {
        self.start + Duration::from_millis(self.last_ms.load(Ordering::Relaxed))
    }

    /// Resolves once no progress has been made for `idle`
    async fn stalled(&self, idle: Duration) {
        loop {
            let deadline = self.last() + idle;
            if Instant::now() >= deadline {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }
}

/// Fail the stream when the next chunk takes longer than `idle`
fn idle_timeout<S, T>(stream: S, idle: Duration) -> impl Stream<Item = io::Result<T>> + Send
where
    S: Stream<Item = io::Result<T>> + Send + Unpin,
    T: Send,
{
    futures::stream::unfold(Some(stream), move |state| async move {
        let mut stream = state?;
        match tokio::time::timeout(idle, stream.next()).await {
            Ok(Some(item)) => Some((item, Some(stream))),
            Ok(None) => None,
            Err(_) => Some((
                Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "response body timed out",
                )),
                None,
            )),
        }
    })
}

/// Map a reqwest failure to a transport error code
fn map_error(err: reqwest::Error) -> Error {
    let code = if err.is_timeout() {
        ETIMEDOUT
    } else if err.is_connect() {
        ECONNREFUSED
    } else {
        ECONNRESET
    };
    Error::transport(code, describe(&err))
}

fn body_error(err: reqwest::Error) -> io::Error {
    if err.is_timeout() {
        return io::Error::new(io::ErrorKind::TimedOut, "response body timed out");
    }
    io::Error::new(io::ErrorKind::ConnectionReset, describe(&err))
}

/// reqwest's message followed by its underlying causes
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
