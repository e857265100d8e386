//! Request dispatch and response classification
//!
//! Every call ends in one of four outcomes: a transport error, a protocol
//! error (status >= 300), a plain success carrying only the status, or an XML
//! success carrying the normalized document.

use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::error::{ECONNRESET, ETIMEDOUT, Error, Result};
use crate::nonce::next_nonce;
use crate::signer::{QueryParams, build_auth_headers};
use crate::transport::{BodyReader, HttpRequest, HttpResponse, Method, Transport};
use crate::uri::build_uri;
use crate::xml::{Document, looks_like_xml, normalize_str};

/// Per-call request parameters
pub struct RequestParams {
    pub method: Method,
    /// Action query signed into the request
    pub query: QueryParams,
    /// Overrides the configured timeout for this call
    pub timeout_ms: Option<u64>,
    /// Streaming request body
    pub body: Option<BodyReader>,
}

impl RequestParams {
    /// Bodiless request with the given method and action query
    pub fn new(method: Method, query: QueryParams) -> Self {
        Self {
            method,
            query,
            timeout_ms: None,
            body: None,
        }
    }

    /// Attach a streaming body
    pub fn body(mut self, body: BodyReader) -> Self {
        self.body = Some(body);
        self
    }

    /// Override the timeout for this call
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// Successful outcome of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// The body was not XML; only the status is reported
    Status { status: u16 },
    /// The body was an XML document
    Document(Document),
}

impl Response {
    /// The normalized document, if any
    pub fn document(&self) -> Option<&Document> {
        match self {
            Response::Document(doc) => Some(doc),
            Response::Status { .. } => None,
        }
    }
}

/// Sign, send and classify a request
pub async fn dispatch<T>(
    transport: &T,
    config: &Config,
    path: &str,
    params: RequestParams,
) -> Result<Response>
where
    T: Transport + ?Sized,
{
    let mut response = send(transport, config, path, params).await?;
    let body = read_body(&mut response.body).await?;

    if response.status >= 300 {
        return Err(protocol_error(config, response.status, &body));
    }

    if !looks_like_xml(&body) {
        tracing::debug!(status = response.status, "Plain response");
        return Ok(Response::Status {
            status: response.status,
        });
    }

    let document = normalize_str(&body)?;
    tracing::debug!(status = response.status, root = document.root(), "XML response");
    Ok(Response::Document(document))
}

/// Sign and send a request, streaming a successful body into `sink`
///
/// Error statuses are classified like [`dispatch`] and nothing is written.
pub async fn dispatch_to<T, W>(
    transport: &T,
    config: &Config,
    path: &str,
    params: RequestParams,
    sink: &mut W,
) -> Result<Response>
where
    T: Transport + ?Sized,
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let mut response = send(transport, config, path, params).await?;

    if response.status >= 300 {
        let body = read_body(&mut response.body).await?;
        return Err(protocol_error(config, response.status, &body));
    }

    let copied = tokio::io::copy(&mut response.body, sink)
        .await
        .map_err(copy_error)?;
    sink.flush().await?;
    tracing::debug!(status = response.status, bytes = copied, "Streamed response body");

    Ok(Response::Status {
        status: response.status,
    })
}

async fn send<T>(
    transport: &T,
    config: &Config,
    path: &str,
    params: RequestParams,
) -> Result<HttpResponse>
where
    T: Transport + ?Sized,
{
    // Resolve everything that can fail before touching the network.
    let credentials = config.credentials()?;
    let url = build_uri(path, config)?;
    let now = jiff::Timestamp::now().as_second();
    let auth = build_auth_headers(path, &params.query, &credentials, &next_nonce(), now)?;

    let timeout_ms = params.timeout_ms.unwrap_or(config.request.timeout_ms);
    let request = HttpRequest {
        method: params.method,
        headers: auth
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        url,
        timeout: Duration::from_millis(timeout_ms),
        body: params.body,
    };

    tracing::debug!(
        method = %request.method,
        url = %request.url,
        action = params.query.get("action").unwrap_or_default(),
        timeout_ms,
        "Dispatching request"
    );

    transport.send(request).await
}

async fn read_body(body: &mut BodyReader) -> Result<String> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf).await.map_err(|e| {
        let code = match e.kind() {
            std::io::ErrorKind::TimedOut => ETIMEDOUT,
            _ => ECONNRESET,
        };
        Error::transport(code, format!("Failed to read response: {e}"))
    })?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Socket failures mid-body are transport errors; anything else is the sink's
fn copy_error(err: std::io::Error) -> Error {
    match err.kind() {
        std::io::ErrorKind::TimedOut => Error::transport(ETIMEDOUT, err.to_string()),
        std::io::ErrorKind::ConnectionReset => Error::transport(ECONNRESET, err.to_string()),
        _ => Error::Io(err),
    }
}

fn protocol_error(config: &Config, status: u16, body: &str) -> Error {
    let mut message = format!("The server sent us the {status} code");
    if config.verbose && !body.is_empty() {
        message.push_str(". Body: ");
        message.push_str(body);
    }
    tracing::warn!(status, "Request rejected by server");
    Error::Protocol { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigUpdate;
    use crate::signer::{HEADER_ACTION, HEADER_AUTH_DATA, HEADER_AUTH_SIGN};
    use crate::transport::MockTransport;

    const STAT_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<stat directory="/CODE">
<file type="file" name="FILE.jpg" mtime="1700000000" size="1024"/>
</stat>"#;

    fn config() -> Config {
        Config::new().merged(
            ConfigUpdate::default()
                .key("secret")
                .key_name("upload-key")
                .host("x.example.com")
                .use_tls(true),
        )
    }

    fn stat_params() -> RequestParams {
        RequestParams::new(Method::Get, QueryParams::action("stat"))
    }

    fn transport_returning(status: u16, body: &'static str) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(move |_| Ok(HttpResponse::from_bytes(status, body)));
        transport
    }

    #[tokio::test]
    async fn test_http_error_carries_status() {
        let transport = transport_returning(404, "Not Found");
        let err = dispatch(&transport, &config(), "/missing", stat_params())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));
        assert!(!err.to_string().contains("Not Found"));
    }

    #[tokio::test]
    async fn test_verbose_error_includes_body() {
        let transport = transport_returning(403, "You don't have permission to access");
        let config = config().merged(ConfigUpdate::default().verbose(true));
        let err = dispatch(&transport, &config, "/dir", stat_params())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.to_string(),
            "The server sent us the 403 code. Body: You don't have permission to access"
        );
    }

    #[tokio::test]
    async fn test_verbose_error_without_body() {
        let transport = transport_returning(409, "");
        let config = config().merged(ConfigUpdate::default().verbose(true));
        let err = dispatch(&transport, &config, "/dir", stat_params())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The server sent us the 409 code");
    }

    #[tokio::test]
    async fn test_plain_success_returns_status() {
        let transport = transport_returning(200, "Request Processed.");
        let response = dispatch(&transport, &config(), "/dir", stat_params())
            .await
            .unwrap();
        assert_eq!(response, Response::Status { status: 200 });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"status": 200})
        );
    }

    #[tokio::test]
    async fn test_xml_success_returns_document() {
        let transport = transport_returning(200, STAT_XML);
        let response = dispatch(&transport, &config(), "/CODE/FILE.jpg", stat_params())
            .await
            .unwrap();

        let doc = response.document().unwrap();
        assert_eq!(doc.root(), "stat");
        assert_eq!(doc.element().entries("file")[0]["name"], "FILE.jpg");
    }

    #[tokio::test]
    async fn test_malformed_xml_is_parse_error() {
        let transport = transport_returning(200, r#"<?xml version="1.0"?><stat><file></stat>"#);
        let err = dispatch(&transport, &config(), "/dir", stat_params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Err(Error::transport(ETIMEDOUT, "operation timed out")));

        let err = dispatch(&transport, &config(), "/", stat_params())
            .await
            .unwrap_err();
        assert_eq!(err.transport_code(), Some("ETIMEDOUT"));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_missing_credentials_skip_transport() {
        let mut transport = MockTransport::new();
        transport.expect_send().never();

        let config = Config::new().merged(ConfigUpdate::default().host("x.example.com"));
        let err = dispatch(&transport, &config, "/", stat_params())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_request_shape() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| {
                req.method == Method::Get
                    && req.url == "https://x.example.com/CODE/FILE.jpg"
                    && req.timeout == Duration::from_millis(20_000)
                    && req.header(HEADER_ACTION) == Some("version=1&action=stat&format=xml")
                    && req
                        .header(HEADER_AUTH_DATA)
                        .is_some_and(|d| d.starts_with("5, 0.0.0.0, 0.0.0.0, ") && d.ends_with(", upload-key"))
                    && req.header(HEADER_AUTH_SIGN).is_some_and(|s| s.len() == 44)
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::from_bytes(200, "")));

        dispatch(&transport, &config(), "/CODE/FILE.jpg", stat_params())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_per_call_timeout_overrides_config() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.timeout == Duration::from_millis(1_000))
            .times(1)
            .returning(|_| Ok(HttpResponse::from_bytes(200, "")));

        dispatch(&transport, &config(), "/", stat_params().timeout_ms(1_000))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_configured_timeout_is_used() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.timeout == Duration::from_millis(5_000))
            .times(1)
            .returning(|_| Ok(HttpResponse::from_bytes(200, "")));

        let config = config().merged(ConfigUpdate::default().timeout_ms(5_000));
        dispatch(&transport, &config, "/", stat_params()).await.unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_to_streams_body() {
        let transport = transport_returning(200, "binary-content");
        let mut sink = Vec::new();
        let params = RequestParams::new(Method::Get, QueryParams::action("download"));

        let response = dispatch_to(&transport, &config(), "/CODE/FILE.jpg", params, &mut sink)
            .await
            .unwrap();
        assert_eq!(response, Response::Status { status: 200 });
        assert_eq!(sink, b"binary-content");
    }

    #[tokio::test]
    async fn test_dispatch_to_error_writes_nothing() {
        let transport = transport_returning(404, "Not Found");
        let mut sink = Vec::new();
        let params = RequestParams::new(Method::Get, QueryParams::action("download"));

        let err = dispatch_to(&transport, &config(), "/nope", params, &mut sink)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(sink.is_empty());
    }
}
