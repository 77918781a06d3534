//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It sends prepared requests as-is and returns every response, whatever
//! its status, for the caller to decode.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use cloudhost_application::ports::{HttpClient, HttpClientError, HttpFuture};
use cloudhost_domain::{ApiResponse, HttpMethod, HttpRequest};
use reqwest::{Client, Method, Response};
use tracing::debug;

/// Largest response body accepted, in bytes.
pub const MAX_RESPONSE_BODY_BYTES: usize = 4 * 1024 * 1024;

/// HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl ReqwestHttpClient {
    /// Creates a client with the given per-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self::with_client(client, timeout))
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            max_body_bytes: MAX_RESPONSE_BODY_BYTES,
        }
    }

    /// Overrides the response body limit.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout: Duration) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }
        if error.is_connect() {
            return HttpClientError::ConnectionFailed(error.to_string());
        }
        if error.is_builder() {
            return HttpClientError::InvalidRequest(error.to_string());
        }
        HttpClientError::Other(error.to_string())
    }

    /// Reads the body chunk by chunk, failing once it passes the limit.
    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, HttpClientError> {
        let limit = self.max_body_bytes;
        let too_large = HttpClientError::BodyTooLarge { limit };

        if response
            .content_length()
            .is_some_and(|len| usize::try_from(len).map_or(true, |len| len > limit))
        {
            return Err(too_large);
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout))?
        {
            if body.len() + chunk.len() > limit {
                return Err(too_large);
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: &'a HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();

            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method), request.url.clone())
                .timeout(self.timeout);
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, self.timeout))?;

            let status = response.status().as_u16();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();
            let body = self.read_body(response).await?;
            let duration = start.elapsed();

            debug!(
                method = %request.method,
                url = %request.url,
                status,
                elapsed_ms = duration.as_millis(),
                "request completed"
            );

            Ok(ApiResponse::new(status, headers, body, duration))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use cloudhost_domain::ApiRequest;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP/1.1 response and returns the raw request.
    async fn serve_once(response: Vec<u8>) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                received.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&received) {
                    break;
                }
            }
            socket.write_all(&response).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&received).into_owned()
        });

        (base, handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        received.len() >= header_end + 4 + content_length
    }

    fn http_response(status_line: &str, body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    fn client() -> ReqwestHttpClient {
        ReqwestHttpClient::new(Duration::from_secs(5), "cloudhost-test/1.0").unwrap()
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[tokio::test]
    async fn test_sends_request_and_returns_response() {
        let (base, server) =
            serve_once(http_response("201 Created", br#"{"token":"abc"}"#)).await;
        let request = ApiRequest::post("/auth")
            .with_header("Signature", "c2ln")
            .with_raw_json_body(br#"{"login":"example-user"}"#.to_vec())
            .prepare(&base)
            .unwrap();

        let response = client().execute(&request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.body, br#"{"token":"abc"}"#.to_vec());
        assert_eq!(response.header("Content-Type"), Some("application/json"));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /auth HTTP/1.1"));
        assert!(raw.to_lowercase().contains("signature: c2ln"));
        assert!(raw.to_lowercase().contains("user-agent: cloudhost-test/1.0"));
        assert!(raw.ends_with(r#"{"login":"example-user"}"#));
    }

    #[tokio::test]
    async fn test_error_status_is_not_transport_error() {
        let (base, _server) =
            serve_once(http_response("409 Conflict", br#"{"error":"taken"}"#)).await;
        let request = ApiRequest::get("/domains").prepare(&base).unwrap();

        let response = client().execute(&request).await.unwrap();

        assert_eq!(response.status, 409);
        assert_eq!(response.api_error().unwrap().message, "taken");
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected() {
        let body = vec![b'a'; 64];
        let (base, _server) = serve_once(http_response("200 OK", &body)).await;
        let request = ApiRequest::get("/big").prepare(&base).unwrap();

        let result = client().with_max_body_bytes(32).execute(&request).await;

        assert_eq!(result, Err(HttpClientError::BodyTooLarge { limit: 32 }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_connection_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let request = ApiRequest::get("/").prepare(&base).unwrap();

        let result = client().execute(&request).await;

        assert!(matches!(result, Err(HttpClientError::ConnectionFailed(_))));
    }
}
