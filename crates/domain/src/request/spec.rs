//! API requests and their resolved HTTP form.
//!
//! An [`ApiRequest`] is what callers build: an endpoint relative to the
//! API base path plus query, headers and an optional JSON body. Preparing
//! it against a base URL yields the [`HttpRequest`] handed to the
//! transport.

use serde::Serialize;
use url::Url;

use super::HttpMethod;
use crate::error::{DomainError, DomainResult};

/// MIME type of every request and response body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Query parameter that marks a request as a dry run.
pub const TEST_MODE_PARAM: &str = "test";

/// A request against an API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Endpoint path relative to the base URL, e.g. `/domains`
    pub endpoint: String,
    /// Query parameters in insertion order
    pub query: Vec<(String, String)>,
    /// Extra headers
    pub headers: Vec<(String, String)>,
    /// Encoded JSON body
    pub body: Option<Vec<u8>>,
    /// Ask the API to validate without applying changes
    pub test_mode: bool,
}

impl ApiRequest {
    /// Creates a request without query, headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serializes `body` as the JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if the value cannot be serialized.
    pub fn with_json_body<T: Serialize>(mut self, body: &T) -> DomainResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Uses already-encoded JSON bytes as the body, unchanged.
    #[must_use]
    pub fn with_raw_json_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Enables or disables test mode.
    #[must_use]
    pub const fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Resolves the request against `base_url`.
    ///
    /// The endpoint is appended to the base path (so `/v6` in the base is
    /// kept), query parameters are added in order, and test mode adds
    /// `test=1` unless the caller already set it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the joined URL does not parse.
    pub fn prepare(&self, base_url: &str) -> DomainResult<HttpRequest> {
        let base = base_url.trim_end_matches('/');
        let joined = if self.endpoint.is_empty() || self.endpoint.starts_with('/') {
            format!("{base}{}", self.endpoint)
        } else {
            format!("{base}/{}", self.endpoint)
        };

        let mut url =
            Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))?;

        let mut query = self.query.clone();
        if self.test_mode && !query.iter().any(|(name, _)| name == TEST_MODE_PARAM) {
            query.push((TEST_MODE_PARAM.to_string(), "1".to_string()));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let mut request = HttpRequest {
            method: self.method,
            url,
            headers: Vec::with_capacity(self.headers.len() + 2),
            body: self.body.clone(),
        };
        request.set_header("Content-Type", JSON_CONTENT_TYPE);
        request.set_header("Accept", JSON_CONTENT_TYPE);
        for (name, value) in &self.headers {
            request.set_header(name, value);
        }

        Ok(request)
    }
}

/// A fully resolved request ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including the query string
    pub url: Url,
    /// Headers; names are unique, compared case-insensitively
    pub headers: Vec<(String, String)>,
    /// Request body bytes
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Sets a header, replacing any existing header with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            existing.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Length of the body in bytes.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
}
