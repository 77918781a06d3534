//! Authenticated API client.

use std::fmt;
use std::sync::Arc;

use cloudhost_application::{Authenticator, HttpClient};
use cloudhost_domain::{ApiRequest, ApiResponse, ClientConfiguration, HttpMethod};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::builder::ClientBuilder;
use crate::error::{ClientError, ClientResult};

/// Client for the Cloudhost REST API.
///
/// Every call obtains a token from the [`Authenticator`] first, logging
/// in when needed. A single client is meant to be shared; wrap it in an
/// `Arc` to use it from several tasks.
pub struct Client {
    config: ClientConfiguration,
    authenticator: Authenticator,
    http_client: Arc<dyn HttpClient>,
}

impl Client {
    /// Builds a client from `config` with default collaborators.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub async fn new(config: ClientConfiguration) -> ClientResult<Self> {
        ClientBuilder::new(config).build().await
    }

    /// Starts a [`ClientBuilder`].
    pub fn builder(config: ClientConfiguration) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub(crate) fn from_parts(
        config: ClientConfiguration,
        authenticator: Authenticator,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            authenticator,
            http_client,
        }
    }

    /// Returns the configuration the client was built with.
    #[must_use]
    pub const fn configuration(&self) -> &ClientConfiguration {
        &self.config
    }

    /// Returns the authenticator.
    #[must_use]
    pub const fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Sends `request` with a bearer token and returns the 2xx response.
    ///
    /// Test mode from the configuration is applied to every request.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Auth`] if no token could be obtained
    /// - [`ClientError::Request`] if the URL cannot be built
    /// - [`ClientError::Transport`] if no response was received
    /// - [`ClientError::Api`] for non-2xx responses
    pub async fn call(&self, mut request: ApiRequest) -> ClientResult<ApiResponse> {
        let token = self.authenticator.get_token().await?;

        if self.config.test_mode {
            request.test_mode = true;
        }

        let mut http_request = request
            .prepare(&self.config.base_url)
            .map_err(ClientError::Request)?;
        http_request.set_header("Authorization", token.authorization_header_value());
        http_request.set_header("User-Agent", &self.config.user_agent);

        let response = self.http_client.execute(&http_request).await?;

        debug!(
            method = %http_request.method,
            url = %http_request.url,
            status = response.status,
            "api call completed"
        );

        Ok(response.error_for_status()?)
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`], plus [`ClientError::Decode`] if the body
    /// does not match `T`.
    pub async fn get<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = self.call(with_method(request, HttpMethod::Get)).await?;
        response.json().map_err(ClientError::Decode)
    }

    /// Sends a POST request, discarding the response.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn post(&self, request: ApiRequest) -> ClientResult<()> {
        self.post_with_response(request).await.map(drop)
    }

    /// Sends a POST request and returns the response, e.g. to read its
    /// `Content-Location`.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn post_with_response(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        self.call(with_method(request, HttpMethod::Post)).await
    }

    /// Sends a PUT request, discarding the response.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn put(&self, request: ApiRequest) -> ClientResult<()> {
        self.put_with_response(request).await.map(drop)
    }

    /// Sends a PUT request and returns the response.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn put_with_response(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        self.call(with_method(request, HttpMethod::Put)).await
    }

    /// Sends a PATCH request, discarding the response.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn patch(&self, request: ApiRequest) -> ClientResult<()> {
        self.patch_with_response(request).await.map(drop)
    }

    /// Sends a PATCH request and returns the response.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn patch_with_response(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        self.call(with_method(request, HttpMethod::Patch)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// Same as [`Client::call`].
    pub async fn delete(&self, request: ApiRequest) -> ClientResult<()> {
        self.call(with_method(request, HttpMethod::Delete))
            .await
            .map(drop)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("authenticator", &self.authenticator)
            .finish_non_exhaustive()
    }
}

fn with_method(mut request: ApiRequest, method: HttpMethod) -> ApiRequest {
    request.method = method;
    request
}
