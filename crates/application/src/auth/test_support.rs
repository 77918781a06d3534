//! In-memory fakes of the ports, for authenticator tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use cloudhost_domain::{ApiResponse, HttpRequest, Token};
use parking_lot::Mutex;

use crate::ports::{
    Clock, HttpClient, HttpClientError, HttpFuture, KeyManager, KeyManagerError, TokenCache,
    TokenCacheError,
};

pub const RSA_KEY: &[u8] = include_bytes!("../../testdata/rsa_private_key.pem");

pub fn raw_token(exp: DateTime<Utc>, jti: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"typ":"JWT","alg":"RS512"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "jti": jti, "iat": exp.timestamp() - 3600, "exp": exp.timestamp() })
            .to_string(),
    );
    format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn token(exp: DateTime<Utc>, jti: &str) -> Token {
    Token::parse(&raw_token(exp, jti)).unwrap()
}

pub fn login_response(raw: &str) -> Result<ApiResponse, HttpClientError> {
    Ok(json_response(
        201,
        &serde_json::json!({ "token": raw }).to_string(),
    ))
}

pub fn json_response(status: u16, body: &str) -> ApiResponse {
    ApiResponse::new(
        status,
        HashMap::new(),
        body.as_bytes().to_vec(),
        Duration::ZERO,
    )
}

/// Clock pinned to a settable instant.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.0.lock();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct FakeHttpClient {
    responses: Mutex<VecDeque<Result<ApiResponse, HttpClientError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn push(&self, response: Result<ApiResponse, HttpClientError>) {
        self.responses.lock().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl HttpClient for FakeHttpClient {
    fn execute<'a>(&'a self, request: &'a HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            self.requests.lock().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(HttpClientError::Other("no response queued".to_string())))
        })
    }
}

/// Token cache backed by a map, counting calls.
#[derive(Default)]
pub struct FakeTokenCache {
    tokens: Mutex<HashMap<String, Token>>,
    pub loads: AtomicUsize,
    pub stores: AtomicUsize,
    pub fail_store: bool,
}

impl FakeTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_store() -> Self {
        Self {
            fail_store: true,
            ..Self::default()
        }
    }

    pub fn seed(&self, key: &str, token: Token) {
        self.tokens.lock().insert(key.to_string(), token);
    }

    pub fn get(&self, key: &str) -> Option<Token> {
        self.tokens.lock().get(key).cloned()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn store_count(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenCache for FakeTokenCache {
    async fn load(&self, key: &str) -> Result<Option<Token>, TokenCacheError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(key))
    }

    async fn store(&self, key: &str, token: &Token) -> Result<(), TokenCacheError> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.fail_store {
            return Err(TokenCacheError::Backend("disk full".to_string()));
        }
        self.seed(key, token.clone());
        Ok(())
    }
}

/// External signer returning a fixed signature.
pub struct StaticKeyManager {
    pub signature: String,
    pub calls: AtomicUsize,
}

impl StaticKeyManager {
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KeyManager for StaticKeyManager {
    async fn sign(&self, _body: &[u8]) -> Result<String, KeyManagerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.signature.clone())
    }
}
