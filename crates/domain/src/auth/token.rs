//! Access token parsing and expiry checks.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Authorization scheme used when presenting a token.
pub const BEARER_SCHEME: &str = "Bearer";

/// Claims embedded in the payload segment of an access token.
#[derive(Debug, Deserialize)]
struct RawClaims {
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    ro: bool,
    #[serde(default)]
    gk: bool,
    #[serde(default)]
    jti: Option<String>,
}

/// Parsed claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// When the token was issued, if the issuer stated it.
    pub issued_at: Option<DateTime<Utc>>,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Whether API calls made with this token are limited to reads.
    pub read_only: bool,
    /// Whether the token may only be used from the IP that requested it.
    pub whitelisted: bool,
    /// Issuer-assigned token identifier.
    pub token_id: Option<String>,
}

/// An issued access token.
///
/// Tokens are immutable: a stale token is replaced, never updated.
/// The serialized form is the raw bearer string, and deserialization
/// goes through [`Token::parse`], so a token read back from storage
/// has always been validated.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Token {
    raw: String,
    claims: TokenClaims,
}

impl Token {
    /// Parses a raw bearer string.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedToken`] if the string is not a
    /// three-segment token, the payload cannot be decoded, or the
    /// expiry claim is missing.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        let segments: Vec<&str> = raw.split('.').collect();
        let [_, payload, _] = segments.as_slice() else {
            return Err(DomainError::MalformedToken(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        };

        let bytes = decode_segment(payload)?;
        let claims: RawClaims = serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::MalformedToken(format!("invalid claims: {e}")))?;

        let expires_at = timestamp(claims.exp, "exp")?;
        let issued_at = claims.iat.map(|iat| timestamp(iat, "iat")).transpose()?;

        Ok(Self {
            raw: raw.to_string(),
            claims: TokenClaims {
                issued_at,
                expires_at,
                read_only: claims.ro,
                whitelisted: !claims.gk,
                token_id: claims.jti,
            },
        })
    }

    /// Returns the raw bearer string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed claims.
    #[must_use]
    pub const fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Returns the expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at
    }

    /// Returns true if the token only permits non-mutating calls.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.claims.read_only
    }

    /// Returns true if the token is bound to the requesting IP.
    #[must_use]
    pub const fn is_whitelisted(&self) -> bool {
        self.claims.whitelisted
    }

    /// Returns true once `now` has reached the expiry timestamp.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.claims.expires_at
    }

    /// Seconds remaining until expiry; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.claims.expires_at - now).num_seconds()
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization_header_value(&self) -> String {
        format!("{BEARER_SCHEME} {}", self.raw)
    }

    /// Short prefix of the bearer value for logs and debug output.
    #[must_use]
    pub fn preview(&self) -> String {
        if self.raw.len() > 12 {
            format!("{}...", self.raw.chars().take(8).collect::<String>())
        } else {
            "***".to_string()
        }
    }
}

fn decode_segment(segment: &str) -> DomainResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|e| DomainError::MalformedToken(format!("invalid payload encoding: {e}")))
}

fn timestamp(secs: i64, claim: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DomainError::MalformedToken(format!("claim `{claim}` out of range")))
}

impl TryFrom<String> for Token {
    type Error = DomainError;

    fn try_from(raw: String) -> DomainResult<Self> {
        Self::parse(&raw)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.raw
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("raw", &self.preview())
            .field("claims", &self.claims)
            .finish()
    }
}
