use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::services::auth::jwks::KeySource;

/// Why a bearer token was rejected.
///
/// Every variant ends the request with 401; `code()` is the machine-readable
/// reason sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("authentication credentials were not provided")]
    MissingCredentials,
    #[error("authorization header must be 'Bearer <token>'")]
    MalformedHeader,
    #[error("no signing key is available for this token")]
    KeyUnavailable,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token issuer is invalid")]
    InvalidIssuer,
    #[error("token audience is invalid")]
    InvalidAudience,
    #[error("token has expired")]
    Expired,
    #[error("token has no subject")]
    MissingSubject,
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::MalformedHeader => "malformed_header",
            Self::KeyUnavailable => "key_unavailable",
            Self::InvalidSignature => "invalid_signature",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidAudience => "invalid_audience",
            Self::Expired => "expired",
            Self::MissingSubject => "missing_subject",
        }
    }
}

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Audience::One(aud) => vec![aud],
            Audience::Many(auds) => auds,
        }
    }
}

/// Raw payload. Everything optional and leniently typed: presence and shape are
/// enforced by `Validation` and by the subject check, so that a missing or
/// wrong-typed claim maps to its own failure instead of a decode error.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default, deserialize_with = "lenient")]
    sub: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    iss: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    aud: Option<Audience>,
    #[serde(default, deserialize_with = "numeric_date")]
    exp: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    email: Option<String>,
}

/// A value of the wrong JSON type reads as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// NumericDate: integer seconds, or a non-negative fractional value rounded to
/// the nearest second (the same reading `Validation` applies to `exp`).
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0 && *secs < u64::MAX as f64)
            .map(|secs| secs.round() as u64)
    }))
}

/// Decoded and validated token payload, scoped to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub issuer: String,
    pub audience: Vec<String>,
    pub expiry: u64,
    pub nickname: Option<String>,
    pub email: Option<String>,
}

/// RS256 bearer-token verifier backed by the provider's JWKS.
pub struct TokenVerifier {
    keys: Arc<KeySource>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys)
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeySource>, issuer: &str, audience: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = leeway_seconds;

        Self { keys, validation }
    }

    /// Verify the raw `Authorization` header value.
    ///
    /// `jsonwebtoken::decode` checks the signature and algorithm first, then
    /// `iss`, `aud` and `exp`. The subject is checked last.
    pub async fn verify(&self, raw_header: Option<&str>) -> Result<VerifiedClaims, AuthFailure> {
        let raw_header = raw_header.ok_or(AuthFailure::MissingCredentials)?;
        let token = bearer_token(raw_header)?;

        let header = decode_header(token).map_err(|_| AuthFailure::InvalidSignature)?;
        let kid = header.kid.as_deref().ok_or(AuthFailure::KeyUnavailable)?;

        let keys = self.keys.get_signing_keys().await.map_err(|err| {
            tracing::warn!(error = %err, "signing keys unavailable");
            AuthFailure::KeyUnavailable
        })?;
        let key = keys.get(kid).ok_or(AuthFailure::KeyUnavailable)?;

        let data = decode::<TokenClaims>(token, key, &self.validation)
            .map_err(|err| classify(err.kind()))?;
        let claims = data.claims;

        let subject = claims
            .sub
            .filter(|sub| !sub.trim().is_empty())
            .ok_or(AuthFailure::MissingSubject)?;

        Ok(VerifiedClaims {
            subject,
            issuer: claims.iss.unwrap_or_default(),
            audience: claims.aud.map(Audience::into_vec).unwrap_or_default(),
            expiry: claims.exp.unwrap_or_default(),
            nickname: claims.nickname,
            email: claims.email,
        })
    }
}

/// Split `Bearer <token>`; the scheme is case-insensitive, anything other than
/// exactly two whitespace-separated parts is rejected.
fn bearer_token(raw_header: &str) -> Result<&str, AuthFailure> {
    let mut parts = raw_header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthFailure::MalformedHeader),
    }
}

fn classify(kind: &ErrorKind) -> AuthFailure {
    match kind {
        ErrorKind::InvalidIssuer => AuthFailure::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthFailure::InvalidAudience,
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
            "iss" => AuthFailure::InvalidIssuer,
            "aud" => AuthFailure::InvalidAudience,
            "exp" => AuthFailure::Expired,
            "sub" => AuthFailure::MissingSubject,
            _ => AuthFailure::InvalidSignature,
        },
        // bad signature, wrong algorithm, undecodable segments
        _ => AuthFailure::InvalidSignature,
    }
}
