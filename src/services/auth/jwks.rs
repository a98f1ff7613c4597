//! Identity provider signing keys (JWKS).
//!
//! The key set is fetched on first use and kept for the rest of the process
//! lifetime. Population is single-flight: concurrent cold callers wait for one
//! fetch instead of each hitting the provider. A failed fetch is not cached, so
//! the next verification attempt fetches again.
//!
//! There is no TTL and no refresh on an unknown `kid`: rotated provider keys are
//! only picked up after a restart.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use url::Url;

#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("jwks request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("jwks endpoint returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed jwks document: {0}")]
    Malformed(String),
    #[error("jwks document contains no usable signing key")]
    NoUsableKeys,
}

/// JWKS document as published by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

/// Individual JSON Web Key. Only the members needed to build an RS256
/// verification key; tokens are only ever verified with RS256.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: Option<String>,
    pub alg: Option<String>,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    pub n: Option<String>,
    pub e: Option<String>,
}

impl Jwk {
    fn to_decoding_key(&self) -> Result<DecodingKey, KeySourceError> {
        if self.kty != "RSA" {
            return Err(KeySourceError::Malformed(format!(
                "unsupported key type: {}",
                self.kty
            )));
        }
        if let Some(alg) = self.alg.as_deref()
            && alg != "RS256"
        {
            return Err(KeySourceError::Malformed(format!(
                "unsupported algorithm: {alg}"
            )));
        }

        let n = self
            .n
            .as_deref()
            .ok_or_else(|| KeySourceError::Malformed("RSA key missing 'n'".into()))?;
        let e = self
            .e
            .as_deref()
            .ok_or_else(|| KeySourceError::Malformed("RSA key missing 'e'".into()))?;
        DecodingKey::from_rsa_components(n, e).map_err(|e| KeySourceError::Malformed(e.to_string()))
    }
}

/// Verification keys indexed by key id.
#[derive(Clone)]
pub struct SigningKeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: DateTime<Utc>,
}

impl std::fmt::Debug for SigningKeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        let mut kids: Vec<&str> = self.keys.keys().map(String::as_str).collect();
        kids.sort_unstable();
        f.debug_struct("SigningKeySet")
            .field("kids", &kids)
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}

impl SigningKeySet {
    /// Build the set from a JWKS document.
    ///
    /// Encryption keys, keys without `kid`, and keys that cannot be converted are
    /// skipped. A document with nothing usable left is an error so that an empty
    /// set is never cached.
    pub fn from_jwks(jwks: Jwks) -> Result<Self, KeySourceError> {
        let mut keys = HashMap::new();

        for jwk in jwks.keys {
            if jwk.key_use.as_deref() == Some("enc") {
                continue;
            }

            let Some(kid) = jwk.kid.clone() else {
                tracing::warn!(kty = %jwk.kty, "skipping jwk without kid");
                continue;
            };

            match jwk.to_decoding_key() {
                Ok(key) => {
                    tracing::debug!(kid = %kid, kty = %jwk.kty, alg = ?jwk.alg, "loaded jwk");
                    keys.insert(kid, key);
                }
                Err(err) => {
                    tracing::warn!(kid = %kid, kty = %jwk.kty, error = %err, "skipping unusable jwk");
                }
            }
        }

        if keys.is_empty() {
            return Err(KeySourceError::NoUsableKeys);
        }

        Ok(Self {
            keys,
            fetched_at: Utc::now(),
        })
    }

    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Where the JWKS document comes from.
#[async_trait]
pub trait JwksFetcher: Send + Sync + 'static {
    async fn fetch(&self) -> Result<Jwks, KeySourceError>;
}

/// Fetches the document over HTTPS with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpJwksFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> Result<Jwks, KeySourceError> {
        tracing::debug!(url = %self.url, "fetching jwks");

        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySourceError::Status(status));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Jwks>(&body).map_err(|e| KeySourceError::Malformed(e.to_string()))
    }
}

/// Process-wide cache of the provider's signing keys.
pub struct KeySource {
    fetcher: Arc<dyn JwksFetcher>,
    cached: OnceCell<Arc<SigningKeySet>>,
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySource")
            .field("cached", &self.cached.get())
            .finish()
    }
}

impl KeySource {
    pub fn new(fetcher: Arc<dyn JwksFetcher>) -> Self {
        Self {
            fetcher,
            cached: OnceCell::new(),
        }
    }

    /// Return the cached key set, fetching it first if the cache is cold.
    pub async fn get_signing_keys(&self) -> Result<Arc<SigningKeySet>, KeySourceError> {
        self.cached
            .get_or_try_init(|| async {
                let jwks = self.fetcher.fetch().await?;
                let set = SigningKeySet::from_jwks(jwks)?;
                tracing::info!(
                    key_count = set.len(),
                    fetched_at = %set.fetched_at(),
                    "jwks cache populated"
                );
                Ok::<_, KeySourceError>(Arc::new(set))
            })
            .await
            .cloned()
    }
}
