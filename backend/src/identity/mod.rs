//! Caller identity verification for Cognito user pool tokens
//!
//! The identity provider owns sign-up, sign-in and verification. This module only
//! checks the bearer token it issued and extracts the caller's username:
//! - signature against the user pool's JWKS (RS256), keys cached by `kid`
//! - issuer and expiry
//! - `token_use` of `id` or `access`, and the app client when one is configured
//!
//! The username comes from `cognito:username` in id tokens and `username` in
//! access tokens.

/// Identity verification errors
pub mod error;
mod types;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;

pub use error::IdentityError;
pub use types::{CallerIdentity, IdentityConfig};
use types::CognitoClaims;

/// Minimum time between two JWKS downloads
pub const JWKS_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Signing keys of the last JWKS download
#[derive(Default)]
struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    refreshed_at: Option<Instant>,
}

impl JwksCache {
    fn refreshed_within(&self, interval: Duration) -> bool {
        self.refreshed_at
            .is_some_and(|refreshed_at| refreshed_at.elapsed() < interval)
    }
}

/// Where token signing keys come from
enum KeySource {
    /// A Cognito user pool's published JWKS
    Jwks {
        url: String,
        http_client: reqwest::Client,
        refresh_interval: Duration,
        cache: RwLock<JwksCache>,
    },
    /// One fixed key, used by tests and local tooling
    Static {
        key: DecodingKey,
        algorithm: Algorithm,
    },
}

/// Verifies identity tokens and yields the caller's username
pub struct IdentityVerifier {
    issuer: String,
    client_id: Option<String>,
    keys: KeySource,
}

impl IdentityVerifier {
    /// Creates a verifier for a Cognito user pool
    #[must_use]
    pub fn cognito(config: &IdentityConfig) -> Self {
        tracing::info!(
            "Identity verifier initialized for user pool {}",
            config.user_pool_id
        );

        Self::with_jwks_url(
            config.issuer(),
            config.client_id.clone(),
            config.jwks_url(),
            JWKS_REFRESH_INTERVAL,
        )
    }

    /// Creates a verifier that loads RS256 keys from a JWKS endpoint
    ///
    /// An unknown `kid` triggers a download at most once per `refresh_interval`.
    #[must_use]
    pub fn with_jwks_url(
        issuer: impl Into<String>,
        client_id: Option<String>,
        url: impl Into<String>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            client_id,
            keys: KeySource::Jwks {
                url: url.into(),
                http_client: reqwest::Client::new(),
                refresh_interval,
                cache: RwLock::new(JwksCache::default()),
            },
        }
    }

    /// Creates a verifier that checks signatures against a single known key
    #[must_use]
    pub fn with_static_key(
        issuer: impl Into<String>,
        client_id: Option<String>,
        key: DecodingKey,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            client_id,
            keys: KeySource::Static { key, algorithm },
        }
    }

    /// Verifies a bearer token and returns the caller identity
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the token is malformed, signed by an unknown key,
    /// expired, issued by another user pool or for another client, or has no username
    pub async fn verify(&self, token: &str) -> Result<CallerIdentity, IdentityError> {
        let header = decode_header(token).map_err(IdentityError::MalformedToken)?;

        let (key, algorithm) = match &self.keys {
            KeySource::Static { key, algorithm } => (key.clone(), *algorithm),
            KeySource::Jwks {
                url,
                http_client,
                refresh_interval,
                cache,
            } => {
                let kid = header.kid.as_deref().ok_or(IdentityError::MissingKeyId)?;
                let key = Self::jwks_key(url, http_client, *refresh_interval, cache, kid).await?;
                (key, Algorithm::RS256)
            }
        };

        if header.alg != algorithm {
            return Err(IdentityError::UnexpectedAlgorithm);
        }

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.issuer]);
        // Access tokens carry no `aud`; the client is checked per token use
        validation.validate_aud = false;

        let claims = decode::<CognitoClaims>(token, &key, &validation)
            .map_err(IdentityError::InvalidToken)?
            .claims;

        claims.into_identity(self.client_id.as_deref())
    }

    /// Looks up a signing key, downloading the JWKS again on a miss
    ///
    /// Downloads are rate limited by `refresh_interval`. The write lock is held for the
    /// whole download, so concurrent misses wait for one shared refresh.
    async fn jwks_key(
        url: &str,
        http_client: &reqwest::Client,
        refresh_interval: Duration,
        cache: &RwLock<JwksCache>,
        kid: &str,
    ) -> Result<DecodingKey, IdentityError> {
        if let Some(key) = cache.read().await.keys.get(kid) {
            return Ok(key.clone());
        }

        let mut cache = cache.write().await;

        // Another request may have refreshed while this one waited for the lock
        if let Some(key) = cache.keys.get(kid) {
            return Ok(key.clone());
        }
        if cache.refreshed_within(refresh_interval) {
            return Err(IdentityError::UnknownKeyId(kid.to_string()));
        }

        tracing::debug!("Signing key {kid} not cached, fetching JWKS from {url}");

        // Failed downloads count against the interval too
        cache.refreshed_at = Some(Instant::now());

        let jwks: JwkSet = http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            if let Some(key_id) = &jwk.common.key_id {
                let key = DecodingKey::from_jwk(jwk).map_err(IdentityError::InvalidJwk)?;
                keys.insert(key_id.clone(), key);
            }
        }
        cache.keys = keys;

        cache
            .keys
            .get(kid)
            .cloned()
            .ok_or_else(|| IdentityError::UnknownKeyId(kid.to_string()))
    }
}
