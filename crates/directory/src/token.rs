//! Bearer token acquisition and caching for service-to-service calls.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::{DirectoryError, Result};

/// Keycloak-style access descriptor for the token endpoint.
///
/// Loaded once at process start; immutable thereafter.
#[derive(Debug, Clone)]
pub struct ServiceCredential {
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// A token together with its absolute expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    header: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Token endpoint response body (resource-owner-password grant).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenResponse {
    fn into_cached(self, now: DateTime<Utc>) -> CachedToken {
        CachedToken {
            header: format!("{} {}", self.token_type, self.access_token),
            expires_at: now + Duration::seconds(self.expires_in),
        }
    }
}

/// Process-wide cache of the outbound bearer token.
///
/// A fresh cached token is returned without any I/O. A stale or absent token
/// triggers a synchronous fetch against the token endpoint; the cache is then
/// replaced as a whole. Concurrent callers can race past the freshness check
/// and refresh more than once, but never observe a torn token: the last
/// writer wins.
pub struct TokenCache {
    http: reqwest::Client,
    token_url: String,
    credential: ServiceCredential,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Creates a token cache against the given token endpoint.
    pub fn new(http: reqwest::Client, token_url: impl Into<String>, credential: ServiceCredential) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            credential,
            cached: RwLock::new(None),
        }
    }

    /// Returns the `"<type> <token>"` authorization header value, fetching a
    /// new token if the cached one is absent or expired.
    pub async fn authorization_header(&self) -> Result<String> {
        {
            let cached = self.cached.read().unwrap();
            if let Some(token) = cached.as_ref()
                && token.is_fresh(Utc::now())
            {
                return Ok(token.header.clone());
            }
        }

        let token = self.fetch_token().await?;
        let header = token.header.clone();
        *self.cached.write().unwrap() = Some(token);
        Ok(header)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let form = [
            ("grant_type", "password"),
            ("client_id", self.credential.client_id.as_str()),
            ("client_secret", self.credential.client_secret.as_str()),
            ("username", self.credential.username.as_str()),
            ("password", self.credential.password.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "token endpoint unreachable");
                DirectoryError::ConnectionFailure { service: "auth" }
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "token request rejected");
            return Err(DirectoryError::ConnectionFailure { service: "auth" });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::Unknown(e.to_string()))?;

        Ok(body.into_cached(Utc::now()))
    }

    #[cfg(test)]
    fn seed(&self, header: impl Into<String>, expires_at: DateTime<Utc>) {
        *self.cached.write().unwrap() = Some(CachedToken {
            header: header.into(),
            expires_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> ServiceCredential {
        ServiceCredential {
            realm: "master".to_string(),
            client_id: "fulfillment".to_string(),
            client_secret: "secret".to_string(),
            username: "svc".to_string(),
            password: "svc".to_string(),
        }
    }

    // Nothing listens on this port; any call that reaches the network fails.
    fn unreachable_cache() -> TokenCache {
        TokenCache::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/token",
            credential(),
        )
    }

    #[test]
    fn test_cached_token_freshness() {
        let now = Utc::now();
        let token = CachedToken {
            header: "Bearer abc".to_string(),
            expires_at: now + Duration::seconds(60),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(61)));
    }

    #[test]
    fn test_token_response_to_cached() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc123","token_type":"Bearer","expires_in":300}"#,
        )
        .unwrap();
        let now = Utc::now();
        let cached = response.into_cached(now);

        assert_eq!(cached.header, "Bearer abc123");
        assert_eq!(cached.expires_at, now + Duration::seconds(300));
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":60}"#).unwrap();
        assert_eq!(response.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_fresh_token_returned_without_network() {
        let cache = unreachable_cache();
        cache.seed("Bearer fresh", Utc::now() + Duration::seconds(60));

        let header = cache.authorization_header().await.unwrap();
        assert_eq!(header, "Bearer fresh");
    }

    #[tokio::test]
    async fn test_expired_token_triggers_refresh_failure() {
        let cache = unreachable_cache();
        cache.seed("Bearer stale", Utc::now() - Duration::seconds(1));

        let result = cache.authorization_header().await;
        assert!(matches!(
            result,
            Err(DirectoryError::ConnectionFailure { service: "auth" })
        ));
    }

    #[tokio::test]
    async fn test_empty_cache_triggers_fetch_failure() {
        let cache = unreachable_cache();
        let result = cache.authorization_header().await;
        assert!(matches!(
            result,
            Err(DirectoryError::ConnectionFailure { service: "auth" })
        ));
    }
}
