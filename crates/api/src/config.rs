//! Application configuration loaded from environment variables.

use directory::ServiceCredential;

/// Server and remote-service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` / `PORT` — bind address (default: `0.0.0.0:3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `CUSTOMERS_URL` / `PRODUCTS_URL` — remote service base URLs
/// - `AUTH_URL`, `AUTH_REALM`, `AUTH_CLIENT_ID`, `AUTH_CLIENT_SECRET`,
///   `AUTH_USERNAME`, `AUTH_PASSWORD` — token endpoint access
/// - `REMOTE_TIMEOUT_MS` — outbound call timeout (default: 5000)
/// - `DATABASE_URL` — when set, orders and deliveries persist to Postgres
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub customers_url: String,
    pub products_url: String,
    pub auth_url: String,
    pub auth_realm: String,
    pub auth_client_id: String,
    pub auth_client_secret: String,
    pub auth_username: String,
    pub auth_password: String,
    pub remote_timeout_ms: u64,
    pub database_url: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: env_or("RUST_LOG", "info"),
            customers_url: env_or("CUSTOMERS_URL", "http://localhost:8081"),
            products_url: env_or("PRODUCTS_URL", "http://localhost:8082"),
            auth_url: env_or("AUTH_URL", "http://localhost:8080"),
            auth_realm: env_or("AUTH_REALM", "master"),
            auth_client_id: env_or("AUTH_CLIENT_ID", "fulfillment"),
            auth_client_secret: env_or("AUTH_CLIENT_SECRET", ""),
            auth_username: env_or("AUTH_USERNAME", ""),
            auth_password: env_or("AUTH_PASSWORD", ""),
            remote_timeout_ms: std::env::var("REMOTE_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(5000),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the Keycloak-style token endpoint for the configured realm.
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.auth_url.trim_end_matches('/'),
            self.auth_realm
        )
    }

    /// Builds the immutable credential handed to the token cache at startup.
    pub fn credential(&self) -> ServiceCredential {
        ServiceCredential {
            realm: self.auth_realm.clone(),
            client_id: self.auth_client_id.clone(),
            client_secret: self.auth_client_secret.clone(),
            username: self.auth_username.clone(),
            password: self.auth_password.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            customers_url: "http://localhost:8081".to_string(),
            products_url: "http://localhost:8082".to_string(),
            auth_url: "http://localhost:8080".to_string(),
            auth_realm: "master".to_string(),
            auth_client_id: "fulfillment".to_string(),
            auth_client_secret: String::new(),
            auth_username: String::new(),
            auth_password: String::new(),
            remote_timeout_ms: 5000,
            database_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.remote_timeout_ms, 5000);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_token_url_formatting() {
        let config = Config {
            auth_url: "http://keycloak:8080/".to_string(),
            auth_realm: "shop".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.token_url(),
            "http://keycloak:8080/realms/shop/protocol/openid-connect/token"
        );
    }

    #[test]
    fn test_credential_copies_auth_settings() {
        let config = Config {
            auth_client_id: "svc".to_string(),
            auth_username: "user".to_string(),
            ..Config::default()
        };
        let credential = config.credential();
        assert_eq!(credential.client_id, "svc");
        assert_eq!(credential.username, "user");
        assert_eq!(credential.realm, "master");
    }
}
