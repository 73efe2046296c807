//! Server Configuration
//!
//! Read once from the environment (after `.env` is loaded).

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use identity::IdentityConfig;
use platform::crypto;
use platform::password::HashCost;

/// Minimum signing secret length in bytes
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
    /// `None` runs against the in-memory store
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub identity: IdentityConfig,
    pub frontend_origins: Vec<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Initial admin account, created at startup if its email is free
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("APP_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .context("APP_HOST must be an IP address")?;
        let port = parse_or(var("APP_PORT"), 8080, "APP_PORT")?;
        let db_max_connections = parse_or(var("DB_MAX_CONNECTIONS"), 5, "DB_MAX_CONNECTIONS")?;

        let token_secret = match var("JWT_SECRET") {
            Some(raw) => decode_secret(&raw)?,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using a random secret; tokens will not survive a restart");
                IdentityConfig::development().token_secret
            }
            None => bail!("JWT_SECRET must be set in production"),
        };

        let ttl_secs: u64 = parse_or(var("JWT_ACCESS_TTL_SECS"), 900, "JWT_ACCESS_TTL_SECS")?;
        if ttl_secs == 0 {
            bail!("JWT_ACCESS_TTL_SECS must be positive");
        }

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            iterations: parse_or(var("PASSWORD_HASH_COST"), defaults.iterations, "PASSWORD_HASH_COST")?,
            memory_kib: parse_or(
                var("PASSWORD_HASH_MEMORY_KIB"),
                defaults.memory_kib,
                "PASSWORD_HASH_MEMORY_KIB",
            )?,
            parallelism: defaults.parallelism,
        };

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_EMAIL"), var("BOOTSTRAP_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin { email, password }),
            (None, None) => None,
            _ => bail!("BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            host,
            port,
            database_url: var("DATABASE_URL"),
            db_max_connections,
            identity: IdentityConfig::new(token_secret)
                .with_token_ttl(Duration::from_secs(ttl_secs))
                .with_hash_cost(hash_cost),
            frontend_origins,
            bootstrap_admin,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T, key: &str) -> anyhow::Result<T> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} has an invalid value: {v}")),
        None => Ok(default),
    }
}

/// Base64 (standard) if it decodes to a long enough key, raw bytes otherwise
fn decode_secret(raw: &str) -> anyhow::Result<Vec<u8>> {
    let raw = raw.trim();
    let secret = match crypto::from_base64(raw) {
        Ok(decoded) if decoded.len() >= MIN_SECRET_LEN => decoded,
        _ => raw.as_bytes().to_vec(),
    };

    if secret.len() < MIN_SECRET_LEN {
        bail!("JWT_SECRET must be at least {MIN_SECRET_LEN} bytes");
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ApiConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults() {
        let config = config(&[("JWT_SECRET", SECRET)]).unwrap();
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 5);
        assert!(config.database_url.is_none());
        assert_eq!(config.identity.token_ttl, Duration::from_secs(900));
        assert_eq!(config.identity.token_secret, SECRET.as_bytes());
        assert_eq!(config.identity.hash_cost, HashCost::default());
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_base64_secret() {
        let encoded = crypto::to_base64(&[7u8; 32]);
        let config = config(&[("JWT_SECRET", &encoded)]).unwrap();
        assert_eq!(config.identity.token_secret, vec![7u8; 32]);
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(config(&[("JWT_SECRET", "too-short")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("JWT_SECRET", SECRET),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9000"),
            ("JWT_ACCESS_TTL_SECS", "60"),
            ("PASSWORD_HASH_COST", "3"),
            ("FRONTEND_ORIGINS", "https://a.example, https://b.example,"),
            ("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
            ("BOOTSTRAP_ADMIN_PASSWORD", "Bootstrap-Pass-1"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.identity.token_ttl, Duration::from_secs(60));
        assert_eq!(config.identity.hash_cost.iterations, 3);
        assert_eq!(
            config.frontend_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.bootstrap_admin.unwrap().email, "root@example.com");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config(&[("JWT_SECRET", SECRET), ("APP_PORT", "http")]).is_err());
        assert!(config(&[("JWT_SECRET", SECRET), ("JWT_ACCESS_TTL_SECS", "0")]).is_err());
        assert!(config(&[("JWT_SECRET", SECRET), ("BOOTSTRAP_ADMIN_EMAIL", "a@b.co")]).is_err());
    }
}
