//! Application state and configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenKeys;
use crate::cache::{ResponseCache, new_cache};
use crate::store::Store;

/// Default token lifetime in hours.
const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3003").
    pub bind_addr: String,

    /// Path to the SQLite database file.
    pub db_path: PathBuf,

    /// Secret used to sign and verify access tokens.
    pub secret: String,

    /// How long an issued token stays valid.
    pub token_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `SECRET`: Token signing secret
    ///
    /// Optional environment variables:
    /// - `BLOGLIST_BIND_ADDR`: Server bind address (default: "0.0.0.0:3003")
    /// - `BLOGLIST_DB_PATH`: SQLite database file (default: "bloglist.db")
    /// - `BLOGLIST_TOKEN_TTL_HOURS`: Token lifetime in hours (default: 24)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("BLOGLIST_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3003".to_string());

        let db_path = std::env::var("BLOGLIST_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("bloglist.db"));

        let secret = std::env::var("SECRET")
            .map_err(|_| anyhow::anyhow!("SECRET environment variable is required"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("SECRET must not be empty");
        }

        let ttl_hours = match std::env::var("BLOGLIST_TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("BLOGLIST_TOKEN_TTL_HOURS must be a positive integer, got '{raw}'")
                })?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        tracing::info!(
            bind_addr = %bind_addr,
            db_path = %db_path.display(),
            token_ttl_hours = ttl_hours,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            db_path,
            secret,
            token_ttl: Duration::from_secs(ttl_hours * 3600),
        })
    }
}

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Blog and user records.
    pub store: Store,

    /// Token signing and verification keys.
    pub tokens: TokenKeys,

    /// Cached aggregate responses.
    pub cache: ResponseCache,

    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the configured database and build the state around it.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.db_path)?;
        tracing::info!(path = %config.db_path.display(), "database opened");
        Ok(Self::with_store(config, store))
    }

    /// Build the state around an already opened store.
    pub fn with_store(config: Config, store: Store) -> Self {
        Self {
            store,
            tokens: TokenKeys::new(&config.secret, config.token_ttl),
            cache: new_cache(),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "BLOGLIST_BIND_ADDR",
        "BLOGLIST_DB_PATH",
        "BLOGLIST_TOKEN_TTL_HOURS",
        "SECRET",
    ];

    /// Helper to run config tests with isolated env vars.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_requires_secret() {
        with_env_vars(&[], || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("SECRET"));
        });
    }

    #[test]
    fn config_rejects_blank_secret() {
        with_env_vars(&[("SECRET", "  ")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[("SECRET", "s3cr3t")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:3003");
            assert_eq!(config.db_path, PathBuf::from("bloglist.db"));
            assert_eq!(config.secret, "s3cr3t");
            assert_eq!(config.token_ttl, Duration::from_secs(24 * 3600));
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("SECRET", "x"),
                ("BLOGLIST_BIND_ADDR", "127.0.0.1:9000"),
                ("BLOGLIST_DB_PATH", "/tmp/blogs.db"),
                ("BLOGLIST_TOKEN_TTL_HOURS", "2"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9000");
                assert_eq!(config.db_path, PathBuf::from("/tmp/blogs.db"));
                assert_eq!(config.token_ttl, Duration::from_secs(7200));
            },
        );
    }

    #[test]
    fn config_rejects_bad_ttl() {
        for bad in ["0", "-1", "soon"] {
            with_env_vars(&[("SECRET", "x"), ("BLOGLIST_TOKEN_TTL_HOURS", bad)], || {
                assert!(Config::from_env().is_err());
            });
        }
    }
}
