/*
 * Responsibility
 * - Load environment / .env settings (DATABASE_URL, CORS allowlist, admin secret, rate limit, proxy hops ...)
 * - Validate them up front (missing or malformed values fail startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Which `PostStore` adapter backs the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub store: StoreBackend,

    pub cors_allowed_origins: Vec<String>,

    pub admin_password: Option<String>,

    pub valkey_url: Option<String>,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window: Duration,
    /// Reverse proxies in front of the service; 0 keys quotas on the TCP peer.
    pub trusted_proxy_hops: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let store = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" | "pg" => {
                let database_url = std::env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
                let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(5);
                StoreBackend::Postgres {
                    database_url,
                    max_connections,
                }
            }
            "memory" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let admin_password = non_empty(std::env::var("ADMIN_PASSWORD").ok());
        let valkey_url = non_empty(std::env::var("VALKEY_URL").ok());

        let rate_limit_max_requests = match std::env::var("RATE_LIMIT_MAX_REQUESTS") {
            Ok(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("RATE_LIMIT_MAX_REQUESTS"))?,
            Err(_) => 10,
        };

        let rate_limit_window = match std::env::var("RATE_LIMIT_WINDOW_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid("RATE_LIMIT_WINDOW_SECS"))?,
            Err(_) => Duration::from_secs(60),
        };

        let trusted_proxy_hops = match std::env::var("TRUSTED_PROXY_HOPS") {
            Ok(v) => parse_hops(&v).ok_or(ConfigError::Invalid("TRUSTED_PROXY_HOPS"))?,
            Err(_) => 0,
        };

        Ok(Self {
            addr,
            app_env,
            store,
            cors_allowed_origins,
            admin_password,
            valkey_url,
            rate_limit_max_requests,
            rate_limit_window,
            trusted_proxy_hops,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_hops(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
