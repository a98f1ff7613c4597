/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth0 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::services::auth::ProfileSyncPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Where account / game records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
        run_migrations: bool,
    },
    // Process-local, lost on restart. Local development only.
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
    pub storage: StorageBackend,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: Url,
    pub jwks_fetch_timeout: Duration,
    pub access_token_leeway_seconds: u64,
    pub profile_sync: ProfileSyncPolicy,
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

        let storage = storage_from_env()?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let sqids_min_length = std::env::var("SQIDS_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);

        let sqids_alphabet = std::env::var("SQIDS_ALPHABET").unwrap_or_else(|_| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        // Auth0 style: issuer and JWKS location both derive from the tenant domain,
        // either can be overridden for other providers.
        let auth_domain = std::env::var("AUTH0_DOMAIN")
            .ok()
            .map(|d| d.trim().trim_end_matches('/').to_string())
            .filter(|d| !d.is_empty());

        let auth_issuer = match std::env::var("AUTH_ISSUER") {
            Ok(v) => v,
            Err(_) => issuer_for_domain(
                auth_domain
                    .as_deref()
                    .ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?,
            ),
        };

        let auth_jwks_url = match std::env::var("AUTH_JWKS_URL") {
            Ok(v) => Url::parse(&v).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?,
            Err(_) => jwks_url_for_domain(
                auth_domain
                    .as_deref()
                    .ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?,
            )
            .ok_or(ConfigError::Invalid("AUTH0_DOMAIN"))?,
        };

        let auth_audience =
            std::env::var("AUTH_AUDIENCE").map_err(|_| ConfigError::Missing("AUTH_AUDIENCE"))?;

        let jwks_fetch_timeout_seconds = match std::env::var("JWKS_FETCH_TIMEOUT_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("JWKS_FETCH_TIMEOUT_SECONDS"))?,
            Err(_) => 5,
        };

        let access_token_leeway_seconds = std::env::var("ACCESS_TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let profile_sync = if env_flag("PROFILE_SYNC_ON_LOGIN", false)? {
            ProfileSyncPolicy::OnLogin
        } else {
            ProfileSyncPolicy::Never
        };

        Ok(Self {
            addr,
            storage,
            app_env,
            cors_allowed_origins,
            sqids_min_length,
            sqids_alphabet,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            jwks_fetch_timeout: Duration::from_secs(jwks_fetch_timeout_seconds),
            access_token_leeway_seconds,
            profile_sync,
        })
    }
}

fn storage_from_env() -> Result<StorageBackend, ConfigError> {
    let backend = std::env::var("STORAGE_BACKEND")
        .unwrap_or_else(|_| "postgres".to_string())
        .to_ascii_lowercase();

    match backend.as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "postgres" | "postgresql" => {
            let database_url =
                std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

            let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(10);

            Ok(StorageBackend::Postgres {
                database_url,
                max_connections,
                run_migrations: env_flag("RUN_MIGRATIONS", true)?,
            })
        }
        _ => Err(ConfigError::Invalid("STORAGE_BACKEND")),
    }
}

fn env_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(v) => parse_flag(&v).ok_or(ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn issuer_for_domain(domain: &str) -> String {
    format!("https://{}/", domain)
}

pub fn jwks_url_for_domain(domain: &str) -> Option<Url> {
    Url::parse(&format!("https://{}/.well-known/jwks.json", domain)).ok()
}
