/// Configuration management for tts-service
///
/// Loads configuration from environment variables with sensible defaults.
/// Built once at startup and shared read-only afterwards.
use std::path::PathBuf;

/// Used when `JWT_SECRET` is unset outside production
pub const FALLBACK_JWT_SECRET: &str = "please_change_me";

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingJwtSecret,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    /// `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub media: MediaConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// True when the insecure fallback secret is in use
    pub secret_is_fallback: bool,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("secret_is_fallback", &self.secret_is_fallback)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./media"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let app = AppConfig {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or("PORT", var("PORT"), 8080)?,
            env: var("APP_ENV").unwrap_or_else(|| "development".to_string()),
        };

        let allowed_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database = match var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    var("DATABASE_MAX_CONNECTIONS"),
                    10,
                )?,
            }),
            None => None,
        };

        let (jwt_secret, secret_is_fallback) = match var("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if app.is_production() => return Err(ConfigError::MissingJwtSecret),
            None => (FALLBACK_JWT_SECRET.to_string(), true),
        };

        let token_ttl_hours: i64 = parse_or(
            "JWT_TTL_HOURS",
            var("JWT_TTL_HOURS"),
            crypto_core::jwt::DEFAULT_TOKEN_TTL_HOURS,
        )?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "JWT_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            });
        }

        let media = MediaConfig {
            dir: var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| MediaConfig::default().dir),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                var("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        };

        Ok(Config {
            app,
            cors: CorsConfig { allowed_origins },
            database,
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
                secret_is_fallback,
            },
            media,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
