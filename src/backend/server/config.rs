/**
 * Server Configuration
 *
 * This module loads and validates server configuration from environment
 * variables. `main` loads a `.env` file first (via `dotenv`), so local
 * development can keep its settings there.
 *
 * # Variables
 *
 * - `APP_ENV` - `production`, `development` (default) or `test`
 * - `PORT` - listen port, default `3001`
 * - `DATABASE_URL` - PostgreSQL URL; takes precedence over the `DB_*` values
 * - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASS`, `DB_NAME` - discrete settings
 * - `DB_MAX_CONNECTIONS` (10), `DB_IDLE_TIMEOUT_SECS` (30) - pool bounds
 * - `FRONTEND_URL` - additional CORS origin
 * - `PROTECT_ROUTES` - `keycloak` to require bearer tokens, `none` (default)
 * - `KC_REALM_PUBLIC_KEY` - realm RSA public key body for RS256 verification
 * - `ADMIN_ROLE` (`admin`), `TEACHER_ROLE` (`teacher`)
 * - `LLM_API_KEY`, `LLM_API_URL`, `LLM_MODEL` - LLM proxy upstream
 *
 * # Error Handling
 *
 * Malformed values are reported as `ConfigError` and abort startup. A missing
 * database configuration is not an error: the server then runs on the
 * in-memory store.
 */

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Default pool size
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default idle connection reclamation
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 30;

/// Default chat completions endpoint
pub const DEFAULT_LLM_API_URL: &str = "https://chat-ai.academiccloud.de/v1/chat/completions";

/// Default model when a chat request names none
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-instruct";

/// Placeholder shipped in sample `.env` files; treated as "no key"
const PUBLIC_KEY_PLACEHOLDER: &str = "put_public_key_here";

/// Development origins always allowed by CORS
pub const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
    "http://localhost:5177",
];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::invalid(
                "APP_ENV",
                format!("expected production, development or test, got '{}'", other),
            )),
        }
    }
}

/// PostgreSQL pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connect_options: PgConnectOptions,
    pub max_connections: u32,
    pub idle_timeout: Duration,
}

/// Access gate settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Reject requests without a valid bearer token
    pub protection_enabled: bool,
    /// Base64 body of the realm RSA public key
    pub realm_public_key: Option<String>,
    pub admin_role: String,
    pub teacher_role: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            protection_enabled: false,
            realm_public_key: None,
            admin_role: "admin".to_string(),
            teacher_role: "teacher".to_string(),
        }
    }
}

/// LLM proxy upstream settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub default_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_LLM_API_URL.to_string(),
            api_key: None,
            default_model: DEFAULT_LLM_MODEL.to_string(),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: Environment,
    pub port: u16,
    pub frontend_url: Option<String>,
    /// `None` runs the server on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub llm: LlmConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            port: DEFAULT_PORT,
            frontend_url: None,
            database: None,
            auth: AuthConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string())),
        None => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(raw) => raw.trim().parse()?,
            None => Environment::Development,
        };
        let port = parse("PORT", get("PORT"), DEFAULT_PORT)?;

        let protection_enabled = match get("PROTECT_ROUTES").as_deref().map(str::trim) {
            None | Some("none") => false,
            Some("keycloak") => true,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "PROTECT_ROUTES",
                    format!("expected keycloak or none, got '{}'", other),
                ))
            }
        };

        let auth = AuthConfig {
            protection_enabled,
            realm_public_key: get("KC_REALM_PUBLIC_KEY")
                .filter(|key| key.trim() != PUBLIC_KEY_PLACEHOLDER),
            admin_role: get("ADMIN_ROLE").unwrap_or_else(|| "admin".to_string()),
            teacher_role: get("TEACHER_ROLE").unwrap_or_else(|| "teacher".to_string()),
        };

        let llm = LlmConfig {
            api_url: get("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            api_key: get("LLM_API_KEY"),
            default_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        };

        Ok(Self {
            environment,
            port,
            frontend_url: get("FRONTEND_URL"),
            database: Self::database_from_lookup(&get)?,
            auth,
            llm,
        })
    }

    fn database_from_lookup<F>(get: &F) -> Result<Option<DatabaseConfig>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connect_options = if let Some(url) = get("DATABASE_URL") {
            PgConnectOptions::from_str(url.trim())
                .map_err(|e| ConfigError::invalid("DATABASE_URL", e.to_string()))?
        } else if let Some(host) = get("DB_HOST") {
            let mut options = PgConnectOptions::new()
                .host(host.trim())
                .port(parse("DB_PORT", get("DB_PORT"), 5432u16)?);
            if let Some(user) = get("DB_USER") {
                options = options.username(&user);
            }
            if let Some(password) = get("DB_PASS") {
                options = options.password(&password);
            }
            if let Some(name) = get("DB_NAME") {
                options = options.database(&name);
            }
            options
        } else {
            return Ok(None);
        };

        let max_connections = parse(
            "DB_MAX_CONNECTIONS",
            get("DB_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::invalid(
                "DB_MAX_CONNECTIONS",
                "must be at least 1",
            ));
        }
        let idle_timeout_secs = parse(
            "DB_IDLE_TIMEOUT_SECS",
            get("DB_IDLE_TIMEOUT_SECS"),
            DEFAULT_IDLE_TIMEOUT_SECS,
        )?;

        Ok(Some(DatabaseConfig {
            connect_options,
            max_connections,
            idle_timeout: Duration::from_secs(idle_timeout_secs),
        }))
    }

    /// Origins allowed by CORS: the development defaults plus `FRONTEND_URL`
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect();
        if let Some(frontend) = &self.frontend_url {
            let frontend = frontend.trim_end_matches('/').to_string();
            if !origins.contains(&frontend) {
                origins.push(frontend);
            }
        }
        origins
    }
}
