use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Pause between imported statements in milliseconds (default: `50`).
    pub import_statement_delay_ms: u64,
    /// SQL fixture run by `POST /api/insert-sample-data`.
    pub sample_data_path: PathBuf,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `IMPORT_STATEMENT_DELAY_MS` | `50`                    |
    /// | `SAMPLE_DATA_PATH`          | `test_insert.sql`       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let import_statement_delay_ms: u64 = std::env::var("IMPORT_STATEMENT_DELAY_MS")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("IMPORT_STATEMENT_DELAY_MS must be a valid u64");

        let sample_data_path = std::env::var("SAMPLE_DATA_PATH")
            .unwrap_or_else(|_| "test_insert.sql".into())
            .into();

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            import_statement_delay_ms,
            sample_data_path,
            jwt,
        }
    }

    pub fn import_statement_delay(&self) -> Duration {
        Duration::from_millis(self.import_statement_delay_ms)
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool size (default: `1`, so session-scoped `SET` statements persist
    /// between requests).
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins; otherwise the URL is composed from the
    /// individual settings.
    ///
    /// | Env Var              | Default     |
    /// |----------------------|-------------|
    /// | `DB_HOST`            | `localhost` |
    /// | `DB_USER`            | `root`      |
    /// | `DB_PASSWORD`        | (empty)     |
    /// | `DB_NAME`            | `Final`     |
    /// | `DB_PORT`            | `3306`      |
    /// | `DB_MAX_CONNECTIONS` | `1`         |
    pub fn from_env() -> Self {
        let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            let var = |key: &str, default: &str| {
                std::env::var(key).unwrap_or_else(|_| default.to_string())
            };
            let port: u16 = var("DB_PORT", "3306")
                .parse()
                .expect("DB_PORT must be a valid u16");
            compose_database_url(
                &var("DB_HOST", "localhost"),
                &var("DB_USER", "root"),
                &var("DB_PASSWORD", ""),
                &var("DB_NAME", "Final"),
                port,
            )
            .unwrap_or_else(|e| panic!("{e}"))
        });

        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        Self {
            url,
            max_connections,
        }
    }
}

/// Build a `mysql://` URL. Credentials are percent-encoded by [`Url`].
pub fn compose_database_url(
    host: &str,
    user: &str,
    password: &str,
    name: &str,
    port: u16,
) -> Result<String, String> {
    let mut url = Url::parse(&format!("mysql://{host}:{port}"))
        .map_err(|e| format!("Invalid DB_HOST '{host}': {e}"))?;
    url.set_path(&format!("/{name}"));
    url.set_username(user)
        .map_err(|()| format!("Cannot set database user on '{url}'"))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|()| format!("Cannot set database password on '{url}'"))?;
    }
    Ok(url.into())
}
