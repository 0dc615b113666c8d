//! Runtime configuration read from the environment.
//!
//! `.env` is loaded by `main` before [`Config::from_env`] runs, so values in
//! that file behave like real environment variables.

use anyhow::{Context, Result};

pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection URL, either given directly or built from `DB_*`.
    pub database_url: String,
    pub max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    /// Allowed CORS origins; `*` allows any.
    pub cors_allowed_origins: Vec<String>,
    /// Insert the sample employees into an empty table on start-up.
    pub seed_sample_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => {
                let port: u16 = or("DB_PORT", "5432").parse().context("DB_PORT must be a port number")?;
                compose_database_url(
                    &or("DB_HOST", "localhost"),
                    port,
                    &or("DB_NAME", "ems"),
                    &or("DB_USERNAME", "postgres"),
                    // An empty password is valid; only trim whitespace.
                    lookup("DB_PASSWORD").as_deref().unwrap_or("").trim(),
                )
            }
        };

        let max_connections = or("DB_MAX_CONNECTIONS", "10")
            .parse()
            .context("DB_MAX_CONNECTIONS must be a positive integer")?;
        let server_port = or("SERVER_PORT", "8080").parse().context("SERVER_PORT must be a port number")?;
        let seed_sample_data = parse_bool(&or("SEED_SAMPLE_DATA", "true"))
            .context("SEED_SAMPLE_DATA must be true or false")?;

        Ok(Self {
            database_url,
            max_connections,
            server_host: or("SERVER_HOST", "0.0.0.0"),
            server_port,
            cors_allowed_origins: split_origins(&or("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ORIGINS)),
            seed_sample_data,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// The database URL with any password masked, for logging.
    pub fn redacted_database_url(&self) -> String {
        let Some((scheme, rest)) = self.database_url.split_once("://") else {
            return self.database_url.clone();
        };
        match rest.split_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{scheme}://{user}:***@{host}")
            }
            None => self.database_url.clone(),
        }
    }
}

fn compose_database_url(host: &str, port: u16, name: &str, user: &str, password: &str) -> String {
    let user = urlencoding::encode(user);
    let credentials = if password.is_empty() {
        user.into_owned()
    } else {
        format!("{user}:{}", urlencoding::encode(password))
    };
    format!("postgres://{credentials}@{host}:{port}/{name}")
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
