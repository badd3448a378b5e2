//! Server configuration
//!
//! Read once at startup from the environment and handed to the router
//! through `AppState`.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_PATH: &str = "notetree.db";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got '{other}'"),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Origins allowed when `CORS_ORIGIN` is unset
    pub fn default_cors_origins(&self) -> Vec<String> {
        match self {
            Self::Development => (5173..=5179)
                .map(|port| format!("http://localhost:{port}"))
                .collect(),
            Self::Production => vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub environment: Environment,
    /// Allowed browser origins; a lone `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let environment = Environment::default();
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            environment,
            cors_origins: environment.default_cors_origins(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV") {
            Some(v) => Environment::parse(&v)?,
            None => Environment::default(),
        };

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port, got '{v}'"))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = match get("CORS_ORIGIN") {
            Some(v) => parse_cors_origins(&v),
            None => environment.default_cors_origins(),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            environment,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_cors_origins(s: &str) -> Vec<String> {
    let entries: Vec<String> = s
        .split(',')
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();
    if entries.iter().any(|e| e == "*") {
        return vec!["*".into()];
    }
    entries
}
