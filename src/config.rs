use axum::http::{HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3001;

/// Origins allowed while developing the browser client locally
pub const DEV_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),
}

/// Deployment profile, selected by `ENVIRONMENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("development") | Some("dev") => Environment::Development,
            _ => Environment::Production,
        }
    }
}

/// Which browser origins may open a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

/// Server settings read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: Environment,
    pub allowed_origins: AllowedOrigins,
}

impl ServerConfig {
    /// Read configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port number
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup
    ///
    /// # Variables
    ///
    /// - `PORT`: listening port (default 3001)
    /// - `ENVIRONMENT`: `development`/`dev` or anything else for production
    /// - `CORS_ORIGIN`: production origins, comma separated, `*` for any
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => DEFAULT_PORT,
        };

        let environment = Environment::from_value(lookup("ENVIRONMENT").as_deref());

        let allowed_origins = match environment {
            Environment::Development => {
                AllowedOrigins::List(DEV_ORIGINS.iter().map(|o| o.to_string()).collect())
            }
            Environment::Production => parse_origins(lookup("CORS_ORIGIN").as_deref()),
        };

        Ok(Self {
            port,
            environment,
            allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// CORS layer for the configured origins
    ///
    /// # Errors
    ///
    /// Returns an error if an origin is not a valid header value
    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let allow_origin = match &self.allowed_origins {
            AllowedOrigins::Any => AllowOrigin::any(),
            AllowedOrigins::List(origins) => {
                let values = origins
                    .iter()
                    .map(|origin| {
                        origin
                            .parse::<HeaderValue>()
                            .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                AllowOrigin::list(values)
            }
        };

        Ok(CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS]))
    }
}

fn parse_origins(raw: Option<&str>) -> AllowedOrigins {
    let origins: Vec<String> = raw
        .unwrap_or("*")
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}
