use serde::Deserialize;

use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};
use crate::infrastructure::team::DEFAULT_TEAM_ID_OFFSET;

const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub teams: TeamsConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Record store selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    pub backend: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TeamsConfig {
    /// First allocated team id is `id_offset + 1`
    pub id_offset: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Seeded at startup when no user with this name exists
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File backing the CLI session
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            id_offset: DEFAULT_TEAM_ID_OFFSET,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: 24,
            admin_username: "admin".to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl AuthConfig {
    /// Settings still holding their built-in development values
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut settings = Vec::new();

        if self.jwt_secret == DEFAULT_JWT_SECRET {
            settings.push("auth.jwt_secret");
        }
        if self.admin_password == DEFAULT_ADMIN_PASSWORD {
            settings.push("auth.admin_password");
        }

        settings
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: ".hackzilla/session.json".to_string(),
        }
    }
}

impl StorageSettings {
    /// Resolve into a record store configuration
    pub fn to_storage_config(&self) -> Result<StorageConfig, config::ConfigError> {
        match StorageType::from_str(&self.backend) {
            Some(StorageType::InMemory) => Ok(StorageConfig::in_memory()),
            Some(StorageType::Postgres) => {
                let url = self.database_url.clone().ok_or_else(|| {
                    config::ConfigError::Message(
                        "storage.database_url is required for the postgres backend".to_string(),
                    )
                })?;

                Ok(StorageConfig::postgres(
                    PostgresConfig::new(url)
                        .with_max_connections(self.max_connections)
                        .with_connect_timeout(self.connect_timeout_secs),
                ))
            }
            None => Err(config::ConfigError::Message(format!(
                "Unknown storage backend '{}'",
                self.backend
            ))),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
