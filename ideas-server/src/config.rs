use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    /// Process-local tables; everything is lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub backend: StorageBackend,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    pub initialize_schema: bool,
}

#[derive(Debug, Deserialize)]
pub struct Security {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub security: Security,
}

/// Costs bcrypt accepts; anything else fails every hash
const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Environment variables and the setting each one overrides
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("DATABASE_BACKEND", "database.backend"),
    ("POSTGRES_HOST", "database.host"),
    ("POSTGRES_PORT", "database.port"),
    ("POSTGRES_USER", "database.user"),
    ("POSTGRES_PWD", "database.password"),
    ("POSTGRES_DB", "database.name"),
    ("DATABASE_POOL_SIZE", "database.pool_size"),
    ("BCRYPT_COST", "security.bcrypt_cost"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Build settings from `settings.toml` (if present), defaults, and `env`
    pub fn load<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        // 1. Try to load from settings.toml (optional for deployment)
        let config_file_name = "settings.toml";

        // Check in current directory
        let current_dir_path = PathBuf::from(config_file_name);
        if current_dir_path.exists() {
            builder = builder.add_source(File::from(current_dir_path).required(false));
        }

        // Check in ideas-server directory (for development)
        let dev_path = PathBuf::from("ideas-server").join(config_file_name);
        if dev_path.exists() {
            builder = builder.add_source(File::from(dev_path).required(false));
        }

        // 2. Defaults for anything the file leaves out
        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.backend", "postgres")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", "")?
            .set_default("database.name", "postgres")?
            .set_default("database.pool_size", 10)?
            .set_default("database.initialize_schema", true)?
            .set_default("security.bcrypt_cost", 10)?;

        // 3. Override with environment variables (highest priority)
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = env(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let s = builder.build()?;
        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !BCRYPT_COST_RANGE.contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "security.bcrypt_cost must be between {} and {}, got {}",
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end(),
                self.security.bcrypt_cost
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
