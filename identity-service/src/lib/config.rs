use std::env;

use auth::password::DEFAULT_COST;
use auth::ExpiresIn;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Postgres connection string; the in-memory store is used when absent
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: ExpiresIn,
}

impl JwtConfig {
    /// Whether the development default secret is still in place.
    pub fn uses_default_secret(&self) -> bool {
        self.secret == auth::jwt::DEFAULT_SECRET
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub cost: u32,
}

impl PasswordConfig {
    /// Costs bcrypt accepts.
    pub const COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

    fn validate(&self) -> Result<(), ConfigError> {
        if Self::COST_RANGE.contains(&self.cost) {
            Ok(())
        } else {
            Err(ConfigError::Message(format!(
                "password.cost must be between {} and {}, got {}",
                Self::COST_RANGE.start(),
                Self::COST_RANGE.end(),
                self.cost
            )))
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, JWT__EXPIRES_IN, PASSWORD__COST, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    /// 4. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = Self::builder()?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.password.validate()?;
        Ok(config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        ConfigBuilder::builder()
            .set_default("server.http_port", 3000)?
            .set_default("jwt.secret", auth::jwt::DEFAULT_SECRET)?
            .set_default("jwt.expires_in", "1h")?
            .set_default("password.cost", i64::from(DEFAULT_COST))
    }
}
