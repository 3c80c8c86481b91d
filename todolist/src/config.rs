use serde::Deserialize;
use std::fmt;

const DATABASE_ENV_PREFIX: &str = "DB_CONFIG";
const SERVER_ENV_PREFIX: &str = "SERVER";

/// Application configuration, assembled from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database: DatabaseConfig::from_environment(config::Environment::with_prefix(
                DATABASE_ENV_PREFIX,
            ))?,
            server: ServerConfig::from_environment(config::Environment::with_prefix(
                SERVER_ENV_PREFIX,
            ))?,
        })
    }
}

/// Connection parameters for the PostgreSQL database.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

impl DatabaseConfig {
    /// Builds the database configuration from the given environment source.
    ///
    /// Keys are read without their prefix, so `DB_CONFIG_USER` maps to `user`.
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("user", "skillsrock")?
            .set_default("password", "ForSkillsRock")?
            .set_default("host", "localhost")?
            .set_default("port", 5432)?
            .set_default("dbname", "todolist")?
            .add_source(environment)
            .build()?;

        settings.try_deserialize()
    }

    /// Returns the connection URL understood by the database driver.
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            self.user, self.password, self.host, self.port, self.dbname
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .finish()
    }
}

/// Listener parameters for the HTTP server.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8083)?
            .add_source(environment)
            .build()?;

        settings.try_deserialize()
    }

    /// Returns the `host:port` address the listener binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
