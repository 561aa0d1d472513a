//! Environment-driven configuration.

use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
}

impl Config {
    /// Reads configuration from the environment, loading a `.env` file if
    /// one is present. Everything has a development-friendly default.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "4000".to_string());
        Self {
            database_url,
            listen_addr: format!("{host}:{port}"),
        }
    }
}
