// config.rs
use std::{env, fmt::Display, str::FromStr};

use tracing::info;

/// Runtime configuration, loaded once in `main` and passed down explicitly.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "3030"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            max_db_connections: try_load("MAX_DB_CONNECTIONS", "5"),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("Invalid {key} value: {e}"))
}
