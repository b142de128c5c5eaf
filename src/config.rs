use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::domain::status::TransitionPolicy;

const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings the services need, independent of where the data lives.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub token_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub transitions: TransitionPolicy,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub service: ServiceSettings,
}

impl AppConfig {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(var(&vars, "PORT"), "PORT", 8080u16)?;
        let ttl_secs = parse_or(var(&vars, "TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", 600u64)?;
        let bcrypt_cost = parse_or(var(&vars, "BCRYPT_COST"), "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!("{} is outside 4..=31", bcrypt_cost),
            });
        }
        let transitions = match var(&vars, "ORDER_TRANSITIONS") {
            Some(rules) => rules
                .parse::<TransitionPolicy>()
                .map_err(|e| ConfigError::Invalid {
                    name: "ORDER_TRANSITIONS",
                    reason: e.to_string(),
                })?,
            None => TransitionPolicy::permissive(),
        };

        Ok(Self {
            database_url: required(&vars, "DATABASE_URL")?,
            host: var(&vars, "HOST").unwrap_or("0.0.0.0").to_string(),
            port,
            service: ServiceSettings {
                token_secret: required(&vars, "JWT_SECRET")?,
                token_ttl: Duration::from_secs(ttl_secs),
                bcrypt_cost,
                transitions,
            },
        })
    }
}

fn var<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

fn required(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    var(vars, name)
        .map(str::to_string)
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T>(raw: Option<&str>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
