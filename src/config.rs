use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, anyhow, ensure};
use chrono_tz::Tz;
use dotenvy::dotenv;
use tracing::Level;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Timezone every submitted date and wall-clock time is read in.
    pub operating_timezone: Tz,
    pub default_standard_duty_minutes: i32,

    pub log_dir: String,
    pub log_level: Level,

    // First-admin bootstrap
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let config = Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_addr: lookup("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            access_token_ttl: parse_or(&lookup, "ACCESS_TOKEN_TTL", 900)?, // default 15 min

            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or(&lookup, "RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            operating_timezone: parse_or(&lookup, "OPERATING_TIMEZONE", chrono_tz::Asia::Dhaka)?,
            default_standard_duty_minutes: parse_or(&lookup, "DEFAULT_STANDARD_DUTY_MINUTES", 550)?,

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", Level::DEBUG)?,

            admin_name: lookup("ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
            admin_email: lookup("ADMIN_EMAIL"),
            admin_password: lookup("ADMIN_PASSWORD"),
        };

        ensure!(
            config.default_standard_duty_minutes > 0,
            "DEFAULT_STANDARD_DUTY_MINUTES must be positive"
        );

        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key}={raw:?} is invalid: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "mysql://root@localhost/overtime"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = from_pairs(&BASE).unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.access_token_ttl, 900);
        assert_eq!(config.operating_timezone, chrono_tz::Asia::Dhaka);
        assert_eq!(config.default_standard_duty_minutes, 550);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.admin_name, "Admin");
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn operating_timezone_is_configurable() {
        let mut pairs = BASE.to_vec();
        pairs.push(("OPERATING_TIMEZONE", "Europe/Berlin"));

        let config = from_pairs(&pairs).unwrap();

        assert_eq!(config.operating_timezone, chrono_tz::Europe::Berlin);
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("OPERATING_TIMEZONE", "Mars/Olympus_Mons"));

        let err = from_pairs(&pairs).unwrap_err();

        assert!(err.to_string().contains("OPERATING_TIMEZONE"));
    }

    #[test]
    fn missing_required_values_are_reported() {
        let err = from_pairs(&[("JWT_SECRET", "secret")]).unwrap_err();

        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn non_positive_default_duty_is_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("DEFAULT_STANDARD_DUTY_MINUTES", "0"));

        assert!(from_pairs(&pairs).is_err());
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("RATE_LOGIN_PER_MIN", "lots"));

        let err = from_pairs(&pairs).unwrap_err();

        assert!(err.to_string().contains("RATE_LOGIN_PER_MIN"));
    }
}
