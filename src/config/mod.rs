// src/config/mod.rs
//! Process configuration, read once at startup.
//!
//! Values come from the environment (optionally seeded from `.env` by the
//! binary). Business logic never reads the environment itself: it receives an
//! `AppConfig` by reference. Tests build one from a closure instead.

pub mod scoring;

use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::scheduler::{Frequency, ScheduleConfig};

pub use scoring::ScoringConfig;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_API_ADDR: &str = "127.0.0.1:8080";

/// SMTP settings. Only present when user, password and recipient are all set.
#[derive(Clone, Serialize)]
pub struct EmailConfig {
    pub user: String,
    #[serde(skip)]
    pub password: String,
    pub to: String,
    pub server: String,
    pub port: u16,
}

// keep the password out of logs
impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("to", &self.to)
            .field("server", &self.server)
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` means display-only mode.
    pub email: Option<EmailConfig>,
    pub schedule: ScheduleConfig,
    pub fetch_timeout: Duration,
    pub api_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Invalid values are logged and
    /// replaced with defaults; nothing here fails.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let frequency = match get("EMAIL_FREQUENCY") {
            None => Frequency::Daily,
            Some(raw) => Frequency::parse(&raw).unwrap_or_else(|e| {
                warn!(target: "config", error = %e, "falling back to daily schedule");
                Frequency::Daily
            }),
        };

        let port = get("SMTP_PORT")
            .map(|raw| {
                parse_or_default(
                    "SMTP_PORT",
                    &raw,
                    "port number",
                    DEFAULT_SMTP_PORT,
                    |v| v.parse::<u16>().ok().filter(|p| *p != 0),
                )
            })
            .unwrap_or(DEFAULT_SMTP_PORT);

        let email = match (get("EMAIL_USER"), get("EMAIL_PASS"), get("EMAIL_TO")) {
            (Some(user), Some(password), Some(to)) => Some(EmailConfig {
                user,
                password,
                to,
                server: get("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
                port,
            }),
            _ => None,
        };

        let timeout_secs = get("FETCH_TIMEOUT_SECS")
            .map(|raw| {
                parse_or_default(
                    "FETCH_TIMEOUT_SECS",
                    &raw,
                    "positive number of seconds",
                    DEFAULT_FETCH_TIMEOUT_SECS,
                    |v| v.parse::<u64>().ok().filter(|s| *s > 0),
                )
            })
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

        let default_addr: SocketAddr = ([127, 0, 0, 1], 8080).into();
        let api_addr = get("API_ADDR")
            .map(|raw| {
                parse_or_default("API_ADDR", &raw, "socket address", default_addr, |v| {
                    v.parse::<SocketAddr>().ok()
                })
            })
            .unwrap_or(default_addr);

        Self {
            email,
            schedule: ScheduleConfig::new(frequency),
            fetch_timeout: Duration::from_secs(timeout_secs),
            api_addr,
        }
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }
}

fn parse_or_default<T, P>(var: &'static str, raw: &str, expected: &'static str, default: T, parse: P) -> T
where
    P: Fn(&str) -> Option<T>,
{
    match parse(raw) {
        Some(v) => v,
        None => {
            let e = ConfigError::InvalidValue {
                var,
                value: raw.to_string(),
                expected,
            };
            warn!(target: "config", error = %e, "using default");
            default
        }
    }
}
