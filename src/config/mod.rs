//! Environment configuration, read once at startup

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::browser::BrowserOptions;
use crate::scrapers::myntra::MYNTRA_URL;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value `{value}` for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot store connection string
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub target_url: String,
    pub ready_timeout: Duration,
    pub browser: BrowserOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_or(
            &lookup,
            "BIND_ADDR",
            SocketAddr::from(([127, 0, 0, 1], 5000)),
            |v| v.parse::<SocketAddr>().map_err(|e| e.to_string()),
        )?;

        let target_url = lookup("TARGET_URL").unwrap_or_else(|| MYNTRA_URL.to_string());
        url::Url::parse(&target_url).map_err(|e| ConfigError::Invalid {
            name: "TARGET_URL",
            value: target_url.clone(),
            reason: e.to_string(),
        })?;

        let page_load_timeout =
            parse_or(&lookup, "PAGE_LOAD_TIMEOUT_SECS", Duration::from_secs(60), parse_secs)?;
        let ready_timeout =
            parse_or(&lookup, "READY_TIMEOUT_SECS", Duration::from_secs(20), parse_secs)?;
        let headless = parse_or(&lookup, "BROWSER_HEADLESS", true, parse_bool)?;
        let sandbox = parse_or(&lookup, "BROWSER_SANDBOX", true, parse_bool)?;

        Ok(Self {
            database_url,
            bind_addr,
            target_url,
            ready_timeout,
            browser: BrowserOptions {
                headless,
                sandbox,
                chrome_path: lookup("CHROME_PATH").map(PathBuf::from),
                page_load_timeout,
            },
        })
    }
}

/// Parse `name` if set, otherwise fall back to `default`
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => parse(value.trim()).map_err(|reason| ConfigError::Invalid {
            name,
            value,
            reason,
        }),
        None => Ok(default),
    }
}

fn parse_secs(value: &str) -> Result<Duration, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}
