//! Configuration management via environment variables
//!
//! Loads configuration from environment variables with .env file support.
//! Follows 12-factor app principles for cloud-native deployments.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DefenderError, Result};
use crate::filter::identity::DEFAULT_IDENTITY_HEADER;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub proxy: ProxyConfig,
    pub guard: GuardConfig,
}

/// Server binding configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Proxy configuration
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub upstream_url: String,
    pub timeout: Duration,
    pub preserve_host: bool,
}

/// Probe-guard settings: banlist storage, identity header, whitelist
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub banlist_path: PathBuf,
    pub identity_header: String,
    pub whitelist: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Reads .env file if present, then parses environment variables.
    /// Returns error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            server: ServerConfig::from_env()?,
            proxy: ProxyConfig::from_env()?,
            guard: GuardConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| DefenderError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

        Ok(Self { host, port })
    }
}

impl ProxyConfig {
    fn from_env() -> Result<Self> {
        let upstream_url = env::var("PROXY_UPSTREAM_URL")
            .map_err(|_| DefenderError::Config("PROXY_UPSTREAM_URL is required".to_string()))?;

        let timeout_secs = env::var("PROXY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| DefenderError::Config(format!("Invalid PROXY_TIMEOUT_SECS: {}", e)))?;

        let preserve_host = env::var("PROXY_PRESERVE_HOST")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|e| DefenderError::Config(format!("Invalid PROXY_PRESERVE_HOST: {}", e)))?;

        Ok(Self {
            upstream_url,
            timeout: Duration::from_secs(timeout_secs),
            preserve_host,
        })
    }
}

impl GuardConfig {
    fn from_env() -> Result<Self> {
        let banlist_path = env::var("GUARD_BANLIST_PATH")
            .map(PathBuf::from)
            .map_err(|_| DefenderError::Config("GUARD_BANLIST_PATH is required".to_string()))?;

        let identity_header = env::var("GUARD_IDENTITY_HEADER")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_HEADER.to_string());

        let whitelist = env::var("GUARD_WHITELIST")
            .map(|raw| parse_whitelist(&raw))
            .unwrap_or_default();

        Ok(Self {
            banlist_path,
            identity_header,
            whitelist,
        })
    }
}

/// Splits a comma-separated whitelist, dropping empty entries.
fn parse_whitelist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns its environment variables outright; no variable is
    // touched by more than one test, since tests run concurrently in one
    // process.

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::from_env().unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_proxy_config_requires_upstream() {
        let result = ProxyConfig::from_env();

        assert!(matches!(result, Err(DefenderError::Config(_))));
    }

    #[test]
    fn test_guard_config_defaults() {
        env::set_var("GUARD_BANLIST_PATH", "/tmp/banlist.txt");

        let config = GuardConfig::from_env().unwrap();

        assert_eq!(config.banlist_path, PathBuf::from("/tmp/banlist.txt"));
        assert_eq!(config.identity_header, "x-forwarded-for");
        assert!(config.whitelist.is_empty());
    }

    #[test]
    fn test_parse_whitelist_splits_and_trims() {
        let whitelist = parse_whitelist("1.2.3.4, 5.6.7.8 ,9.9.9.9");

        assert_eq!(whitelist, vec!["1.2.3.4", "5.6.7.8", "9.9.9.9"]);
    }

    #[test]
    fn test_parse_whitelist_drops_empty_entries() {
        assert!(parse_whitelist("").is_empty());
        assert!(parse_whitelist(" , ,").is_empty());
        assert_eq!(parse_whitelist(",1.2.3.4,").len(), 1);
    }
}
