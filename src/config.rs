//! Configuration management for slugship
//!
//! Settings are read from environment variables with defaults suitable for a
//! compose/HashiStack deployment where Consul and Nomad are reachable by
//! service name.
//!
//! # Environment Variables
//!
//! - `CONSUL_ADDR`: Consul HTTP address - default: "http://consul:8500"
//! - `CONSUL_TOKEN`: Consul ACL token - optional
//! - `NOMAD_ADDR`: Nomad HTTP address - default: "http://nomad:4646"
//! - `NOMAD_TOKEN`: Nomad ACL token - optional
//! - `SLUGSHIP_REPOS_DIR`: Checkout directory - default: system temp dir + "slugship-repos"
//! - `SLUGSHIP_GIT_BASE_URL`: Clone base URL - default: "https://github.com"
//! - `SLUGSHIP_REQUEST_TIMEOUT`: HTTP timeout in seconds - default: "30"
//! - `SLUGSHIP_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use slugship::SlugshipConfig;
//!
//! let config = SlugshipConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config);
//! ```

use crate::clients::{ClientError, ConsulClient, GitCloner, NomadClient};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONSUL_ADDR: &str = "http://consul:8500";
const DEFAULT_NOMAD_ADDR: &str = "http://nomad:4646";
const DEFAULT_GIT_BASE_URL: &str = "https://github.com";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to initialize {service} client: {source}")]
    ClientInit {
        service: &'static str,
        #[source]
        source: ClientError,
    },
}

#[derive(Debug, Clone)]
pub struct SlugshipConfig {
    pub consul_addr: String,
    pub consul_token: Option<String>,
    pub nomad_addr: String,
    pub nomad_token: Option<String>,
    pub repos_dir: PathBuf,
    pub git_base_url: String,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for SlugshipConfig {
    fn default() -> Self {
        let consul_addr =
            env::var("CONSUL_ADDR").unwrap_or_else(|_| DEFAULT_CONSUL_ADDR.to_string());
        let nomad_addr = env::var("NOMAD_ADDR").unwrap_or_else(|_| DEFAULT_NOMAD_ADDR.to_string());

        let consul_token = env::var("CONSUL_TOKEN").ok().filter(|t| !t.is_empty());
        let nomad_token = env::var("NOMAD_TOKEN").ok().filter(|t| !t.is_empty());

        let repos_dir = env::var("SLUGSHIP_REPOS_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("slugship-repos"));

        let git_base_url = env::var("SLUGSHIP_GIT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_GIT_BASE_URL.to_string());

        let request_timeout_secs = env::var("SLUGSHIP_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = env::var("SLUGSHIP_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            consul_addr,
            consul_token,
            nomad_addr,
            nomad_token,
            repos_dir,
            git_base_url,
            request_timeout_secs,
            log_level,
        }
    }
}

impl SlugshipConfig {
    /// Checks that:
    /// - service addresses are http(s) URLs
    /// - the request timeout is between 1 and 600 seconds
    /// - the log level is valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, addr) in [
            ("CONSUL_ADDR", &self.consul_addr),
            ("NOMAD_ADDR", &self.nomad_addr),
        ] {
            if !(addr.starts_with("http://") || addr.starts_with("https://")) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, addr
                )));
            }
        }

        if self.git_base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "git base URL must not be empty".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(format!(
                "request timeout must be between 1 and {} seconds, got {}",
                MAX_REQUEST_TIMEOUT_SECS, self.request_timeout_secs
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}. Valid levels: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn consul_client(&self) -> Result<ConsulClient, ConfigError> {
        ConsulClient::new(
            self.consul_addr.clone(),
            self.consul_token.as_deref(),
            self.request_timeout(),
        )
        .map_err(|source| ConfigError::ClientInit {
            service: "consul",
            source,
        })
    }

    pub fn nomad_client(&self) -> Result<NomadClient, ConfigError> {
        NomadClient::new(
            self.nomad_addr.clone(),
            self.nomad_token.as_deref(),
            self.request_timeout(),
        )
        .map_err(|source| ConfigError::ClientInit {
            service: "nomad",
            source,
        })
    }

    pub fn git_cloner(&self) -> GitCloner {
        GitCloner::new(self.repos_dir.clone(), self.git_base_url.clone())
    }
}

impl fmt::Display for SlugshipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = |t: &Option<String>| if t.is_some() { "set" } else { "not set" };

        writeln!(f, "Slugship Configuration:")?;
        writeln!(f, "  Consul: {} (token {})", self.consul_addr, token(&self.consul_token))?;
        writeln!(f, "  Nomad: {} (token {})", self.nomad_addr, token(&self.nomad_token))?;
        writeln!(f, "  Repos Dir: {}", self.repos_dir.display())?;
        writeln!(f, "  Git Base URL: {}", self.git_base_url)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn remove(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn valid_config() -> SlugshipConfig {
        SlugshipConfig {
            consul_addr: DEFAULT_CONSUL_ADDR.to_string(),
            consul_token: None,
            nomad_addr: DEFAULT_NOMAD_ADDR.to_string(),
            nomad_token: None,
            repos_dir: PathBuf::from("/tmp/repos"),
            git_base_url: DEFAULT_GIT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = [
            EnvGuard::remove("CONSUL_ADDR"),
            EnvGuard::remove("CONSUL_TOKEN"),
            EnvGuard::remove("NOMAD_ADDR"),
            EnvGuard::remove("NOMAD_TOKEN"),
            EnvGuard::remove("SLUGSHIP_REPOS_DIR"),
            EnvGuard::remove("SLUGSHIP_GIT_BASE_URL"),
            EnvGuard::remove("SLUGSHIP_REQUEST_TIMEOUT"),
            EnvGuard::remove("SLUGSHIP_LOG_LEVEL"),
        ];

        let config = SlugshipConfig::default();

        assert_eq!(config.consul_addr, DEFAULT_CONSUL_ADDR);
        assert_eq!(config.nomad_addr, DEFAULT_NOMAD_ADDR);
        assert_eq!(config.consul_token, None);
        assert_eq!(config.nomad_token, None);
        assert_eq!(config.repos_dir, env::temp_dir().join("slugship-repos"));
        assert_eq!(config.git_base_url, DEFAULT_GIT_BASE_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = [
            EnvGuard::set("CONSUL_ADDR", "http://localhost:8500"),
            EnvGuard::set("CONSUL_TOKEN", "consul-secret"),
            EnvGuard::set("NOMAD_ADDR", "https://nomad.internal:4646"),
            EnvGuard::set("NOMAD_TOKEN", ""),
            EnvGuard::set("SLUGSHIP_REPOS_DIR", "/srv/repos"),
            EnvGuard::set("SLUGSHIP_GIT_BASE_URL", "https://git.example.com"),
            EnvGuard::set("SLUGSHIP_REQUEST_TIMEOUT", "5"),
            EnvGuard::set("SLUGSHIP_LOG_LEVEL", "DEBUG"),
        ];

        let config = SlugshipConfig::default();

        assert_eq!(config.consul_addr, "http://localhost:8500");
        assert_eq!(config.consul_token.as_deref(), Some("consul-secret"));
        assert_eq!(config.nomad_addr, "https://nomad.internal:4646");
        assert_eq!(config.nomad_token, None);
        assert_eq!(config.repos_dir, PathBuf::from("/srv/repos"));
        assert_eq!(config.git_base_url, "https://git.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_falls_back_to_default() {
        let _guard = EnvGuard::set("SLUGSHIP_REQUEST_TIMEOUT", "soon");

        let config = SlugshipConfig::default();
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_validation_rejects_non_http_address() {
        let mut config = valid_config();
        config.nomad_addr = "nomad:4646".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("NOMAD_ADDR"));
    }

    #[test]
    fn test_validation_rejects_timeout_bounds() {
        let mut config = valid_config();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 601;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_log_level() {
        let mut config = valid_config();
        config.log_level = "verbose".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_clients_from_config() {
        let config = valid_config();

        assert!(config.consul_client().is_ok());
        assert!(config.nomad_client().is_ok());
        assert_eq!(
            config.git_cloner().checkout_dir("acme/web"),
            PathBuf::from("/tmp/repos/acme_web")
        );
    }

    #[test]
    fn test_config_display_hides_tokens() {
        let mut config = valid_config();
        config.consul_token = Some("consul-secret".to_string());

        let display = config.to_string();
        assert!(display.contains("Slugship Configuration:"));
        assert!(display.contains("token set"));
        assert!(!display.contains("consul-secret"));
    }
}
