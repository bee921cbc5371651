//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

// == TLS Mode ==
/// How the listener obtains its certificate. Fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain HTTP
    Plain,
    /// PEM certificate and private key loaded from disk
    Static { cert: PathBuf, key: PathBuf },
    /// Certificates issued on demand by an ACME authority
    Acme(AcmeSettings),
}

/// Settings for automatic certificate issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcmeSettings {
    /// Host names certificates may be issued for
    pub hosts: Vec<String>,
    /// Directory where account keys and certificates are cached
    pub cache_dir: PathBuf,
    /// Optional contact email for the ACME account
    pub contact: Option<String>,
    /// Use the staging directory instead of production
    pub staging: bool,
    /// Extra plain-HTTP port that serves only the challenge path
    pub challenge_port: Option<u16>,
}

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store byte budget in MiB
    pub cache_size_mib: usize,
    /// Listen port
    pub server_port: u16,
    /// Shared secret; empty disables authorization
    pub api_key: String,
    /// Certificate provisioning mode
    pub tls: TlsMode,
    /// Expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Upper bound on the shutdown drain
    pub shutdown_timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SIZE` - Store budget in MiB (default: 64)
    /// - `PORT` - Listen port (default: 8080)
    /// - `API_KEY` - Bearer secret (default: empty, open mode)
    /// - `TLS_CERT_FILE` / `TLS_KEY_FILE` - Static certificate and key
    /// - `HOST` - Comma separated ACME host names
    /// - `TLS_CERT_DIR` - ACME certificate cache (default: ./certs)
    /// - `ACME_CONTACT` - ACME account email
    /// - `ACME_STAGING` - Use the staging authority (default: false)
    /// - `ACME_CHALLENGE_PORT` - Extra plain listener for HTTP-01 challenges
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `SHUTDOWN_TIMEOUT` - Drain bound in seconds (default: 5)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable source; `from_env` uses the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            cache_size_mib: parsed(&var, "CACHE_SIZE").unwrap_or(defaults.cache_size_mib),
            server_port: parsed(&var, "PORT").unwrap_or(defaults.server_port),
            api_key: lookup("API_KEY").unwrap_or_default(),
            tls: tls_mode(&var),
            cleanup_interval: parsed(&var, "CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval),
            shutdown_timeout: parsed(&var, "SHUTDOWN_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_timeout),
        }
    }
}

fn parsed<T: FromStr>(var: &dyn Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    var(name).and_then(|v| v.trim().parse().ok())
}

/// Static files win over ACME; neither means plain HTTP.
fn tls_mode(var: &dyn Fn(&str) -> Option<String>) -> TlsMode {
    if let (Some(cert), Some(key)) = (var("TLS_CERT_FILE"), var("TLS_KEY_FILE")) {
        return TlsMode::Static {
            cert: cert.into(),
            key: key.into(),
        };
    }

    let hosts: Vec<String> = var("HOST")
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    if hosts.is_empty() {
        return TlsMode::Plain;
    }

    TlsMode::Acme(AcmeSettings {
        hosts,
        cache_dir: var("TLS_CERT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./certs")),
        contact: var("ACME_CONTACT"),
        staging: var("ACME_STAGING")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false),
        challenge_port: parsed(var, "ACME_CHALLENGE_PORT"),
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_size_mib: 64,
            server_port: 8080,
            api_key: String::new(),
            tls: TlsMode::Plain,
            cleanup_interval: 1,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_size_mib, 64);
        assert_eq!(config.server_port, 8080);
        assert!(config.api_key.is_empty());
        assert_eq!(config.tls, TlsMode::Plain);
        assert_eq!(config.cleanup_interval, 1);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_empty_source_uses_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache_size_mib, 64);
        assert_eq!(config.tls, TlsMode::Plain);
    }

    #[test]
    fn test_config_parses_values() {
        let config = config_from(&[
            ("CACHE_SIZE", "128"),
            ("PORT", "9090"),
            ("API_KEY", "s3cr3t"),
            ("CLEANUP_INTERVAL", "10"),
            ("SHUTDOWN_TIMEOUT", "2"),
        ]);
        assert_eq!(config.cache_size_mib, 128);
        assert_eq!(config.server_port, 9090);
        assert_eq!(config.api_key, "s3cr3t");
        assert_eq!(config.cleanup_interval, 10);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_config_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("CACHE_SIZE", "-1")]);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache_size_mib, 64);
    }

    #[test]
    fn test_static_tls_wins_over_acme() {
        let config = config_from(&[
            ("TLS_CERT_FILE", "/etc/cert.pem"),
            ("TLS_KEY_FILE", "/etc/key.pem"),
            ("HOST", "cache.example.com"),
        ]);
        assert_eq!(
            config.tls,
            TlsMode::Static {
                cert: "/etc/cert.pem".into(),
                key: "/etc/key.pem".into(),
            }
        );
    }

    #[test]
    fn test_cert_without_key_is_not_static() {
        let config = config_from(&[("TLS_CERT_FILE", "/etc/cert.pem")]);
        assert_eq!(config.tls, TlsMode::Plain);
    }

    #[test]
    fn test_acme_mode_from_host() {
        let config = config_from(&[
            ("HOST", "a.example.com, b.example.com"),
            ("TLS_CERT_DIR", "/var/cache/certs"),
            ("ACME_CONTACT", "ops@example.com"),
            ("ACME_STAGING", "true"),
            ("ACME_CHALLENGE_PORT", "80"),
        ]);
        let TlsMode::Acme(acme) = config.tls else {
            panic!("expected ACME mode");
        };
        assert_eq!(acme.hosts, vec!["a.example.com", "b.example.com"]);
        assert_eq!(acme.cache_dir, PathBuf::from("/var/cache/certs"));
        assert_eq!(acme.contact.as_deref(), Some("ops@example.com"));
        assert!(acme.staging);
        assert_eq!(acme.challenge_port, Some(80));
    }

    #[test]
    fn test_acme_defaults() {
        let config = config_from(&[("HOST", "cache.example.com")]);
        let TlsMode::Acme(acme) = config.tls else {
            panic!("expected ACME mode");
        };
        assert_eq!(acme.cache_dir, PathBuf::from("./certs"));
        assert!(acme.contact.is_none());
        assert!(!acme.staging);
        assert!(acme.challenge_port.is_none());
    }
}
