//! Configuration management for Upcache Server

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::upload::{
    UploadSettings, DEFAULT_CACHE_TTL_SECS, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_UPLOAD_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub remote: RemoteConfig,
    pub s3: S3Config,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Reported by the health check
    pub app_name: String,
    pub host: String,
    pub port: u16,
    /// Verbose default log filter
    pub debug: bool,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis: RedisConfig,
    pub ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    /// Per-command timeout
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub backend: RemoteBackend,
    pub gemini: GeminiConfig,
    pub concurrency_limit: usize,
    pub upload_timeout: Duration,
    pub staging_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteBackend {
    Gemini,
    S3,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    /// Storage backend is enabled only when a bucket is set
    pub bucket: Option<String>,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl Default for S3Config {
    fn default() -> Self {
        S3Config {
            bucket: None,
            region: "ap-southeast-1".to_string(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                app_name: "upcache-server".to_string(),
                host: "0.0.0.0".to_string(),
                port: 8000,
                debug: false,
                max_upload_bytes: 100 * 1024 * 1024,
            },
            cache: CacheConfig {
                backend: CacheBackend::Redis,
                redis: RedisConfig {
                    host: "localhost".to_string(),
                    port: 6379,
                    password: None,
                    db: 0,
                    timeout: Duration::from_millis(2000),
                },
                ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            },
            remote: RemoteConfig {
                backend: RemoteBackend::Gemini,
                gemini: GeminiConfig::default(),
                concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
                upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
                staging_dir: env::temp_dir().join("upcache"),
            },
            s3: S3Config::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source; unset or blank
    /// variables take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                app_name: vars.string("APP_NAME", &defaults.server.app_name),
                host: vars.string("APP_HOST", &defaults.server.host),
                port: vars.parse("APP_PORT", defaults.server.port)?,
                debug: vars.flag("DEBUG", defaults.server.debug)?,
                max_upload_bytes: vars.parse("MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes)?,
            },
            cache: CacheConfig {
                backend: match vars.get("CACHE_BACKEND").as_deref() {
                    None | Some("redis") => CacheBackend::Redis,
                    Some("memory") => CacheBackend::Memory,
                    Some(other) => return Err(invalid("CACHE_BACKEND", other, "expected redis or memory")),
                },
                redis: RedisConfig {
                    host: vars.string("REDIS_HOST", &defaults.cache.redis.host),
                    port: vars.parse("REDIS_PORT", defaults.cache.redis.port)?,
                    password: vars.get("REDIS_PASSWORD"),
                    db: vars.parse("REDIS_DB", defaults.cache.redis.db)?,
                    timeout: Duration::from_millis(vars.parse("REDIS_TIMEOUT_MS", 2000u64)?),
                },
                ttl: Duration::from_secs(vars.positive("CACHE_TTL", DEFAULT_CACHE_TTL_SECS)?),
            },
            remote: RemoteConfig {
                backend: match vars.get("REMOTE_BACKEND").as_deref() {
                    None | Some("gemini") => RemoteBackend::Gemini,
                    Some("s3") => RemoteBackend::S3,
                    Some(other) => return Err(invalid("REMOTE_BACKEND", other, "expected gemini or s3")),
                },
                gemini: GeminiConfig {
                    api_key: vars.get("GEMINI_API_KEY"),
                    model: vars.string("GEMINI_MODEL", &defaults.remote.gemini.model),
                    base_url: vars.string("GEMINI_BASE_URL", &defaults.remote.gemini.base_url),
                },
                concurrency_limit: vars.positive("CONCURRENCY_LIMIT", DEFAULT_CONCURRENCY_LIMIT as u64)? as usize,
                upload_timeout: Duration::from_secs(
                    vars.positive("UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?,
                ),
                staging_dir: vars
                    .get("STAGING_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.remote.staging_dir),
            },
            s3: S3Config {
                bucket: vars.get("S3_BUCKET_NAME"),
                region: vars.string("AWS_REGION", &defaults.s3.region),
                endpoint_url: vars.get("S3_ENDPOINT_URL"),
                access_key_id: vars.get("AWS_ACCESS_KEY_ID"),
                secret_access_key: vars.get("AWS_SECRET_ACCESS_KEY"),
            },
        })
    }

    /// Orchestrator settings derived from this configuration
    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            concurrency_limit: self.remote.concurrency_limit,
            cache_ttl: self.cache.ttl,
            upload_timeout: self.remote.upload_timeout,
        }
    }
}

// ============================================================================
// Variable parsing
// ============================================================================

/// Boolean switch as written in env vars and query strings
///
/// `None` when the value is not a recognised boolean.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|e: T::Err| invalid(name, &value, &e.to_string())),
        }
    }

    fn positive(&self, name: &'static str, default: u64) -> Result<u64, ConfigError> {
        let value = self.parse(name, default)?;
        if value == 0 {
            return Err(invalid(name, "0", "must be greater than zero"));
        }
        Ok(value)
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => {
                parse_flag(&value).ok_or_else(|| invalid(name, &value, "expected a boolean"))
            }
        }
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "YES", " on "] {
            assert_eq!(parse_flag(value), Some(true), "{}", value);
        }
        for value in ["0", "False", "no", "off"] {
            assert_eq!(parse_flag(value), Some(false), "{}", value);
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = from_pairs(&[]).unwrap();

        assert_eq!(config.server.app_name, "upcache-server");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.ttl, Duration::from_secs(169_200));
        assert_eq!(config.remote.backend, RemoteBackend::Gemini);
        assert_eq!(config.remote.concurrency_limit, 5);
        assert_eq!(config.remote.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.s3.region, "ap-southeast-1");
        assert!(config.s3.bucket.is_none());
        assert!(config.remote.gemini.api_key.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("APP_NAME", "uploader"),
            ("APP_PORT", "9000"),
            ("DEBUG", "true"),
            ("CACHE_BACKEND", "memory"),
            ("CACHE_TTL", "60"),
            ("REDIS_PASSWORD", "secret"),
            ("REMOTE_BACKEND", "s3"),
            ("CONCURRENCY_LIMIT", "2"),
            ("S3_BUCKET_NAME", "uploads"),
            ("STAGING_DIR", "/var/tmp/upcache"),
        ])
        .unwrap();

        assert_eq!(config.server.app_name, "uploader");
        assert_eq!(config.server.port, 9000);
        assert!(config.server.debug);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.redis.password.as_deref(), Some("secret"));
        assert_eq!(config.remote.backend, RemoteBackend::S3);
        assert_eq!(config.s3.bucket.as_deref(), Some("uploads"));
        assert_eq!(config.remote.staging_dir, PathBuf::from("/var/tmp/upcache"));

        let settings = config.upload_settings();
        assert_eq!(settings.concurrency_limit, 2);
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = from_pairs(&[("GEMINI_API_KEY", "  "), ("APP_PORT", "")]).unwrap();
        assert!(config.remote.gemini.api_key.is_none());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(from_pairs(&[("APP_PORT", "not-a-port")]).is_err());
        assert!(from_pairs(&[("CACHE_TTL", "0")]).is_err());
        assert!(from_pairs(&[("CONCURRENCY_LIMIT", "0")]).is_err());
        assert!(from_pairs(&[("CACHE_BACKEND", "memcached")]).is_err());
        assert!(from_pairs(&[("DEBUG", "maybe")]).is_err());
    }
}
