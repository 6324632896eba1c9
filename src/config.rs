//! Configuration management

use std::{env, path::Path};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Hosts that resolve to this machine when checking for self-forwarding
const LOCAL_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "0.0.0.0", "::1"];

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Environment files to load before resolving secrets.
    /// Paths support ~ expansion. Loaded in order, later files override earlier.
    pub env_files: Vec<String>,
    /// Server configuration
    pub server: ServerConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Queue backend configuration
    pub publisher: PublisherConfig,
}

impl Config {
    /// Load configuration from an optional YAML file, then `ENQUEUE_GATEWAY_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed("ENQUEUE_GATEWAY_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        // Secrets may reference variables defined in the env files
        config.load_env_files();

        Ok(config)
    }

    /// Load environment files into the process environment.
    /// Files that don't exist are skipped.
    fn load_env_files(&self) {
        for path_str in &self.env_files {
            let expanded = if path_str.starts_with('~') {
                if let Some(home) = dirs::home_dir() {
                    path_str.replacen('~', &home.display().to_string(), 1)
                } else {
                    path_str.clone()
                }
            } else {
                path_str.clone()
            };

            let path = Path::new(&expanded);
            if path.exists() {
                match dotenvy::from_path(path) {
                    Ok(()) => tracing::info!("Loaded env file: {expanded}"),
                    Err(e) => tracing::warn!("Failed to load env file {expanded}: {e}"),
                }
            } else {
                tracing::debug!("Env file not found (skipped): {expanded}");
            }
        }
    }

    /// Check the configuration for values the gateway cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.auth.resolve_api_key().is_empty() {
            return Err(Error::Config("API key is empty".to_string()));
        }

        if let PublisherConfig::Remote(remote) = &self.publisher {
            let url = Url::parse(&remote.url)
                .map_err(|e| Error::Config(format!("Invalid upstream URL: {e}")))?;

            let host = url.host_str().unwrap_or_default().trim_matches(['[', ']']);
            let is_local = LOCAL_HOSTS
                .iter()
                .any(|local| host.eq_ignore_ascii_case(local));

            if is_local && url.port_or_known_default() == Some(self.server.port) {
                return Err(Error::Config(
                    "Upstream publisher port and gateway port are the same".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Address the server binds to
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret expected in the `x-api-key` header.
    /// Supports a literal value or `env:VAR_NAME`.
    #[serde(deserialize_with = "string_or_scalar")]
    pub api_key: String,
}

impl AuthConfig {
    /// Resolve the API key (expand `env:` references)
    #[must_use]
    pub fn resolve_api_key(&self) -> String {
        resolve_secret(&self.api_key)
    }
}

/// Expand a secret given as a literal or `env:VAR_NAME`.
///
/// An unset variable resolves to the empty string.
#[must_use]
pub fn resolve_secret(value: &str) -> String {
    match value.strip_prefix("env:") {
        Some(var_name) => env::var(var_name).unwrap_or_default(),
        None => value.to_string(),
    }
}

/// Deserialize a string that may arrive as a number or bool.
///
/// Environment values are parsed into typed scalars, so a key like `12345`
/// or `true` set through `ENQUEUE_GATEWAY_*` reaches serde as an integer
/// or boolean. Its text form is kept.
fn string_or_scalar<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct ScalarVisitor;

    impl serde::de::Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: serde::de::Error>(self, v: i128) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: serde::de::Error>(self, v: u128) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

/// Queue backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PublisherConfig {
    /// In-process queue
    Memory(MemoryPublisherConfig),
    /// Upstream gateway reached over HTTP
    Remote(RemotePublisherConfig),
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self::Memory(MemoryPublisherConfig::default())
    }
}

impl PublisherConfig {
    /// Short backend name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Remote(_) => "remote",
        }
    }
}

/// In-process queue limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryPublisherConfig {
    /// Largest accepted message in bytes (0 = unlimited)
    pub max_message_size: usize,
    /// Maximum queued messages (0 = unbounded).
    /// Nothing in the gateway drains this queue, so keep it finite.
    pub capacity: usize,
}

impl Default for MemoryPublisherConfig {
    fn default() -> Self {
        Self {
            max_message_size: 1024 * 1024, // 1MB
            capacity: 10_000,
        }
    }
}

/// Upstream gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemotePublisherConfig {
    /// Base URL of the upstream gateway
    #[serde(deserialize_with = "string_or_scalar")]
    pub url: String,
    /// Key sent as `x-api-key` upstream (supports `env:VAR_NAME`)
    #[serde(default, deserialize_with = "string_or_scalar")]
    pub api_key: String,
    /// Idle connections kept in the pool per upstream host.
    /// Does not cap how many requests are in flight at once.
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
    /// Per-request timeout in seconds (0 = none)
    #[serde(default = "default_max_io_time_seconds")]
    pub max_io_time_seconds: u64,
}

fn default_max_idle_connections() -> usize {
    16
}

fn default_max_io_time_seconds() -> u64 {
    10
}
