//! Server configuration.
//!
//! Loaded from a sectioned YAML file when one is present, with serde
//! defaults for everything omitted and a `LISTEN` env override for the
//! bind address.

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: String,
    /// Per-connection read timeout, applied from accept time on.
    pub read_timeout_ms: u64,
    /// One task per connection when true; fully sequential otherwise.
    pub threaded: bool,
    /// Chunk size for body reads and streamed responses.
    pub buffer_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve files for requests no route matched.
    pub enabled: bool,
    /// Root directory the request paths resolve under.
    pub root: String,
    /// Document served for an empty path.
    pub default_document: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_timeout_ms: 5000,
            threaded: true,
            buffer_size: 8192,
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "./public".to_string(),
            default_document: "index.html".to_string(),
        }
    }
}

impl Config {
    /// Load the file named by `OUTPOST_CONFIG` (default `outpost.yaml`) if
    /// it exists, then apply env overrides. A missing file means defaults;
    /// a file that exists but does not parse is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("OUTPOST_CONFIG").unwrap_or_else(|_| "outpost.yaml".to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_yaml::from_str(&raw)
                .with_context(|| format!("failed to parse config file {path}"))?,
            Err(_) => Config::default(),
        };

        if let Ok(listen) = std::env::var("LISTEN") {
            config.server.listen_addr = listen;
        }

        Ok(config)
    }
}
