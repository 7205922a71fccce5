use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("couldn't read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Pending-connection queue length handed to `listen(2)`
    pub backlog: u32,
    /// Maximum number of connections served at once
    pub workers: usize,
    /// Per-read idle timeout in milliseconds; 0 disables it
    pub socket_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    pub document_root: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            backlog: 50,
            workers: 16,
            socket_timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.socket_timeout_ms > 0).then(|| Duration::from_millis(self.socket_timeout_ms))
    }
}

impl Config {
    /// Reads, overrides from the environment, and validates a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading configuration");

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(bytes = raw.len(), "read configuration file");

        let mut cfg = Self::from_yaml_str(&raw)?;
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// `LISTEN` replaces `server.listen_addr`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(listen_addr) = lookup("LISTEN") {
            self.server.listen_addr = listen_addr;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("server.listen_addr is empty".to_string()));
        }
        if self.server.workers == 0 {
            return Err(ConfigError::Invalid("server.workers must be at least 1".to_string()));
        }

        let root = Path::new(&self.static_files.document_root);
        if !root.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "static_files.document_root {} is not a directory",
                root.display()
            )));
        }
        Ok(())
    }
}
