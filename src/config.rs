//! Startup configuration.
//!
//! The store URI is a secret, so it is read from a JSON secrets file that is
//! kept out of version control:
//!
//! ```json
//! { "store": { "uri": "sqlite://taskmaster.db" }, "server": { "port": 8501 } }
//! ```
//!
//! The CLI flag and the `TASKMASTER_STORE_URI` environment variable both take
//! precedence over the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const APP_NAME: &str = "taskmaster";
const SECRETS_FILE: &str = "secrets.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Connection URI of the task store.
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl Config {
    /// Load the secrets file.
    ///
    /// An explicitly named file must exist. The default location is optional
    /// and yields an empty config when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_secrets_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// The store URI, preferring `overridden` (flag or environment) over the file.
    /// Startup cannot continue without one.
    pub fn store_uri(&self, overridden: Option<&str>) -> Result<String> {
        overridden
            .or(self.store.uri.as_deref())
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Config(
                    "no store URI; pass --store-uri, set TASKMASTER_STORE_URI or add store.uri to the secrets file"
                        .to_string(),
                )
            })
    }
}

pub fn default_secrets_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push(APP_NAME);
    path.push(SECRETS_FILE);
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_store_uri_and_server_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "store": {{ "uri": "sqlite://tasks.db" }} }}"#).unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.store.uri.as_deref(), Some("sqlite://tasks.db"));
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "store = 'toml'").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn override_wins_over_file() {
        let config = Config {
            store: StoreConfig {
                uri: Some("sqlite://file.db".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(
            config.store_uri(Some("sqlite::memory:")).unwrap(),
            "sqlite::memory:"
        );
        assert_eq!(config.store_uri(None).unwrap(), "sqlite://file.db");
    }

    #[test]
    fn missing_or_blank_uri_is_fatal() {
        assert!(Config::default().store_uri(None).is_err());
        assert!(Config::default().store_uri(Some("  ")).is_err());
    }
}
