//! Configuration for lingo.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration.
///
/// Read from the environment in the server binary; paths default to a
/// `.lingo` directory under the user's home.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Bind host for the REST API.
    pub host: String,
    /// Bind port for the REST API.
    pub port: u16,
    /// Directory holding the SQLite databases.
    pub data_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lingo");
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir,
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back
    /// to defaults: `LINGO_HOST`, `LINGO_PORT`, `LINGO_DATA_DIR`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("LINGO_HOST").unwrap_or(defaults.host);
        let port = std::env::var("LINGO_PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.port);
        let data_dir = std::env::var("LINGO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        Self {
            host,
            port,
            data_dir,
        }
    }

    /// Path of the vocabulary database.
    pub fn vocabulary_db_path(&self) -> PathBuf {
        self.data_dir.join("vocabulary.db")
    }

    /// Path of the tests database.
    pub fn tests_db_path(&self) -> PathBuf {
        self.data_dir.join("tests.db")
    }

    /// Path of the reading database.
    pub fn reading_db_path(&self) -> PathBuf {
        self.data_dir.join("reading.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = AppConfig::default();
        assert!(config.vocabulary_db_path().ends_with("vocabulary.db"));
        assert!(config.tests_db_path().starts_with(&config.data_dir));
        assert_eq!(config.port, 8080);
    }
}
