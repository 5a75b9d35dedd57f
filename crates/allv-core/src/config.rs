use crate::error::{AllvError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub seed: SeedConfig,
    pub charts: ChartConfig,
}

impl AppConfig {
    /// Load configuration from default path (~/.config/allv/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| AllvError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents =
            toml::to_string_pretty(self).map_err(|e| AllvError::Config(e.to_string()))?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("allv")
            .join("config.toml")
    }

    /// Data directory for the directory snapshot.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("allv")
    }

    /// Snapshot file, resolved against the data directory when unset.
    pub fn data_file(&self) -> PathBuf {
        self.storage
            .data_file
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("directory.json"))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Bearer token for authentication (None = no auth).
    pub auth_token: Option<String>,
    /// Enable CORS.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            auth_token: None,
            cors: true,
        }
    }
}

/// Snapshot persistence for users and posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot file.
    pub data_file: Option<PathBuf>,
    /// Write the snapshot after every mutation.
    pub auto_save: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: None, // resolved at runtime to data_dir/directory.json
            auto_save: true,
        }
    }
}

/// Demo data generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub seed: u64,
    /// How many of the built-in demo names to create (at most 10).
    pub users: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { seed: 42, users: 10 }
    }
}

/// Chart payload tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Upper bound on x-axis tick labels.
    pub max_ticks: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { max_ticks: 8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("127.0.0.1"));
        assert!(toml_str.contains("max_ticks = 8"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.seed.seed, config.seed.seed);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "127.0.0.1");
        assert!(parsed.storage.auto_save);
        assert_eq!(parsed.seed.users, 10);
    }

    #[test]
    fn test_load_from_rejects_invalid_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, AllvError::Config(ref msg) if msg.contains("config.toml")));
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load_from(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, AllvError::Io(_)));
    }

    #[test]
    fn test_data_file_override() {
        let mut config = AppConfig::default();
        assert!(config.data_file().ends_with("directory.json"));

        config.storage.data_file = Some(PathBuf::from("/tmp/allv.json"));
        assert_eq!(config.data_file(), PathBuf::from("/tmp/allv.json"));
    }
}
