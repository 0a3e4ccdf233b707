//! Configuration file loading

use std::path::{Path, PathBuf};

use chainflow_core::NetworkConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};
use crate::server::ServerConfig;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger endpoint and contract addresses
    #[serde(default)]
    pub network: NetworkConfig,
}

impl AppConfig {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".chainflow"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from an explicit path, which must exist
    pub fn load_from(path: &Path) -> ServerResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ServerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from `path` when given, else from the default path if it exists,
    /// else defaults
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.network.fallback_gas_limit, 500_000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        let toml = r#"
            [server]
            listen_addr = "127.0.0.1:8080"
            enable_cors = false

            [network]
            rpc_url = "http://localhost:8545"
            chain_id = 1337
            airdrop = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        "#;
        file.write_all(toml.as_bytes()).unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert!(!config.server.enable_cors);
        assert_eq!(config.server.max_body_size, 1024 * 1024);
        assert_eq!(config.network.rpc_url, "http://localhost:8545");
        assert_eq!(config.network.chain_id, Some(1337));
        assert!(config.network.airdrop.is_some());
        assert!(config.network.nft_factory.is_none());
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(ServerError::Config(_))
        ));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[server\nlisten_addr = 1").unwrap();
        assert!(AppConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn test_config_serialize() {
        let toml = toml::to_string(&AppConfig::default()).unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[network]"));
        assert!(toml.contains("rpc_url"));
    }
}
