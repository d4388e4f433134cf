use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::illustration::AssetRouting;

/// Deployment configuration for one pipeline instance (TOML).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PipelineConfig {
    pub scaler_path: PathBuf,
    pub classifier_path: PathBuf,
    pub asset_root: PathBuf,
    pub asset_routing: AssetRouting,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scaler_path: PathBuf::from("models/scaler.json"),
            classifier_path: PathBuf::from("models/classifier.json"),
            asset_root: PathBuf::from("assets/gallery"),
            asset_routing: AssetRouting::PerClass,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn load_reads_kebab_case_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stellar.toml");
        fs::write(
            &path,
            r#"
scaler-path = "artifacts/s.json"
classifier-path = "artifacts/c.json"
asset-root = "gallery"
asset-routing = "shared"
"#,
        )
        .unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.scaler_path, PathBuf::from("artifacts/s.json"));
        assert_eq!(config.classifier_path, PathBuf::from("artifacts/c.json"));
        assert_eq!(config.asset_root, PathBuf::from("gallery"));
        assert_eq!(config.asset_routing, AssetRouting::Shared);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stellar.toml");
        fs::write(&path, "asset-root = \"elsewhere\"\n").unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.asset_root, PathBuf::from("elsewhere"));
        assert_eq!(config.scaler_path, PipelineConfig::default().scaler_path);
        assert_eq!(config.asset_routing, AssetRouting::PerClass);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stellar.toml");
        fs::write(&path, "asset-routing = \"round-robin\"\n").unwrap();
        let err = PipelineConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let err = PipelineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }
}
