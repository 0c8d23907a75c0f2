//! Project configuration file (e.g. `.blueprint.yaml`)

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Settings a project can declare for the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Directory holding local blueprints, relative to the config file
    #[serde(default)]
    pub blueprints_dir: Option<PathBuf>,

    /// Directory the config was loaded from
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ProjectConfig {
    /// Configuration pointing at a local blueprints directory
    pub fn with_blueprints_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            blueprints_dir: Some(dir.into()),
            base_dir: PathBuf::new(),
        }
    }

    /// Load the configuration at `path`; a missing or empty file yields defaults
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    base_dir,
                    ..Self::default()
                })
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Self>(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        config.base_dir = base_dir;
        Ok(config)
    }

    /// Resolved local blueprints directory, if configured
    pub fn blueprints_dir(&self) -> Option<PathBuf> {
        self.blueprints_dir
            .as_ref()
            .map(|dir| self.base_dir.join(dir))
    }

    /// Serialized form, as written by the `initialize` blueprint
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(dir.path().join(".blueprint.yaml"))
            .await
            .unwrap();

        assert_eq!(config.blueprints_dir(), None);
    }

    #[tokio::test]
    async fn test_blueprints_dir_is_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".blueprint.yaml");
        std::fs::write(&path, "blueprints_dir: tools/blueprints\n").unwrap();

        let config = ProjectConfig::load(&path).await.unwrap();

        assert_eq!(
            config.blueprints_dir(),
            Some(dir.path().join("tools/blueprints"))
        );
    }

    #[tokio::test]
    async fn test_empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".blueprint.yaml");
        std::fs::write(&path, "\n").unwrap();

        assert_eq!(ProjectConfig::load(&path).await.unwrap().blueprints_dir(), None);
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".blueprint.yaml");
        std::fs::write(&path, "blueprints_dir: [a, b\n").unwrap();

        let err = ProjectConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_to_yaml_round_trips_dir() {
        let config = ProjectConfig::with_blueprints_dir("blueprints");
        assert_eq!(config.to_yaml().unwrap().trim(), "blueprints_dir: blueprints");
    }
}
