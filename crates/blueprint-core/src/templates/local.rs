//! Blueprints declared by a project in YAML instead of code

use super::manifest::{BlueprintManifest, MANIFEST_FILE};
use super::render::Replacements;
use crate::blueprint::{
    execute_command, files_from_templates, Blueprint, Options, Parameter, ParameterKind,
};
use crate::change::{Change, Host};
use crate::error::{BlueprintError, DiscoveryError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout for each post-apply command
const POST_APPLY_TIMEOUT: Duration = Duration::from_secs(120);

/// A blueprint rendering the template files listed in its manifest
///
/// Every option is exposed to templates and destination paths as
/// `__<parameter name>__`.
#[derive(Debug)]
pub struct ManifestBlueprint {
    dir: PathBuf,
    manifest: BlueprintManifest,
    replacements: Replacements,
}

impl ManifestBlueprint {
    /// Load and validate `<dir>/blueprint.yaml`
    pub fn load(dir: &Path) -> Result<Self, DiscoveryError> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let invalid = |reason: String| DiscoveryError::InvalidBlueprint {
            path: manifest_path.clone(),
            reason,
        };

        let content = std::fs::read_to_string(&manifest_path).map_err(|e| invalid(e.to_string()))?;
        let manifest = BlueprintManifest::parse(&content).map_err(|e| invalid(e.to_string()))?;
        manifest.validate(dir).map_err(invalid)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            replacements: Replacements::new(),
        })
    }

    pub fn manifest(&self) -> &BlueprintManifest {
        &self.manifest
    }

    fn destinations(&self) -> Vec<PathBuf> {
        self.manifest
            .files
            .iter()
            .map(|file| PathBuf::from(self.replacements.apply(file.destination())))
            .collect()
    }
}

#[async_trait]
impl Blueprint for ManifestBlueprint {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn description(&self) -> &str {
        &self.manifest.description
    }

    fn parameters(&self) -> &[Parameter] {
        &self.manifest.parameters
    }

    async fn availability(&self) -> bool {
        for required in &self.manifest.requires {
            if !tokio::fs::try_exists(required).await.unwrap_or(false) {
                return false;
            }
        }
        true
    }

    async fn prepare(&mut self, options: &Options, host: &dyn Host) -> Result<(), BlueprintError> {
        let mut replacements = Replacements::new();
        for parameter in &self.manifest.parameters {
            let Some(value) = options.get(&parameter.name) else {
                continue;
            };
            let text = value.to_string();
            if parameter.require && parameter.kind == ParameterKind::String && text.trim().is_empty() {
                return Err(BlueprintError::validation(format!(
                    "--{} must not be empty",
                    parameter.name
                )));
            }
            replacements.insert(format!("__{}__", parameter.name), text);
        }
        self.replacements = replacements;

        for dest in self.destinations() {
            if host.exists(&dest).await {
                return Err(BlueprintError::validation(format!(
                    "{} already exists",
                    dest.display()
                )));
            }
        }
        Ok(())
    }

    async fn generate_changes(&self, host: &dyn Host) -> Result<Vec<Change>, BlueprintError> {
        let translations: Vec<(&str, &str)> = self
            .manifest
            .files
            .iter()
            .map(|file| (file.template.as_str(), file.destination()))
            .collect();
        files_from_templates(host, &self.dir, &translations, &self.replacements).await
    }

    async fn post_apply(&self) -> Result<(), BlueprintError> {
        for cmd in &self.manifest.post_apply {
            execute_command(Path::new("."), cmd, Some(POST_APPLY_TIMEOUT)).await?;
        }
        Ok(())
    }
}
