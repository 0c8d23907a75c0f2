//! Blueprint registry
//!
//! Built-in blueprints come from the product's factories; local ones from
//! `<blueprints_dir>/<name>/blueprint.yaml` manifests. Every blueprint is
//! instantiated once and its availability evaluated once, here.

use crate::blueprint::Blueprint;
use crate::config::ProjectConfig;
use crate::error::DiscoveryError;
use crate::product::ProductConfig;
use crate::templates::{check_compatibility, ManifestBlueprint, MANIFEST_FILE};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use walkdir::WalkDir;

/// Where a blueprint came from, when it is not built in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlueprintTag {
    Local,
}

impl fmt::Display for BlueprintTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlueprintTag::Local => f.write_str("local"),
        }
    }
}

/// Facts recorded about a blueprint at discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlueprintMetadata {
    pub tag: Option<BlueprintTag>,
    /// Cached result of [`Blueprint::availability`]
    pub is_active: bool,
}

/// A registered blueprint together with its metadata
pub struct DiscoveredBlueprint {
    pub blueprint: Box<dyn Blueprint>,
    pub metadata: BlueprintMetadata,
}

impl DiscoveredBlueprint {
    pub fn name(&self) -> &str {
        self.blueprint.name()
    }

    pub fn into_parts(self) -> (Box<dyn Blueprint>, BlueprintMetadata) {
        (self.blueprint, self.metadata)
    }
}

impl fmt::Debug for DiscoveredBlueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveredBlueprint")
            .field("name", &self.blueprint.name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// All blueprints available to one CLI invocation
#[derive(Debug, Default)]
pub struct Discovery {
    entries: Vec<DiscoveredBlueprint>,
    warnings: Vec<String>,
}

impl Discovery {
    /// Instantiate the product's built-ins and load the project's local blueprints
    pub async fn discover<C: ProductConfig>(
        config: &C,
        project: &ProjectConfig,
    ) -> Result<Self, DiscoveryError> {
        let builtin = config
            .builtin_blueprints()
            .into_iter()
            .map(|factory| factory())
            .collect();

        let (local, warnings) = match project.blueprints_dir() {
            Some(dir) => load_local_blueprints(&dir, config.cli_version())?,
            None => (Vec::new(), Vec::new()),
        };

        let mut discovery = Self::from_blueprints(builtin, local).await;
        discovery.warnings.splice(0..0, warnings);
        Ok(discovery)
    }

    /// Register blueprints, evaluating each one's availability once
    ///
    /// Names must be unique: a later blueprint with an already registered name
    /// is dropped with a warning.
    pub async fn from_blueprints(
        builtin: Vec<Box<dyn Blueprint>>,
        local: Vec<Box<dyn Blueprint>>,
    ) -> Self {
        let tagged = builtin
            .into_iter()
            .map(|b| (b, None))
            .chain(local.into_iter().map(|b| (b, Some(BlueprintTag::Local))));

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let mut warnings = Vec::new();
        for (blueprint, tag) in tagged {
            if !seen.insert(blueprint.name().to_string()) {
                warnings.push(format!(
                    "Ignoring duplicate blueprint '{}'",
                    blueprint.name()
                ));
                continue;
            }
            let is_active = blueprint.availability().await;
            tracing::debug!(blueprint = blueprint.name(), ?tag, is_active, "discovered blueprint");
            entries.push(DiscoveredBlueprint {
                blueprint,
                metadata: BlueprintMetadata { tag, is_active },
            });
        }

        Self { entries, warnings }
    }

    /// Registered blueprints, built-ins first
    pub fn blueprints(&self) -> impl Iterator<Item = &DiscoveredBlueprint> {
        self.entries.iter()
    }

    /// Blueprints whose availability check passed
    pub fn active(&self) -> impl Iterator<Item = &DiscoveredBlueprint> {
        self.entries.iter().filter(|e| e.metadata.is_active)
    }

    pub fn get_blueprint(&self, name: &str) -> Option<&DiscoveredBlueprint> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn ensure_blueprint(&self, name: &str) -> Result<&DiscoveredBlueprint, DiscoveryError> {
        self.get_blueprint(name)
            .ok_or_else(|| DiscoveryError::UnknownBlueprint(name.to_string()))
    }

    pub fn metadata(&self, name: &str) -> Result<&BlueprintMetadata, DiscoveryError> {
        self.ensure_blueprint(name).map(|e| &e.metadata)
    }

    /// Take a blueprint out of the registry to execute it
    pub fn into_blueprint(mut self, name: &str) -> Result<DiscoveredBlueprint, DiscoveryError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.name() == name)
            .ok_or_else(|| DiscoveryError::UnknownBlueprint(name.to_string()))?;
        Ok(self.entries.swap_remove(index))
    }

    /// Non-fatal problems found while loading
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Load every `<dir>/<name>/blueprint.yaml`, sorted by directory name
///
/// Returns the blueprints and version compatibility warnings. A missing
/// directory yields nothing but a warning; an invalid manifest is fatal.
pub fn load_local_blueprints(
    dir: &Path,
    cli_version: &str,
) -> Result<(Vec<Box<dyn Blueprint>>, Vec<String>), DiscoveryError> {
    let mut warnings = Vec::new();
    if !dir.is_dir() {
        warnings.push(format!(
            "Blueprints directory {} does not exist",
            dir.display()
        ));
        return Ok((Vec::new(), warnings));
    }

    let mut blueprints: Vec<Box<dyn Blueprint>> = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| DiscoveryError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
            continue;
        }
        let Some(blueprint_dir) = entry.path().parent() else {
            continue;
        };

        let blueprint = ManifestBlueprint::load(blueprint_dir)?;
        if let Some(version) = &blueprint.manifest().version {
            if let Some(warning) = check_compatibility(cli_version, blueprint.name(), version) {
                warnings.push(warning);
            }
        }
        blueprints.push(Box::new(blueprint));
    }

    Ok((blueprints, warnings))
}
