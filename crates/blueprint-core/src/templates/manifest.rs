//! Local blueprint manifest types and parsing

use crate::blueprint::{Parameter, ParameterKind};
use crate::cli::{is_valid_name, RESERVED_COMMANDS, RESERVED_OPTIONS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// File name of a local blueprint manifest inside its directory
pub const MANIFEST_FILE: &str = "blueprint.yaml";

/// A template file rendered into the project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateFile {
    /// Template path relative to the blueprint directory
    pub template: String,

    /// Destination path in the project (defaults to the template path).
    /// Placeholders are substituted.
    #[serde(default)]
    pub dest: Option<String>,
}

impl TemplateFile {
    /// Get the destination path (falls back to template if dest not specified)
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.template)
    }
}

/// Per-blueprint manifest (<blueprints_dir>/<name>/blueprint.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintManifest {
    /// Blueprint name, used as the CLI subcommand
    pub name: String,

    /// Description shown in help and selection lists
    pub description: String,

    /// Semver version of the CLI this blueprint was written for
    #[serde(default)]
    pub version: Option<String>,

    /// Declared inputs; every value is available as `__<name>__` in templates
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Project paths that must exist for the blueprint to be offered
    #[serde(default)]
    pub requires: Vec<String>,

    /// Files to create
    pub files: Vec<TemplateFile>,

    /// Shell commands run in the project root after the files are written
    #[serde(default)]
    pub post_apply: Vec<String>,
}

impl BlueprintManifest {
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Check the manifest against the directory it was loaded from
    pub fn validate(&self, dir: &Path) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(format!("name '{}' must not contain whitespace", self.name));
        }
        if !is_valid_name(&self.name) {
            return Err(format!("name '{}' is not a valid command name", self.name));
        }
        if RESERVED_COMMANDS.contains(&self.name.as_str()) {
            return Err(format!("name '{}' is reserved", self.name));
        }
        if self.files.is_empty() {
            return Err("at least one file must be listed".to_string());
        }

        let mut seen = HashSet::new();
        for parameter in &self.parameters {
            if !is_valid_name(&parameter.name) {
                return Err(format!("parameter name '{}' is not a valid flag", parameter.name));
            }
            if RESERVED_OPTIONS.contains(&parameter.name.as_str()) {
                return Err(format!("parameter name '{}' is reserved", parameter.name));
            }
            if !seen.insert(parameter.name.as_str()) {
                return Err(format!("parameter '{}' is declared twice", parameter.name));
            }
            if let ParameterKind::Enum { choices } = &parameter.kind {
                if choices.is_empty() {
                    return Err(format!("enum parameter '{}' has no choices", parameter.name));
                }
            }
        }

        for file in &self.files {
            if !dir.join(&file.template).is_file() {
                return Err(format!("template file '{}' not found", file.template));
            }
        }

        Ok(())
    }
}
