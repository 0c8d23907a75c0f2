//! `initialize`: project configuration and an example local blueprint

use crate::{CLI_VERSION, CONFIG_FILENAME};
use async_trait::async_trait;
use blueprint_core::{
    create_file, Blueprint, BlueprintError, Change, FileTemplate, Host, Options, Parameter,
    ProjectConfig, Replacements,
};
use std::path::{Path, PathBuf};

const EXAMPLE_MANIFEST: &str = include_str!("../../templates/initialize/blueprint.yaml.txt");
const EXAMPLE_MODULE: &str = include_str!("../../templates/initialize/module.rs.txt");

pub struct InitializeBlueprint {
    parameters: Vec<Parameter>,
    blueprints_dir: PathBuf,
}

impl InitializeBlueprint {
    pub fn boxed() -> Box<dyn Blueprint> {
        Box::new(Self {
            parameters: vec![Parameter::string(
                "blueprints-dir",
                "Directory for project blueprints",
            )
            .with_default("blueprints")],
            blueprints_dir: PathBuf::new(),
        })
    }
}

#[async_trait]
impl Blueprint for InitializeBlueprint {
    fn name(&self) -> &str {
        "initialize"
    }

    fn description(&self) -> &str {
        "Installs boilerplate files"
    }

    fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    async fn availability(&self) -> bool {
        !tokio::fs::try_exists(CONFIG_FILENAME).await.unwrap_or(false)
    }

    async fn prepare(&mut self, options: &Options, host: &dyn Host) -> Result<(), BlueprintError> {
        let dir = options
            .get("blueprints-dir")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if dir.is_empty() {
            return Err(BlueprintError::validation("--blueprints-dir must not be empty"));
        }
        if host.exists(Path::new(CONFIG_FILENAME)).await {
            return Err(BlueprintError::validation("This project is already initialized"));
        }
        self.blueprints_dir = PathBuf::from(dir);
        Ok(())
    }

    async fn generate_changes(&self, host: &dyn Host) -> Result<Vec<Change>, BlueprintError> {
        let yaml = ProjectConfig::with_blueprints_dir(&self.blueprints_dir)
            .to_yaml()
            .map_err(|e| BlueprintError::Other(e.into()))?;

        let mut replacements = Replacements::new();
        replacements.insert("__cli_version__", CLI_VERSION);
        let example = self.blueprints_dir.join("example");

        Ok(vec![
            create_file(host, CONFIG_FILENAME, yaml).await?,
            create_file(
                host,
                example.join("blueprint.yaml"),
                FileTemplate::new(EXAMPLE_MANIFEST).render(&replacements),
            )
            .await?,
            create_file(host, example.join("module.rs.txt"), EXAMPLE_MODULE).await?,
        ])
    }
}
