//! Blueprints: named generator units and their lifecycle
//!
//! A blueprint declares its parameters, an availability predicate, a prepare
//! step that validates options, a change generator and a post-apply hook.
//! [`BlueprintRun`] drives one instance through its lifecycle and memoizes the
//! generated [`ChangeCluster`](crate::change::ChangeCluster).

pub mod command;
pub mod lifecycle;
pub mod parameter;

use crate::change::{Change, Host};
use crate::error::BlueprintError;
use crate::templates::render::{FileTemplate, Replacements};
use anyhow::Context;
use async_trait::async_trait;
use std::path::Path;

pub use command::{execute_command, CommandOutput};
pub use lifecycle::{BlueprintRun, LifecycleState};
pub use parameter::{missing_required, OptionValue, Options, Parameter, ParameterKind, Question};

/// A named generator unit producing changes against a project
#[async_trait]
pub trait Blueprint: Send + Sync {
    /// Unique name within a discovery session; also the CLI subcommand
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Declared inputs
    fn parameters(&self) -> &[Parameter];

    /// Whether this blueprint can be used in the current project
    ///
    /// Evaluated once for every blueprint at startup, so it must be a quick
    /// check without heavy I/O.
    async fn availability(&self) -> bool {
        true
    }

    /// Validate and normalize options before any change is generated
    async fn prepare(&mut self, options: &Options, host: &dyn Host) -> Result<(), BlueprintError>;

    /// Compute the changes for the prepared state
    ///
    /// Called exactly once per run, through [`BlueprintRun::cluster`].
    async fn generate_changes(&self, host: &dyn Host) -> Result<Vec<Change>, BlueprintError>;

    /// Executed after all changes were applied successfully
    async fn post_apply(&self) -> Result<(), BlueprintError> {
        Ok(())
    }
}

/// Create a single new file with `content`
///
/// Fails with a user error when the file already exists.
pub async fn create_file(
    host: &dyn Host,
    path: impl AsRef<Path>,
    content: impl Into<String>,
) -> Result<Change, BlueprintError> {
    let path = path.as_ref();
    if host.exists(path).await {
        return Err(BlueprintError::user(format!(
            "Expected file {} to not exist",
            path.display()
        )));
    }
    Ok(Change::insert(path, 0, content))
}

/// Create several files from templates stored in `dir`
///
/// Each pair maps a template path relative to `dir` to a destination path.
/// Placeholders are substituted in both the destination path and the content.
pub async fn files_from_templates(
    host: &dyn Host,
    dir: &Path,
    translations: &[(&str, &str)],
    replacements: &Replacements,
) -> Result<Vec<Change>, BlueprintError> {
    let mut changes = Vec::with_capacity(translations.len());
    for (src, dest) in translations {
        let template_path = dir.join(src);
        let template = FileTemplate::load(&template_path)
            .await
            .with_context(|| format!("Failed to load template {}", template_path.display()))?;
        let dest = replacements.apply(dest);
        changes.push(create_file(host, dest, template.render(replacements)).await?);
    }
    Ok(changes)
}
