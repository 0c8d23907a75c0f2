//! Charm-style CLI prompts using cliclack

use crate::blueprint::{OptionValue, Options, ParameterKind, Question};
use crate::change::FsHost;
use crate::cli::Invocation;
use crate::diff::FileDiff;
use crate::discovery::Discovery;
use crate::error::BlueprintError;
use crate::executor::{BlueprintExecutor, Decision, ExecutionOutcome, Interaction, Unattended};
use crate::product::ProductConfig;
use crate::summary::BlueprintSummary;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Interactive prompts on the terminal
#[derive(Debug, Default)]
pub struct CliclackInteraction;

impl CliclackInteraction {
    fn ask_one(question: &Question) -> std::io::Result<OptionValue> {
        let parameter = &question.parameter;
        let prompt = if parameter.description.is_empty() {
            parameter.name.clone()
        } else {
            parameter.description.clone()
        };

        match &parameter.kind {
            ParameterKind::Boolean => {
                let initial = question
                    .default
                    .as_ref()
                    .and_then(OptionValue::as_bool)
                    .unwrap_or(false);
                let value: bool = cliclack::confirm(prompt).initial_value(initial).interact()?;
                Ok(OptionValue::Bool(value))
            }
            ParameterKind::Enum { choices } => {
                let mut select = cliclack::select(prompt);
                for choice in choices {
                    select = select.item(choice.clone(), choice, "");
                }
                if let Some(default) = question.default.as_ref().and_then(OptionValue::as_str) {
                    select = select.initial_value(default.to_string());
                }
                let value: String = select.interact()?;
                Ok(OptionValue::Str(value))
            }
            kind => {
                let kind = kind.clone();
                let required = parameter.require;
                let mut input = cliclack::input(prompt).required(required);
                if let Some(default) = question.default.as_ref().and_then(OptionValue::as_str) {
                    input = input.default_input(default);
                }
                let value: String = input
                    .validate(move |value: &String| validate_path(&kind, value))
                    .interact()?;
                Ok(OptionValue::Str(value))
            }
        }
    }
}

fn validate_path(kind: &ParameterKind, value: &str) -> Result<(), &'static str> {
    if value.is_empty() {
        return Ok(());
    }
    match kind {
        ParameterKind::File if !Path::new(value).is_file() => Err("File does not exist"),
        ParameterKind::Dir if !Path::new(value).is_dir() => Err("Directory does not exist"),
        _ => Ok(()),
    }
}

#[async_trait]
impl Interaction for CliclackInteraction {
    async fn ask(&mut self, questions: &[Question]) -> Result<Options, BlueprintError> {
        let mut options = Options::new();
        for question in questions {
            let value = Self::ask_one(question)?;
            if value.as_str() == Some("") {
                continue;
            }
            options.insert(question.parameter.name.clone(), value);
        }
        Ok(options)
    }

    async fn confirm(&mut self, summary: &BlueprintSummary) -> Result<Decision, BlueprintError> {
        cliclack::note("Plan of operation:", summary.render(true))?;

        let action: &str = cliclack::select("Apply changes?")
            .item("apply", "Apply", "")
            .item("cancel", "Abort", "")
            .item("show", "Show diff", "")
            .interact()?;

        match action {
            "apply" => Ok(Decision::Apply),
            "show" => {
                let mut select = cliclack::select("Select file");
                for path in summary.files() {
                    select = select.item(path.to_path_buf(), path.display(), "");
                }
                let path: PathBuf = select.interact()?;
                Ok(Decision::Show(path))
            }
            _ => Ok(Decision::Cancel),
        }
    }

    async fn show_diff(&mut self, diff: &FileDiff) -> Result<(), BlueprintError> {
        cliclack::log::info(diff.path.display())?;
        eprintln!();
        eprintln!("{}", diff.render(true));
        eprintln!();
        Ok(())
    }

    fn info(&mut self, message: &str) -> Result<(), BlueprintError> {
        cliclack::log::info(message)?;
        Ok(())
    }

    fn success(&mut self, message: &str) -> Result<(), BlueprintError> {
        cliclack::log::success(message)?;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<(), BlueprintError> {
        cliclack::log::error(message)?;
        Ok(())
    }
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(
    config: &C,
    discovery: Discovery,
    invocation: Invocation,
) -> Result<ExecutionOutcome> {
    cliclack::intro(config.display_name())?;

    for warning in discovery.warnings() {
        cliclack::log::warning(format!("Warning: {}", warning))?;
    }

    let name = match invocation.blueprint {
        Some(name) => name,
        None => select_blueprint(&discovery)?,
    };
    let entry = discovery.into_blueprint(&name)?;

    let host = FsHost::new();
    let mut interaction: Box<dyn Interaction> = if invocation.yes {
        Box::new(Unattended)
    } else {
        Box::new(CliclackInteraction)
    };

    let outcome = BlueprintExecutor::new(entry, &host, interaction.as_mut())
        .dry_run(invocation.dry_run)
        .execute(invocation.options)
        .await?;

    match outcome {
        ExecutionOutcome::Applied => cliclack::outro("Happy coding!")?,
        ExecutionOutcome::Previewed => cliclack::outro("Nothing was written")?,
        ExecutionOutcome::Aborted | ExecutionOutcome::Rejected => {
            cliclack::outro_cancel("Nothing was changed")?
        }
    }

    Ok(outcome)
}

fn select_blueprint(discovery: &Discovery) -> Result<String> {
    let active: Vec<_> = discovery.active().collect();
    if active.is_empty() {
        anyhow::bail!("No blueprints are available in this project.");
    }

    let mut select = cliclack::select("Select a blueprint");
    for entry in active {
        let hint = match entry.metadata.tag {
            Some(tag) => format!("[{}] {}", tag, entry.blueprint.description()),
            None => entry.blueprint.description().to_string(),
        };
        select = select.item(entry.name().to_string(), entry.name(), hint);
    }

    Ok(select.interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, "").unwrap();
        let file = file.to_string_lossy().to_string();
        let dir = dir.path().to_string_lossy().to_string();

        assert!(validate_path(&ParameterKind::File, &file).is_ok());
        assert!(validate_path(&ParameterKind::File, &dir).is_err());
        assert!(validate_path(&ParameterKind::Dir, &dir).is_ok());
        assert!(validate_path(&ParameterKind::Dir, &file).is_err());
        assert!(validate_path(&ParameterKind::String, "anything").is_ok());
        assert!(validate_path(&ParameterKind::Dir, "").is_ok());
    }
}
