//! blueprint CLI - Code generation from project blueprints

mod blueprints;

use anyhow::{Context, Result};
use blueprint_core::{BlueprintFactory, Discovery, ExecutionOutcome, ProductConfig, ProjectConfig};
use blueprints::{FeatureBlueprint, InitializeBlueprint};
use tracing_subscriber::EnvFilter;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Project configuration file, read from the working directory
pub const CONFIG_FILENAME: &str = ".blueprint.yaml";

/// blueprint product configuration
#[derive(Clone)]
pub struct ToolsConfig;

impl ProductConfig for ToolsConfig {
    fn name(&self) -> &'static str {
        "blueprint"
    }

    fn display_name(&self) -> &'static str {
        "blueprint"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for generating project code from blueprints"
    }

    fn cli_version(&self) -> &'static str {
        CLI_VERSION
    }

    fn config_filename(&self) -> &'static str {
        CONFIG_FILENAME
    }

    fn builtin_blueprints(&self) -> Vec<BlueprintFactory> {
        vec![InitializeBlueprint::boxed, FeatureBlueprint::boxed]
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let config = ToolsConfig;
    let project = ProjectConfig::load(config.config_filename())
        .await
        .context("Failed to load project configuration")?;
    let discovery = Discovery::discover(&config, &project).await?;

    // Subcommands and flags depend on the discovered blueprints
    let invocation = match blueprint_core::cli::parse(&config, &discovery, std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };
    init_tracing(invocation.verbose);

    let result = blueprint_core::run(&config, discovery, invocation).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    let outcome: ExecutionOutcome = result?;
    tracing::debug!(?outcome, "finished");
    Ok(())
}
