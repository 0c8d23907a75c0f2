//! Blueprint Core - Shared library for blueprint-driven code generation CLIs
//!
//! A blueprint is a named generator that turns a few options into text edits
//! against a project. The edits are previewed as a plan (and per-file diffs)
//! before anything is written.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Changes** - `Change` values, the `Host` they are applied through,
//!   and `ChangeCluster` ordering
//! - **Layer 2: Blueprints** - the `Blueprint` trait, its lifecycle, discovery of
//!   built-in and local blueprints, and the `BlueprintExecutor`
//! - **Layer 3: CLI/TUI Interface** - the runtime-built clap command and optional
//!   cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use blueprint_core::{BlueprintExecutor, Discovery, FsHost, ProjectConfig, Unattended};
//!
//! let project = ProjectConfig::load(".blueprint.yaml").await?;
//! let discovery = Discovery::discover(&MyConfig, &project).await?;
//! let entry = discovery.into_blueprint("feature")?;
//!
//! let host = FsHost::new();
//! let mut interaction = Unattended;
//! let outcome = BlueprintExecutor::new(entry, &host, &mut interaction)
//!     .execute(options)
//!     .await?;
//! ```

pub mod blueprint;
pub mod change;
pub mod cli;
pub mod config;
pub mod diff;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod product;
pub mod summary;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use blueprint::{
    create_file, execute_command, files_from_templates, Blueprint, BlueprintRun, LifecycleState,
    OptionValue, Options, Parameter, ParameterKind, Question,
};
pub use change::{Change, ChangeCluster, ChangeKind, FsHost, Host, MemoryHost, ShadowHost};
pub use cli::Invocation;
pub use config::ProjectConfig;
pub use diff::FileDiff;
pub use discovery::{BlueprintMetadata, BlueprintTag, DiscoveredBlueprint, Discovery};
pub use error::{BlueprintError, ChangeError, ConfigError, DiscoveryError};
pub use executor::{BlueprintExecutor, Decision, ExecutionOutcome, Interaction, Unattended};
pub use product::{BlueprintFactory, ProductConfig};
pub use summary::BlueprintSummary;
pub use templates::{FileTemplate, Replacements};

#[cfg(feature = "tui")]
pub use tui::run;

/// Version of this library, shown next to the CLI version
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
