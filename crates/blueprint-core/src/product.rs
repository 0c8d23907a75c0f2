//! Product configuration trait for CLI binaries
//!
//! Each binary built on this library implements this trait to configure the
//! CLI identity and register its built-in blueprints. The value is created
//! once at startup and passed by reference to discovery, CLI and executor.

use crate::blueprint::Blueprint;

/// Constructor of a built-in blueprint
pub type BlueprintFactory = fn() -> Box<dyn Blueprint>;

/// Configuration trait for different CLI products
///
/// Each product implements this trait to define:
/// - Product identity (name, display name, version)
/// - The project configuration file it reads
/// - The blueprints it ships with
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for the CLI binary and help text)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Version of the product binary, checked against local blueprints
    fn cli_version(&self) -> &'static str;

    /// Project configuration file, relative to the working directory
    fn config_filename(&self) -> &'static str;

    /// Built-in blueprints, instantiated once at discovery
    fn builtin_blueprints(&self) -> Vec<BlueprintFactory>;
}
