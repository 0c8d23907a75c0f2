//! Template rendering and locally declared blueprints
//!
//! This module provides:
//! - Placeholder substitution for template files (`Replacements`, `FileTemplate`)
//! - The local blueprint manifest (`blueprint.yaml`) and its blueprint
//! - Version compatibility checking between the CLI and local blueprints

pub mod local;
pub mod manifest;
pub mod render;
pub mod version;

pub use local::ManifestBlueprint;
pub use manifest::{BlueprintManifest, TemplateFile, MANIFEST_FILE};
pub use render::{FileTemplate, Replacements};
pub use version::check_compatibility;
