//! Project configuration
//!
//! Read once at startup and immutable afterwards.

pub mod project;

pub use project::ProjectConfig;
