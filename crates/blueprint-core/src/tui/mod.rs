//! Terminal front end: cliclack prompts for the wizard, the plan confirmation
//! and diff previews.
//!
//! Only compiled with the `tui` feature.

#[cfg(feature = "tui")]
mod prompts;

#[cfg(feature = "tui")]
pub use prompts::{run, CliclackInteraction};
