//! Command line built from the discovered blueprints
//!
//! Every blueprint becomes a subcommand and every parameter a flag. The
//! command is assembled at runtime, so it uses clap's builder API.

use crate::blueprint::{OptionValue, Options, Parameter, ParameterKind};
use crate::discovery::{DiscoveredBlueprint, Discovery};
use crate::product::ProductConfig;
use crate::CORE_VERSION;
use clap::builder::PossibleValuesParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;

/// Global flags; parameters may not use these names
pub const RESERVED_OPTIONS: &[&str] = &["yes", "dry-run", "verbose", "help", "version"];

/// Subcommands clap adds itself; blueprints may not use these names
pub const RESERVED_COMMANDS: &[&str] = &["help"];

/// Whether `name` can be used as a subcommand or long flag
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// What the user asked for on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Selected blueprint; `None` when no subcommand was given
    pub blueprint: Option<String>,
    pub options: Options,
    /// Apply without asking
    pub yes: bool,
    /// Show the diffs, write nothing
    pub dry_run: bool,
    pub verbose: bool,
}

/// Build the full command for `discovery`
pub fn build_command<C: ProductConfig>(config: &C, discovery: &Discovery) -> Command {
    let mut command = Command::new(config.name())
        .about(config.cli_description())
        .version(format!("{} (core {})", config.cli_version(), CORE_VERSION))
        .arg(
            Arg::new("yes")
                .long("yes")
                .short('y')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Apply changes without asking for confirmation"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show the changes without writing anything"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print debug diagnostics"),
        );

    for entry in discovery.blueprints() {
        command = command.subcommand(blueprint_command(entry));
    }
    command
}

fn blueprint_command(entry: &DiscoveredBlueprint) -> Command {
    let about = match entry.metadata.tag {
        Some(tag) => format!("[{}] {}", tag, entry.blueprint.description()),
        None => entry.blueprint.description().to_string(),
    };

    entry
        .blueprint
        .parameters()
        .iter()
        .fold(Command::new(entry.name().to_string()).about(about), |cmd, p| {
            cmd.arg(parameter_arg(p))
        })
}

fn parameter_arg(parameter: &Parameter) -> Arg {
    let arg = Arg::new(parameter.name.clone())
        .long(parameter.name.clone())
        .help(parameter.description.clone())
        .required(parameter.flag_only_required());

    match &parameter.kind {
        // `--flag` alone means true; `--flag=false` overrides a true default
        ParameterKind::Boolean => arg
            .action(ArgAction::Set)
            .num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
            .value_parser(clap::value_parser!(bool)),
        ParameterKind::Enum { choices } => arg
            .action(ArgAction::Set)
            .value_name(parameter.name.clone())
            .value_parser(PossibleValuesParser::new(choices.clone())),
        ParameterKind::String | ParameterKind::File | ParameterKind::Dir => arg
            .action(ArgAction::Set)
            .value_name(parameter.name.clone()),
    }
}

/// Parse `args` (including the binary name) against the discovered blueprints
pub fn parse<C, I, T>(config: &C, discovery: &Discovery, args: I) -> Result<Invocation, clap::Error>
where
    C: ProductConfig,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command(config, discovery).try_get_matches_from(args)?;
    Ok(invocation_from_matches(discovery, &matches))
}

fn invocation_from_matches(discovery: &Discovery, matches: &ArgMatches) -> Invocation {
    let mut invocation = Invocation {
        yes: matches.get_flag("yes"),
        dry_run: matches.get_flag("dry-run"),
        verbose: matches.get_flag("verbose"),
        ..Invocation::default()
    };

    if let Some((name, sub)) = matches.subcommand() {
        invocation.yes |= sub.get_flag("yes");
        invocation.dry_run |= sub.get_flag("dry-run");
        invocation.verbose |= sub.get_flag("verbose");
        if let Some(entry) = discovery.get_blueprint(name) {
            invocation.options = options_from_matches(entry.blueprint.parameters(), sub);
        }
        invocation.blueprint = Some(name.to_string());
    }
    invocation
}

/// Options given explicitly on the command line
///
/// Boolean flags only count when present, so an absent flag can still be
/// asked for or defaulted.
pub fn options_from_matches(parameters: &[Parameter], matches: &ArgMatches) -> Options {
    let mut options = Options::new();
    for parameter in parameters {
        let value = match parameter.kind {
            ParameterKind::Boolean => {
                if matches.value_source(&parameter.name) != Some(ValueSource::CommandLine) {
                    continue;
                }
                match matches.get_one::<bool>(&parameter.name) {
                    Some(value) => OptionValue::Bool(*value),
                    None => continue,
                }
            }
            _ => match matches.get_one::<String>(&parameter.name) {
                Some(value) => OptionValue::Str(value.clone()),
                None => continue,
            },
        };
        options.insert(parameter.name.clone(), value);
    }
    options
}
