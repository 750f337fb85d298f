//! Command line definition

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use envview_engine::ModeId;
use std::path::PathBuf;

/// What to do with the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print the model
    Show { file: PathBuf, json: bool },
    /// Set one key and save
    Set { file: PathBuf, key: String, value: String },
    /// Apply a mode and save
    Mode { file: PathBuf, mode: ModeId },
}

impl Action {
    /// File the action targets
    #[must_use]
    pub fn file(&self) -> &PathBuf {
        match self {
            Self::Show { file, .. } | Self::Set { file, .. } | Self::Mode { file, .. } => file,
        }
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config: Option<PathBuf>,
    pub legacy_overwritten: bool,
    pub log_json: bool,
    pub action: Action,
}

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Annotated env file")
}

/// Build the `envview` command
#[must_use]
pub fn command() -> Command {
    Command::new("envview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect annotated env files and switch between modes")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Session configuration file (TOML)"),
        )
        .arg(
            Arg::new("legacy-overwritten")
                .long("legacy-overwritten")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Honor the deprecated @env-overwritten block"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(
            Command::new("show")
                .about("Print template, modes, value constraints and diagnostics")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Set one key and write the file")
                .arg(file_arg())
                .arg(Arg::new("key").required(true).help("Template key"))
                .arg(Arg::new("value").required(true).allow_hyphen_values(true).help("New value")),
        )
        .subcommand(
            Command::new("mode")
                .about("Apply a mode's overrides and write the file")
                .arg(file_arg())
                .arg(
                    Arg::new("mode")
                        .required(true)
                        .value_parser(value_parser!(ModeId))
                        .help("Mode as <scope>.<mode>"),
                ),
        )
}

fn required<T: Clone + Send + Sync + 'static>(args: &ArgMatches, id: &str) -> anyhow::Result<T> {
    args.get_one::<T>(id)
        .cloned()
        .with_context(|| format!("missing argument <{id}>"))
}

impl Invocation {
    /// Extract an invocation from matches of [`command`]
    ///
    /// # Errors
    /// Returns error if a required argument is absent
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let action = match matches.subcommand() {
            Some(("show", args)) => Action::Show {
                file: required(args, "file")?,
                json: args.get_flag("json"),
            },
            Some(("set", args)) => Action::Set {
                file: required(args, "file")?,
                key: required(args, "key")?,
                value: required(args, "value")?,
            },
            Some(("mode", args)) => Action::Mode {
                file: required(args, "file")?,
                mode: required(args, "mode")?,
            },
            Some((other, _)) => anyhow::bail!("unknown subcommand '{other}'"),
            None => anyhow::bail!("no subcommand given"),
        };

        Ok(Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            legacy_overwritten: matches.get_flag("legacy-overwritten"),
            log_json: matches.get_flag("log-json"),
            action,
        })
    }

    /// Parse from an argument list
    ///
    /// # Errors
    /// Returns the clap error for invalid arguments
    pub fn try_parse_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }
}
