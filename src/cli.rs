//! Command-line arguments.
//!
//! Besides its own options, `ansible-parallel` accepts the common
//! `ansible-playbook` options listed under "Bypass options". Those, any option
//! it does not know itself and everything after `--` are forwarded to every
//! playbook run.

use std::path::{Path, PathBuf};

use clap::builder::{FalseyValueParser, RangedU64ValueParser};
use clap::{ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, Parser, ValueEnum};

use crate::engine::DEFAULT_MAX_PARALLEL;

const BYPASS: &str = "Bypass options";

/// Argument ids of the bypass options and the flag forwarded for each
const BYPASS_OPTIONS: [(&str, &str); 6] = [
    ("limit", "--limit"),
    ("extra_vars", "--extra-vars"),
    ("tags", "--tags"),
    ("skip_tags", "--skip-tags"),
    ("forks", "--forks"),
    ("user", "--user"),
];

#[derive(Parser, Debug)]
#[command(
    name = "ansible-parallel",
    author,
    version,
    about = "Run ansible playbooks in parallel with a live status per playbook",
    long_about = None,
    after_help = "Any other option, and everything after `--`, is passed to every \
                  ansible-playbook run."
)]
pub struct Args {
    /// Playbooks to run in parallel
    #[arg(required = true, value_name = "PLAYBOOK")]
    pub playbooks: Vec<String>,

    /// Further limit selected hosts to an additional pattern
    #[arg(short = 'l', long, value_name = "SUBSET", help_heading = BYPASS)]
    pub limit: Vec<String>,

    /// Set additional variables as key=value or YAML/JSON
    #[arg(short = 'e', long, value_name = "EXTRA_VARS", help_heading = BYPASS)]
    pub extra_vars: Vec<String>,

    /// Only run plays and tasks tagged with these values
    #[arg(short = 't', long, value_name = "TAGS", help_heading = BYPASS)]
    pub tags: Vec<String>,

    /// Only run plays and tasks whose tags do not match these values
    #[arg(long, value_name = "SKIP_TAGS", help_heading = BYPASS)]
    pub skip_tags: Vec<String>,

    /// Number of parallel processes used by each playbook
    #[arg(short = 'f', long, value_name = "FORKS", help_heading = BYPASS)]
    pub forks: Vec<String>,

    /// Connect as this user
    #[arg(short = 'u', long, value_name = "REMOTE_USER", help_heading = BYPASS)]
    pub user: Vec<String>,

    /// Maximum number of playbooks running at the same time
    #[arg(
        long,
        env = "ANSIBLE_PARALLEL_MAX_PLAYBOOKS",
        value_name = "N",
        default_value_t = DEFAULT_MAX_PARALLEL,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_playbooks: usize,

    /// Check that every playbook file exists before running anything
    #[arg(
        long,
        env = "ANSIBLE_PARALLEL_VERIFY_PLAYBOOKS",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub verify_playbooks: bool,

    /// Logging level
    #[arg(long, value_enum, env = "ANSIBLE_PARALLEL_LOG", value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Bypass options in command-line order, as `<long flag> <value>` pairs
    #[arg(skip)]
    bypass: Vec<String>,

    /// Arguments not recognised here, passed verbatim to every run
    #[arg(skip)]
    pub passthrough: Vec<String>,
}

/// Log level as exposed on the CLI
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Args {
    /// Parse `argv`, keeping what is not recognised for ansible-playbook
    ///
    /// The first element is the program name, as with [`Parser::try_parse_from`].
    /// Unknown options are forwarded from anywhere on the command line.
    /// Positionals are playbooks until an unknown option follows a playbook,
    /// after which they are forwarded too, since they may be that option's
    /// value.
    pub fn try_parse_known<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut command = Self::command();
        command.build();

        let mut argv = argv.into_iter().map(Into::<String>::into);
        let program = argv.next().unwrap_or_else(|| command.get_name().to_string());
        let (known, passthrough) = split_known(&command, argv);

        let matches = command.try_get_matches_from_mut(std::iter::once(program).chain(known))?;
        let mut args = Self::from_arg_matches(&matches)?;
        args.bypass = bypass_in_order(&matches);
        args.passthrough = passthrough;
        Ok(args)
    }

    /// Arguments appended after the playbook on every run
    ///
    /// Bypass options come first, in the order they were given, followed by
    /// the unrecognised arguments.
    pub fn forwarded_args(&self) -> Vec<String> {
        self.bypass
            .iter()
            .chain(&self.passthrough)
            .cloned()
            .collect()
    }

    /// Playbooks that are not existing files
    pub fn missing_playbooks(&self) -> Vec<&str> {
        self.playbooks
            .iter()
            .filter(|playbook| !Path::new(playbook).is_file())
            .map(String::as_str)
            .collect()
    }
}

/// Split arguments into those clap knows and those forwarded untouched
fn split_known(
    command: &Command,
    mut argv: impl Iterator<Item = String>,
) -> (Vec<String>, Vec<String>) {
    let mut known = Vec::new();
    let mut unknown = Vec::new();
    let mut seen_playbook = false;
    let mut forwarding = false;

    while let Some(arg) = argv.next() {
        if arg == "--" {
            unknown.extend(argv.by_ref());
            break;
        }
        if !arg.starts_with('-') || arg == "-" {
            if forwarding {
                unknown.push(arg);
            } else {
                seen_playbook = true;
                known.push(arg);
            }
            continue;
        }
        match option_takes_separate_value(command, &arg) {
            Some(takes_value) => {
                known.push(arg);
                if takes_value {
                    known.extend(argv.next());
                }
            }
            None => {
                forwarding |= seen_playbook;
                unknown.push(arg);
            }
        }
    }
    (known, unknown)
}

/// Whether `arg` names an option of `command` whose value is the next
/// argument, or `None` when `command` has no such option
fn option_takes_separate_value(command: &Command, arg: &str) -> Option<bool> {
    if let Some(long) = arg.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        let option = command
            .get_arguments()
            .find(|option| option.get_long() == Some(name))?;
        return Some(option.get_action().takes_values() && !inline);
    }

    let mut shorts = arg.chars().skip(1);
    let short = shorts.next()?;
    let option = command
        .get_arguments()
        .find(|option| option.get_short() == Some(short))?;
    Some(option.get_action().takes_values() && shorts.next().is_none())
}

/// Bypass options as given on the command line, using their long spelling
fn bypass_in_order(matches: &ArgMatches) -> Vec<String> {
    let mut given = Vec::new();
    for (id, flag) in BYPASS_OPTIONS {
        if let (Some(indices), Some(values)) =
            (matches.indices_of(id), matches.get_many::<String>(id))
        {
            given.extend(indices.zip(values).map(|(index, value)| (index, flag, value)));
        }
    }
    given.sort_by_key(|(index, ..)| *index);
    given
        .into_iter()
        .flat_map(|(_, flag, value)| [flag.to_string(), value.clone()])
        .collect()
}
