#![forbid(unsafe_code)]

//! Command-line argument parsing for `quill-ts`.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `QUILL_TS_*` prefix; explicit flags win.

use std::env;
use std::path::PathBuf;
use std::process;

use quill_i18n::{IntegrityPolicy, LoadConfig};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
quill-ts: inspect, query and verify Quill TS translation files

USAGE:
    quill-ts check FILE [--strict] [--no-unfinished] [--json]
    quill-ts lookup FILE CONTEXT SOURCE [--count=N] [--comment=TEXT] [--arg=VALUE]...
    quill-ts roundtrip FILE [--verify]
    quill-ts coverage FILE... [--fallback=LANG[,LANG...]] [--json]

COMMANDS:
    check       Load a file and report what the table holds
    lookup      Resolve one string, falling back to the source text
    roundtrip   Rewrite a file in lupdate layout to stdout
    coverage    Compare key coverage across several files

OPTIONS:
    --strict             Reject bad numerus forms and duplicate keys
    --no-unfinished      Skip translations marked unfinished
    --json               Print machine-readable JSON
    --count=N            Select the plural form for N and fill %n
    --comment=TEXT       Disambiguation comment
    --arg=VALUE          Value for the next %1, %2, ... marker (repeatable)
    --verify             Fail unless the rewrite is byte-identical
    --fallback=LANGS     Comma-separated fallback chain for coverage
    --help, -h           Show this help message
    --version, -V        Show version
    --                   Treat every later argument as positional

EXIT STATUS:
    0  success
    1  load failure or verification mismatch
    2  usage error

ENVIRONMENT VARIABLES:
    QUILL_TS_LOG                   Log filter (default: warn), written to stderr
    QUILL_TS_JSON                  Default for --json (1/true)
    QUILL_TS_STRICT                Default for --strict (1/true)
    QUILL_TS_FALLBACK              Default for --fallback
    QUILL_I18N_POLICY              lenient|strict
    QUILL_I18N_INCLUDE_UNFINISHED  Load unfinished translations (default: true)
    QUILL_I18N_REMOVE_IDENTICAL    Drop translations equal to their source
    QUILL_I18N_PLURAL_LOCALE       Locale used to pick the plural rule";

/// Subcommand and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Check { file: PathBuf },
    Lookup {
        file: PathBuf,
        context: String,
        source: String,
    },
    Roundtrip { file: PathBuf },
    Coverage { files: Vec<PathBuf> },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Check { .. } => "check",
            Self::Lookup { .. } => "lookup",
            Self::Roundtrip { .. } => "roundtrip",
            Self::Coverage { .. } => "coverage",
        }
    }
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub command: Command,
    /// Force the strict integrity policy.
    pub strict: bool,
    /// Skip unfinished translations.
    pub no_unfinished: bool,
    pub json: bool,
    /// Plural count for `lookup`.
    pub count: Option<i64>,
    /// Disambiguation comment for `lookup`.
    pub comment: Option<String>,
    /// Positional marker values for `lookup`.
    pub args: Vec<String>,
    /// Byte-compare the rewrite with the input (`roundtrip`).
    pub verify: bool,
    /// Fallback chain for `coverage`.
    pub fallback: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Help,
    Version,
    MissingCommand,
    UnknownCommand(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    ExtraArgument(String),
    InvalidValue { flag: &'static str, value: String },
    FlagNotApplicable {
        command: &'static str,
        flag: &'static str,
    },
    UnknownArg(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Help => f.write_str("help requested"),
            Self::Version => f.write_str("version requested"),
            Self::MissingCommand => f.write_str("missing command"),
            Self::UnknownCommand(name) => write!(f, "unknown command: {name}"),
            Self::MissingArgument { command, argument } => {
                write!(f, "{command}: missing {argument}")
            }
            Self::ExtraArgument(arg) => write!(f, "unexpected argument: {arg}"),
            Self::InvalidValue { flag, value } => write!(f, "invalid {flag} value: {value}"),
            Self::FlagNotApplicable { command, flag } => {
                write!(f, "{flag} does not apply to {command}")
            }
            Self::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags. Exits the process on `--help`,
    /// `--version` and usage errors.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("quill-ts {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("quill-ts: {err}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    pub fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut strict = false;
        let mut json = false;
        let mut fallback = Vec::new();

        // Apply environment variable defaults first
        if let Some(val) = get_env("QUILL_TS_JSON") {
            json = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Some(val) = get_env("QUILL_TS_STRICT") {
            strict = val == "1" || val.eq_ignore_ascii_case("true");
        }
        if let Some(val) = get_env("QUILL_TS_FALLBACK") {
            fallback = split_locales(&val);
        }

        let mut positionals: Vec<String> = Vec::new();
        let mut no_unfinished = false;
        let mut verify = false;
        let mut count = None;
        let mut comment = None;
        let mut marker_args = Vec::new();
        let mut seen: Vec<&'static str> = Vec::new();
        let mut only_positionals = false;

        // Parse command-line args (override env vars)
        for arg in args {
            let arg = arg.as_ref();
            if only_positionals || !arg.starts_with('-') || arg == "-" {
                positionals.push(arg.to_string());
                continue;
            }
            match arg {
                "--" => only_positionals = true,
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--strict" => {
                    strict = true;
                    seen.push("--strict");
                }
                "--no-unfinished" => {
                    no_unfinished = true;
                    seen.push("--no-unfinished");
                }
                "--json" => {
                    json = true;
                    seen.push("--json");
                }
                "--verify" => {
                    verify = true;
                    seen.push("--verify");
                }
                other => {
                    if let Some(val) = other.strip_prefix("--count=") {
                        match val.parse() {
                            Ok(n) => count = Some(n),
                            Err(_) => {
                                return Err(ParseError::InvalidValue {
                                    flag: "--count",
                                    value: val.to_string(),
                                });
                            }
                        }
                        seen.push("--count");
                    } else if let Some(val) = other.strip_prefix("--comment=") {
                        comment = Some(val.to_string());
                        seen.push("--comment");
                    } else if let Some(val) = other.strip_prefix("--arg=") {
                        marker_args.push(val.to_string());
                        seen.push("--arg");
                    } else if let Some(val) = other.strip_prefix("--fallback=") {
                        fallback = split_locales(val);
                        if fallback.is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--fallback",
                                value: val.to_string(),
                            });
                        }
                        seen.push("--fallback");
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        let command = build_command(positionals)?;
        for flag in seen {
            if !applies_to(&command, flag) {
                return Err(ParseError::FlagNotApplicable {
                    command: command.name(),
                    flag,
                });
            }
        }

        Ok(Self {
            command,
            strict,
            no_unfinished,
            json,
            count,
            comment,
            args: marker_args,
            verify,
            fallback,
        })
    }

    /// Apply the table-loading flags on top of `base`.
    #[must_use]
    pub fn load_config(&self, base: LoadConfig) -> LoadConfig {
        let mut config = base;
        if self.strict {
            config.policy = IntegrityPolicy::Strict;
        }
        if self.no_unfinished {
            config.include_unfinished = false;
        }
        config
    }
}

fn build_command(positionals: Vec<String>) -> Result<Command, ParseError> {
    let mut rest = positionals.into_iter();
    let name = rest.next().ok_or(ParseError::MissingCommand)?;

    let command = match name.as_str() {
        "check" => Command::Check {
            file: required(&mut rest, "check", "FILE")?.into(),
        },
        "lookup" => Command::Lookup {
            file: required(&mut rest, "lookup", "FILE")?.into(),
            context: required(&mut rest, "lookup", "CONTEXT")?,
            source: required(&mut rest, "lookup", "SOURCE")?,
        },
        "roundtrip" => Command::Roundtrip {
            file: required(&mut rest, "roundtrip", "FILE")?.into(),
        },
        "coverage" => {
            let first = required(&mut rest, "coverage", "FILE")?;
            let files = std::iter::once(first).chain(rest).map(PathBuf::from).collect();
            return Ok(Command::Coverage { files });
        }
        _ => return Err(ParseError::UnknownCommand(name)),
    };

    match rest.next() {
        Some(extra) => Err(ParseError::ExtraArgument(extra)),
        None => Ok(command),
    }
}

fn required(
    rest: &mut impl Iterator<Item = String>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, ParseError> {
    rest.next()
        .ok_or(ParseError::MissingArgument { command, argument })
}

fn applies_to(command: &Command, flag: &str) -> bool {
    match command {
        Command::Check { .. } => matches!(flag, "--strict" | "--no-unfinished" | "--json"),
        Command::Lookup { .. } => matches!(
            flag,
            "--strict" | "--no-unfinished" | "--count" | "--comment" | "--arg"
        ),
        Command::Roundtrip { .. } => flag == "--verify",
        Command::Coverage { .. } => matches!(
            flag,
            "--strict" | "--no-unfinished" | "--json" | "--fallback"
        ),
    }
}

fn split_locales(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
