//! Subcommand implementations.
//!
//! Every command writes its report to the given writer so tests can capture
//! it; diagnostics go through `tracing`.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use quill_i18n::{
    Catalog, CoverageReport, I18nError, LoadConfig, ReleaseStats, TranslationTable, load,
    parse_ts, substitute, write_ts,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::{Command, Opts};

/// Failure of a subcommand. Always maps to exit status 1.
#[derive(Debug)]
pub enum CommandError {
    Load(I18nError),
    Io(io::Error),
    Json(serde_json::Error),
    /// The rewritten document differs from the input.
    RoundtripMismatch { path: PathBuf, line: usize },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "output error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::RoundtripMismatch { path, line } => write!(
                f,
                "{}: rewrite differs from input at line {line}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::RoundtripMismatch { .. } => None,
        }
    }
}

impl From<I18nError> for CommandError {
    fn from(err: I18nError) -> Self {
        Self::Load(err)
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Run the parsed command with `base` as the environment-derived config.
pub fn run(opts: &Opts, base: LoadConfig, out: &mut impl Write) -> Result<(), CommandError> {
    let config = opts.load_config(base);
    match &opts.command {
        Command::Check { file } => check(file, &config, opts.json, out),
        Command::Lookup {
            file,
            context,
            source,
        } => {
            let request = LookupRequest {
                context,
                source,
                comment: opts.comment.as_deref(),
                count: opts.count,
                args: &opts.args,
            };
            lookup(file, &config, &request, out)
        }
        Command::Roundtrip { file } => roundtrip(file, opts.verify, out),
        Command::Coverage { files } => coverage(files, &config, &opts.fallback, opts.json, out),
    }
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    file: String,
    language: &'a str,
    source_language: Option<&'a str>,
    plural_rule: String,
    plural_forms: usize,
    entries: usize,
    contexts: usize,
    stats: &'a ReleaseStats,
}

impl<'a> CheckReport<'a> {
    fn new(file: &Path, table: &'a TranslationTable) -> Self {
        let rule = table.plural_rule();
        Self {
            file: file.display().to_string(),
            language: table.language(),
            source_language: table.source_language(),
            plural_rule: format!("{rule:?}"),
            plural_forms: rule.form_count(),
            entries: table.len(),
            contexts: table.contexts().count(),
            stats: table.stats(),
        }
    }
}

/// Load a file and report what the table holds.
pub fn check(
    file: &Path,
    config: &LoadConfig,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let table = load(file, config)?;
    let report = CheckReport::new(file, &table);
    info!(file = %report.file, entries = report.entries, "check passed");

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    let stats = report.stats;
    writeln!(out, "file:               {}", report.file)?;
    writeln!(
        out,
        "language:           {} (source: {})",
        report.language,
        report.source_language.unwrap_or("unspecified")
    )?;
    writeln!(
        out,
        "plural rule:        {} ({} forms)",
        report.plural_rule, report.plural_forms
    )?;
    writeln!(
        out,
        "entries:            {} in {} contexts",
        report.entries, report.contexts
    )?;
    for (label, value) in [
        ("finished", stats.finished),
        ("unfinished", stats.unfinished),
        ("untranslated", stats.untranslated),
        ("skipped unfinished", stats.unfinished_skipped),
        ("retired", stats.retired),
        ("identical removed", stats.identical_removed),
        ("numerus repaired", stats.numerus_repaired),
        ("duplicates ignored", stats.duplicates_ignored),
    ] {
        writeln!(out, "{:<20}{value}", format!("{label}:"))?;
    }
    Ok(())
}

/// Inputs of a single lookup.
#[derive(Debug, Clone, Copy)]
pub struct LookupRequest<'a> {
    pub context: &'a str,
    pub source: &'a str,
    pub comment: Option<&'a str>,
    pub count: Option<i64>,
    pub args: &'a [String],
}

/// Resolve one string and fill its markers.
pub fn lookup(
    file: &Path,
    config: &LoadConfig,
    request: &LookupRequest<'_>,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let table = load(file, config)?;
    let text = match table.translate(
        request.context,
        request.source,
        request.comment,
        request.count,
    ) {
        Some(text) => text,
        None => {
            debug!(
                context = request.context,
                source = request.source,
                "untranslated, printing source"
            );
            request.source
        }
    };
    let args: Vec<&str> = request.args.iter().map(String::as_str).collect();
    writeln!(out, "{}", substitute(text, &args, request.count))?;
    Ok(())
}

/// Rewrite a file in `lupdate` layout, or verify the rewrite is lossless.
pub fn roundtrip(file: &Path, verify: bool, out: &mut impl Write) -> Result<(), CommandError> {
    let raw = std::fs::read_to_string(file).map_err(|source| I18nError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let input = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
    let rewritten = write_ts(&parse_ts(input)?);

    if !verify {
        out.write_all(rewritten.as_bytes())?;
        return Ok(());
    }
    match first_difference(input, &rewritten) {
        Some(line) => Err(CommandError::RoundtripMismatch {
            path: file.to_path_buf(),
            line,
        }),
        None => {
            writeln!(out, "{}: byte-identical", file.display())?;
            Ok(())
        }
    }
}

/// 1-based line of the first difference, if any.
fn first_difference(a: &str, b: &str) -> Option<usize> {
    if a == b {
        return None;
    }
    let mut left = a.split_inclusive('\n');
    let mut right = b.split_inclusive('\n');
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x == y => line += 1,
            _ => return Some(line),
        }
    }
}

/// Compare key coverage across several files.
pub fn coverage(
    files: &[PathBuf],
    config: &LoadConfig,
    fallback: &[String],
    json: bool,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    let mut catalog = Catalog::new();
    for file in files {
        let table = load(file, config)?;
        if catalog.table(table.language()).is_some() {
            warn!(
                file = %file.display(),
                language = table.language(),
                "language loaded twice, keeping the later file"
            );
        }
        catalog.add_table(table);
    }
    catalog.set_fallback_chain(fallback.to_vec());

    let report = catalog.coverage_report();
    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }
    write_coverage(&report, out)?;
    Ok(())
}

fn write_coverage(report: &CoverageReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "keys: {}", report.total_keys)?;
    for locale in &report.locales {
        writeln!(
            out,
            "{:<8}{:>6}/{:<6}{:>6.1}%",
            locale.locale, locale.present, report.total_keys, locale.coverage_percent
        )?;
        for (context, source) in &locale.missing {
            writeln!(out, "    missing {context}: {source}")?;
        }
    }
    Ok(())
}
