#![forbid(unsafe_code)]

//! `quill-ts` binary entry point.

use std::io;
use std::process;

use quill_i18n::LoadConfig;
use quill_ts::{cli, commands};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    let opts = cli::Opts::parse();

    let parsed = LoadConfig::from_env_with_diagnostics();
    for err in &parsed.errors {
        warn!(%err, "ignoring invalid configuration");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = commands::run(&opts, parsed.config, &mut out) {
        eprintln!("quill-ts: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("QUILL_TS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
