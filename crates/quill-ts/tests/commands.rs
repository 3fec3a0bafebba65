//! Subcommands driven end to end through argument parsing.

use std::io::Write;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use quill_i18n::LoadConfig;
use quill_ts::cli::Opts;
use quill_ts::commands::{self, CommandError};

fn fixture() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../quill-i18n/tests/fixtures/writer_sl.ts")
        .display()
        .to_string()
}

fn run(args: &[&str]) -> Result<String, CommandError> {
    let opts = Opts::parse_from_env_and_args(args, |_| None).expect("valid arguments");
    let mut out = Vec::new();
    commands::run(&opts, LoadConfig::default(), &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".ts").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const GERMAN: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de" sourcelanguage="en">
<context>
    <name>Alert</name>
    <message>
        <source>Close (%1)</source>
        <translation>Schließen (%1)</translation>
    </message>
    <message>
        <source>Snooze</source>
        <translation>Schlummern</translation>
    </message>
</context>
</TS>
"#;

#[test]
fn check_reports_counts() {
    let path = fixture();
    let out = run(&["check", &path]).unwrap();
    assert!(out.contains("language:           sl (source: en)"));
    assert!(out.contains("plural rule:        Slovenian (4 forms)"));
    assert!(out.contains("entries:            434 in 33 contexts"));
}

#[test]
fn check_json() {
    let path = fixture();
    let out = run(&["check", &path, "--json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["language"], "sl");
    assert_eq!(value["plural_forms"], 4);
    assert_eq!(value["entries"], 434);
    assert_eq!(value["stats"]["finished"], 434);
}

#[test]
fn check_fails_on_malformed_file() {
    let file = write_temp("<TS language=\"sl\"><context>");
    let path = file.path().display().to_string();
    let err = run(&["check", &path]).unwrap_err();
    assert!(matches!(err, CommandError::Load(_)));
}

#[test]
fn lookup_translates_and_substitutes() {
    let path = fixture();
    assert_eq!(
        run(&["lookup", &path, "Alert", "Close (%1)", "--arg=5"]).unwrap(),
        "Zapri (5)\n"
    );
    assert_eq!(
        run(&["lookup", &path, "DailyProgress", "%Ln word(s)", "--count=2"]).unwrap(),
        "2 besed\n"
    );
    assert_eq!(
        run(&["lookup", &path, "DailyProgress", "%Ln word(s)", "--count=101"]).unwrap(),
        "101 besede\n"
    );
}

#[test]
fn lookup_falls_back_to_source() {
    let path = fixture();
    assert_eq!(
        run(&["lookup", &path, "Alert", "Unknown Source"]).unwrap(),
        "Unknown Source\n"
    );
}

#[test]
fn roundtrip_verify_passes_on_fixture() {
    let path = fixture();
    let out = run(&["roundtrip", &path, "--verify"]).unwrap();
    assert!(out.ends_with(": byte-identical\n"));
}

#[test]
fn roundtrip_verify_keeps_lupdate_extras() {
    let file = write_temp(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n\
<TS version=\"2.1\" language=\"sl\">\n<context>\n    <name>Alert</name>\n    \
<comment>ctx</comment>\n    <message>\n        \
<source>Tab<byte value=\"x1\"/>here</source>\n        \
<translation variants=\"yes\">\n            <lengthvariant>Zapri okno</lengthvariant>\n            \
<lengthvariant>Zapri</lengthvariant>\n        </translation>\n    </message>\n</context>\n</TS>\n",
    );
    let path = file.path().display().to_string();
    let out = run(&["roundtrip", &path, "--verify"]).unwrap();
    assert!(out.ends_with(": byte-identical\n"));
    assert_eq!(
        run(&["lookup", &path, "Alert", "Tab\u{1}here"]).unwrap(),
        "Zapri okno\n"
    );
}

#[test]
fn roundtrip_prints_normalized_document() {
    let file = write_temp(
        "<TS language=\"de\"><context><name>A</name><message><source>x</source>\
         <translation>y</translation></message></context></TS>",
    );
    let path = file.path().display().to_string();
    let out = run(&["roundtrip", &path]).unwrap();
    assert_eq!(
        out,
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS language=\"de\">\n\
         <context>\n    <name>A</name>\n    <message>\n        <source>x</source>\n        \
         <translation>y</translation>\n    </message>\n</context>\n</TS>\n"
    );

    let err = run(&["roundtrip", &path, "--verify"]).unwrap_err();
    assert!(matches!(err, CommandError::RoundtripMismatch { line: 1, .. }));
}

#[test]
fn coverage_compares_languages() {
    let sl = fixture();
    let de = write_temp(GERMAN);
    let de = de.path().display().to_string();

    let out = run(&["coverage", &sl, &de, "--json"]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["total_keys"], 435);
    let locales = value["locales"].as_array().unwrap();
    assert_eq!(locales[0]["locale"], "de");
    assert_eq!(locales[0]["present"], 2);
    assert_eq!(locales[1]["locale"], "sl");
    assert_eq!(locales[1]["present"], 434);
    assert_eq!(locales[1]["missing"][0][0], "Alert");
    assert_eq!(locales[1]["missing"][0][1], "Snooze");
}

#[test]
fn coverage_with_fallback_fills_gaps() {
    let sl = fixture();
    let de = write_temp(GERMAN);
    let de = de.path().display().to_string();

    let out = run(&["coverage", &sl, &de, "--fallback=sl"]).unwrap();
    assert!(out.starts_with("keys: 435\n"));
    assert!(out.contains("de         435/435    100.0%"));
    // Slovenian has no fallback beyond itself.
    assert!(out.contains("sl         434/435     99.8%"));
    assert!(out.contains("    missing Alert: Snooze\n"));
}
