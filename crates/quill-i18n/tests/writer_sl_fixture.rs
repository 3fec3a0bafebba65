//! End-to-end checks against the shipped Slovenian resource.
//!
//! The fixture is a complete lupdate-produced file: 33 contexts, 434
//! messages, six of them numerus messages with four forms each.

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use quill_i18n::{
    Catalog, LoadConfig, PluralRule, TranslationTable, load, load_or_identity, parse_ts, write_ts,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/writer_sl.ts")
}

fn fixture_text() -> String {
    std::fs::read_to_string(fixture_path()).expect("fixture readable")
}

fn fixture_table() -> TranslationTable {
    load(fixture_path(), &LoadConfig::default()).expect("fixture loads")
}

// ── Document model ──────────────────────────────────────────────────────

#[test]
fn document_shape() {
    let doc = parse_ts(&fixture_text()).unwrap();
    assert_eq!(doc.version.as_deref(), Some("2.1"));
    assert_eq!(doc.language, "sl");
    assert_eq!(doc.source_language.as_deref(), Some("en"));
    assert_eq!(doc.contexts.len(), 33);
    assert_eq!(doc.message_count(), 434);

    let numerus = doc
        .contexts
        .iter()
        .flat_map(|c| &c.messages)
        .filter(|m| m.is_numerus())
        .count();
    assert_eq!(numerus, 6);
}

#[test]
fn rewrite_is_byte_identical() {
    let text = fixture_text();
    let doc = parse_ts(&text).unwrap();
    assert_eq!(write_ts(&doc), text);
}

#[test]
fn entities_are_decoded_in_the_model() {
    let doc = parse_ts(&fixture_text()).unwrap();
    let document = doc.context("Document").unwrap();
    assert!(
        document
            .messages
            .iter()
            .any(|m| m.source == "Unable to save '%1'.")
    );

    let progress = doc.context("DailyProgressDialog").unwrap();
    assert!(
        progress
            .messages
            .iter()
            .any(|m| m.source == "%1 &ndash; %2")
    );
}

// ── Table lookups ───────────────────────────────────────────────────────

#[test]
fn table_metadata() {
    let table = fixture_table();
    assert_eq!(table.language(), "sl");
    assert_eq!(table.source_language(), Some("en"));
    assert_eq!(table.plural_rule(), PluralRule::Slovenian);
    assert_eq!(table.len(), 434);
    assert_eq!(table.stats().finished, 434);
    assert_eq!(table.stats().numerus_repaired, 0);
    assert_eq!(table.contexts().count(), 33);
}

#[test]
fn simple_lookups() {
    let table = fixture_table();
    assert_eq!(table.lookup("Alert", "Close (%1)"), "Zapri (%1)");
    assert_eq!(table.lookup("AlertLayer", "Dismiss Alert"), "Odstrani opozorilo");
    assert_eq!(
        table.lookup("Document", "Unable to save '%1'."),
        "Shranjevanje '%1' ni mogoče."
    );
    assert_eq!(
        table.lookup(
            "PreferencesDialog",
            "The dictionary \"%1\" already exists. Do you want to replace it?"
        ),
        "Slovar \"%1\" že obstaja. Ali ga naj zamenjam?"
    );
    assert_eq!(
        table.lookup("LocaleDialog", "<System Language>"),
        "<System Language>"
    );
}

#[test]
fn identical_translation_is_kept_by_default() {
    let table = fixture_table();
    assert_eq!(table.get("DailyProgressDialog", "N/A"), Some("N/A"));

    let config = LoadConfig {
        remove_identical: true,
        ..LoadConfig::default()
    };
    let trimmed = load(fixture_path(), &config).unwrap();
    assert_eq!(trimmed.get("DailyProgressDialog", "N/A"), None);
    assert_eq!(trimmed.lookup("DailyProgressDialog", "N/A"), "N/A");
    assert!(trimmed.stats().identical_removed > 0);
}

#[test]
fn misses_return_source_verbatim() {
    let table = fixture_table();
    assert_eq!(table.lookup("Alert", "Unknown Source"), "Unknown Source");
    // Contexts scope lookups.
    assert_eq!(table.lookup("AlertLayer", "Close (%1)"), "Close (%1)");
    assert_eq!(table.lookup("NoSuchContext", "Sorry"), "Sorry");
    assert_eq!(table.lookup("Alert", ""), "");
}

#[test]
fn numerus_forms_follow_slovenian_categories() {
    let table = fixture_table();
    let src = "%Ln word(s)";
    assert_eq!(table.lookup_plural("DailyProgress", src, 1), "%Ln besede");
    assert_eq!(table.lookup_plural("DailyProgress", src, 2), "%Ln besed");
    assert_eq!(table.lookup_plural("DailyProgress", src, 3), "%Ln besed");
    assert_eq!(table.lookup_plural("DailyProgress", src, 11), "%Ln besed");
    assert_eq!(table.lookup_plural("DailyProgress", src, 101), "%Ln besede");

    let minutes = "%Ln minute(s)";
    assert_eq!(table.lookup_plural("DailyProgress", minutes, 1), "%Ln minut");
    assert_eq!(table.lookup_plural("DailyProgress", minutes, 5), "%Ln minute");
    assert_eq!(table.lookup_plural("DailyProgress", minutes, 0), "%Ln minute");
}

#[test]
fn numerus_lookup_always_returns_a_stored_form() {
    let doc = parse_ts(&fixture_text()).unwrap();
    let table = fixture_table();
    for context in &doc.contexts {
        for message in context.messages.iter().filter(|m| m.is_numerus()) {
            let quill_i18n::ts::Translation::Numerus(forms) = &message.translation else {
                panic!("numerus message without forms");
            };
            for count in [0, 1, 2, 3, 4, 5, 11, 99, 100, 101, 102, 103, 1_000_000] {
                let text = table.lookup_plural(&context.name, &message.source, count);
                assert!(
                    forms.iter().any(|f| f == text),
                    "{}/{} count {count} gave {text:?}",
                    context.name,
                    message.source
                );
            }
        }
    }
}

#[test]
fn formatting_fills_markers() {
    let table = fixture_table();
    assert_eq!(table.format("Alert", "Close (%1)", &["3"]), "Zapri (3)");
    assert_eq!(
        table.format_plural("DailyProgress", "%L1% of %Ln minute(s)", 1, &["42"]),
        "42% od 1 minute"
    );
    assert_eq!(
        table.format_plural("FindDialog", "Replace %n instance(s)?", 7, &[]),
        "Zamenjaj 7 pojavitev?"
    );
}

// ── Failure handling ────────────────────────────────────────────────────

#[test]
fn truncated_resource_yields_identity_table() {
    let text = fixture_text();
    let mut cut = text.len() / 2;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let truncated = &text[..cut];
    let table = quill_i18n::load_str_or_identity(truncated, &LoadConfig::default());
    assert!(table.is_empty());
    assert_eq!(table.lookup("Alert", "Close (%1)"), "Close (%1)");
}

#[test]
fn missing_resource_yields_identity_table() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_or_identity(dir.path().join("writer_xx.ts"), &LoadConfig::default());
    assert!(table.is_empty());
    assert_eq!(
        table.lookup_plural("DailyProgress", "%Ln word(s)", 3),
        "%Ln word(s)"
    );
}

// ── Sharing ─────────────────────────────────────────────────────────────

#[test]
fn concurrent_readers_see_the_same_table() {
    let table = Arc::new(fixture_table());
    std::thread::scope(|scope| {
        for worker in 0..8_i64 {
            let table = Arc::clone(&table);
            scope.spawn(move || {
                for n in 0..200 {
                    assert_eq!(table.lookup("Alert", "Close (%1)"), "Zapri (%1)");
                    let form = table.lookup_plural("DailyProgress", "%Ln word(s)", worker + n);
                    assert!(form == "%Ln besede" || form == "%Ln besed");
                }
            });
        }
    });
}

#[test]
fn catalog_falls_back_to_slovenian() {
    let mut catalog = Catalog::new();
    catalog.add_table(fixture_table());
    catalog.set_fallback_chain(vec!["sl".into()]);

    assert_eq!(catalog.lookup("de", "Alert", "Close (%1)"), "Zapri (%1)");
    assert_eq!(catalog.lookup("sl", "Alert", "Missing"), "Missing");

    let report = catalog.coverage_report();
    assert_eq!(report.total_keys, 434);
    assert_eq!(report.locales[0].present, 434);
}
