//! Substitution of TS placeholder markers.
//!
//! Lookups return stored text verbatim; callers that want the markers
//! filled in run the result through [`substitute`].
//!
//! | Marker | Replaced by |
//! |--------|-------------|
//! | `%1` … `%99` | `args[i - 1]` |
//! | `%L1` … `%L99` | `args[i - 1]` (no digit grouping applied) |
//! | `%n`, `%Ln` | the count, in decimal |
//!
//! Substitution is a single left-to-right pass: inserted values are never
//! re-scanned, and markers without a value are left in place.

/// Replace positional and count markers in `template`.
#[must_use]
pub fn substitute(template: &str, args: &[&str], count: Option<i64>) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        if bytes.get(j) == Some(&b'L') {
            j += 1;
        }

        let replacement = match bytes.get(j) {
            Some(b'n') => count.map(|n| (n.to_string(), j + 1)),
            Some(d) if d.is_ascii_digit() => {
                let mut end = j + 1;
                if bytes.get(end).is_some_and(u8::is_ascii_digit) {
                    end += 1;
                }
                let index: usize = template[j..end].parse().unwrap_or(0);
                index
                    .checked_sub(1)
                    .and_then(|k| args.get(k))
                    .map(|value| ((*value).to_string(), end))
            }
            _ => None,
        };

        match replacement {
            Some((value, end)) => {
                out.push_str(&template[copied..i]);
                out.push_str(&value);
                copied = end;
                i = end;
            }
            None => i += 1,
        }
    }

    out.push_str(&template[copied..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_args() {
        assert_eq!(substitute("Close (%1)", &["3"], None), "Close (3)");
        assert_eq!(
            substitute("%1 &ndash; %2", &["Mon", "Sun"], None),
            "Mon &ndash; Sun"
        );
        assert_eq!(substitute("%2 before %1", &["a", "b"], None), "b before a");
    }

    #[test]
    fn count_markers() {
        assert_eq!(substitute("%n dni", &[], Some(5)), "5 dni");
        assert_eq!(substitute("%Ln besed", &[], Some(1200)), "1200 besed");
        assert_eq!(substitute("%n / %n", &[], Some(-2)), "-2 / -2");
    }

    #[test]
    fn locale_marker_followed_by_percent_sign() {
        assert_eq!(
            substitute("%L1% od %Ln minut", &["40"], Some(30)),
            "40% od 30 minut"
        );
    }

    #[test]
    fn unmatched_markers_left_as_is() {
        assert_eq!(substitute("Close (%1)", &[], None), "Close (%1)");
        assert_eq!(substitute("%n dni", &[], None), "%n dni");
        assert_eq!(substitute("%0 and %", &["x"], None), "%0 and %");
        assert_eq!(substitute("100%", &[], Some(1)), "100%");
        assert_eq!(substitute("%Lx", &["a"], None), "%Lx");
    }

    #[test]
    fn two_digit_markers() {
        let args: Vec<String> = (1..=12).map(|i| format!("v{i}")).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        assert_eq!(substitute("%12|%1|%10", &refs, None), "v12|v1|v10");
    }

    #[test]
    fn no_rescan_of_inserted_values() {
        assert_eq!(substitute("%1 %2", &["%2", "b"], None), "%2 b");
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(
            substitute("Shranjevanje '%1' ni mogoče.", &["čžš"], None),
            "Shranjevanje 'čžš' ni mogoče."
        );
    }
}
