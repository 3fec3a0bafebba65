//! Qt Linguist TS documents: typed model, reader and writer.
//!
//! The reader is all-or-nothing: it returns a complete [`TsDocument`] or an
//! [`I18nError`] and never a partial document. Entities are decoded on
//! read and re-encoded on write, so markup and accelerator markers survive
//! a round trip unchanged.
//!
//! # Layout
//!
//! [`write_ts`] emits the layout `lupdate` produces (XML declaration,
//! `<!DOCTYPE TS>`, four-space indentation, all five predefined entities
//! escaped, control characters and non-ASCII spaces as `<byte value="xNN"/>`).
//! Re-writing a parsed `lupdate` file reproduces its bytes.
//!
//! # Length variants
//!
//! A `variants="yes"` translation holds several `<lengthvariant>` texts,
//! longest first. The model keeps them in one string joined by
//! [`LENGTH_VARIANT_SEPARATOR`]; lookups use the [`primary_variant`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Malformed XML | Mismatched tags, bad entity, truncated input | `I18nError::Xml` |
//! | Wrong root | Root element is not `<TS>` | `I18nError::NotTs` |
//! | No language | `<TS>` without `language` | `I18nError::MissingAttribute` |
//! | Broken message | `<message>` without `<source>` | `I18nError::MissingElement` |
//! | Bad byte | `<byte>` without a valid `value` | `I18nError::Xml` / `MissingAttribute` |
//! | Unknown element | e.g. `<userdata>`, `<oldsource>` | Skipped (debug log) |

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use tracing::debug;

use crate::error::I18nError;

/// Joins the `<lengthvariant>` texts of one translation.
pub const LENGTH_VARIANT_SEPARATOR: char = '\u{9c}';

/// The first (longest) length variant of a translation text.
#[must_use]
pub fn primary_variant(text: &str) -> &str {
    text.split_once(LENGTH_VARIANT_SEPARATOR)
        .map_or(text, |(first, _)| first)
}

/// A parsed TS document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsDocument {
    /// Format version (`version` attribute), e.g. `"2.1"`.
    pub version: Option<String>,
    /// Target locale (`language` attribute).
    pub language: String,
    /// Source locale (`sourcelanguage` attribute).
    pub source_language: Option<String>,
    /// Contexts in document order.
    pub contexts: Vec<TsContext>,
}

impl TsDocument {
    /// Create an empty document for a target language.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            version: Some("2.1".into()),
            language: language.into(),
            source_language: None,
            contexts: Vec::new(),
        }
    }

    /// Total number of messages across all contexts.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Find a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&TsContext> {
        self.contexts.iter().find(|c| c.name == name)
    }
}

/// A named group of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsContext {
    pub name: String,
    /// Note attached to the whole context.
    pub comment: Option<String>,
    pub messages: Vec<TsMessage>,
}

impl TsContext {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            messages: Vec::new(),
        }
    }
}

/// Source location recorded by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsLocation {
    pub filename: String,
    /// Kept verbatim; `lupdate` may write relative lines such as `"+3"`.
    pub line: Option<String>,
}

/// Review state of a translation (`type` attribute).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TranslationType {
    #[default]
    Finished,
    Unfinished,
    /// Source string no longer exists (pre-5 `lupdate`).
    Obsolete,
    /// Source string no longer exists.
    Vanished,
}

impl TranslationType {
    fn from_attribute(value: &str) -> Self {
        match value {
            "unfinished" => Self::Unfinished,
            "obsolete" => Self::Obsolete,
            "vanished" => Self::Vanished,
            other => {
                debug!(value = other, "unknown translation type, treating as finished");
                Self::Finished
            }
        }
    }

    const fn attribute(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Whether the source string is gone from the application.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Text of a non-plural message.
    Single(String),
    /// Numerus forms of a plural (`numerus="yes"`) message, in rule order.
    Numerus(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

/// One `<message>` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TsMessage {
    pub locations: Vec<TsLocation>,
    pub source: String,
    /// Disambiguation comment; part of the lookup key.
    pub comment: Option<String>,
    /// Developer note for translators.
    pub extra_comment: Option<String>,
    /// Translator's own note.
    pub translator_comment: Option<String>,
    pub translation_type: TranslationType,
    pub translation: Translation,
}

impl TsMessage {
    /// A finished, non-plural message.
    #[must_use]
    pub fn simple(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: Translation::Single(translation.into()),
            ..Self::default()
        }
    }

    /// A finished plural message.
    #[must_use]
    pub fn numerus<I, S>(source: impl Into<String>, forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source: source.into(),
            translation: Translation::Numerus(forms.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Whether the message is marked `numerus="yes"`.
    #[must_use]
    pub fn is_numerus(&self) -> bool {
        matches!(self.translation, Translation::Numerus(_))
    }
}

// ---------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------

/// Parse a TS document from a string.
pub fn parse_ts(xml: &str) -> Result<TsDocument, I18nError> {
    TsReader::new(xml).read_document()
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> TsReader<'a> {
    fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);
        Self { reader }
    }

    fn error(&self, err: impl Display) -> I18nError {
        I18nError::Xml {
            position: self.reader.error_position() as u64,
            message: err.to_string(),
        }
    }

    fn next(&mut self) -> Result<Event<'a>, I18nError> {
        match self.reader.read_event() {
            Ok(event) => Ok(event),
            Err(err) => Err(self.error(err)),
        }
    }

    fn truncated(&self, parent: &str) -> I18nError {
        I18nError::Xml {
            position: self.reader.buffer_position() as u64,
            message: format!("unexpected end of document inside <{parent}>"),
        }
    }

    fn text(&self, text: &BytesText<'_>) -> Result<String, I18nError> {
        text.unescape()
            .map(Cow::into_owned)
            .map_err(|err| self.error(err))
    }

    fn attribute(&self, start: &BytesStart<'_>, name: &str) -> Result<Option<String>, I18nError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.error(err))?;
            if attr.key.as_ref() == name.as_bytes() {
                let value = attr.unescape_value().map_err(|err| self.error(err))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn skip(&mut self, start: &BytesStart<'_>, parent: &'static str) -> Result<(), I18nError> {
        debug!(parent, element = %element_name(start), "skipping unknown element");
        self.reader
            .read_to_end(start.name())
            .map_err(|err| self.error(err))?;
        Ok(())
    }

    fn read_document(mut self) -> Result<TsDocument, I18nError> {
        loop {
            match self.next()? {
                Event::Start(start) => {
                    let mut doc = self.read_header(&start)?;
                    self.read_contexts(&mut doc)?;
                    self.read_trailer()?;
                    return Ok(doc);
                }
                Event::Empty(start) => {
                    let doc = self.read_header(&start)?;
                    self.read_trailer()?;
                    return Ok(doc);
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(I18nError::UnexpectedText { parent: "document" });
                }
                Event::Eof => return Err(self.truncated("document")),
                _ => {}
            }
        }
    }

    fn read_header(&self, start: &BytesStart<'_>) -> Result<TsDocument, I18nError> {
        if start.name().as_ref() != b"TS" {
            return Err(I18nError::NotTs {
                found: element_name(start),
            });
        }
        let language = self
            .attribute(start, "language")?
            .ok_or(I18nError::MissingAttribute {
                element: "TS",
                attribute: "language",
            })?;
        if language.trim().is_empty() {
            return Err(I18nError::InvalidLocale(language));
        }
        Ok(TsDocument {
            version: self.attribute(start, "version")?,
            language,
            source_language: self.attribute(start, "sourcelanguage")?,
            contexts: Vec::new(),
        })
    }

    fn read_trailer(&mut self) -> Result<(), I18nError> {
        loop {
            match self.next()? {
                Event::Eof => return Ok(()),
                Event::Text(text) if is_blank(&text) => {}
                Event::Comment(_) | Event::PI(_) => {}
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.error(format!(
                        "content after </TS>: <{}>",
                        element_name(&start)
                    )));
                }
                _ => return Err(I18nError::UnexpectedText { parent: "document" }),
            }
        }
    }

    fn read_contexts(&mut self, doc: &mut TsDocument) -> Result<(), I18nError> {
        loop {
            match self.next()? {
                Event::Start(start) if start.name().as_ref() == b"context" => {
                    let context = self.read_context()?;
                    doc.contexts.push(context);
                }
                Event::Empty(start) if start.name().as_ref() == b"context" => {
                    return Err(I18nError::MissingElement {
                        parent: "context",
                        element: "name",
                    });
                }
                Event::Start(start) => self.skip(&start, "TS")?,
                Event::Empty(start) => {
                    debug!(parent = "TS", element = %element_name(&start), "skipping unknown element");
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(I18nError::UnexpectedText { parent: "TS" });
                }
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(self.truncated("TS")),
                _ => {}
            }
        }
    }

    fn read_context(&mut self) -> Result<TsContext, I18nError> {
        let mut name = None;
        let mut comment = None;
        let mut messages = Vec::new();
        loop {
            match self.next()? {
                Event::Start(start) => match start.name().as_ref() {
                    b"name" => name = Some(self.read_text("name", false)?),
                    b"comment" => comment = Some(self.read_text("comment", false)?),
                    b"message" => messages.push(self.read_message(&start)?),
                    _ => self.skip(&start, "context")?,
                },
                Event::Empty(start) => match start.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"comment" => comment = Some(String::new()),
                    b"message" => {
                        return Err(I18nError::MissingElement {
                            parent: "message",
                            element: "source",
                        });
                    }
                    _ => {
                        debug!(parent = "context", element = %element_name(&start), "skipping unknown element");
                    }
                },
                Event::Text(text) if is_blank(&text) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(I18nError::UnexpectedText { parent: "context" });
                }
                Event::End(_) => break,
                Event::Eof => return Err(self.truncated("context")),
                _ => {}
            }
        }
        let name = name.ok_or(I18nError::MissingElement {
            parent: "context",
            element: "name",
        })?;
        Ok(TsContext {
            name,
            comment,
            messages,
        })
    }

    fn read_message(&mut self, start: &BytesStart<'_>) -> Result<TsMessage, I18nError> {
        let numerus = self.attribute(start, "numerus")?.as_deref() == Some("yes");
        let mut message = TsMessage {
            translation: if numerus {
                Translation::Numerus(Vec::new())
            } else {
                Translation::Single(String::new())
            },
            ..TsMessage::default()
        };
        let mut source = None;
        loop {
            match self.next()? {
                Event::Start(child) => match child.name().as_ref() {
                    b"location" => {
                        message.locations.push(self.read_location(&child)?);
                        self.reader
                            .read_to_end(child.name())
                            .map_err(|err| self.error(err))?;
                    }
                    b"source" => source = Some(self.read_text("source", false)?),
                    b"comment" => message.comment = Some(self.read_text("comment", false)?),
                    b"extracomment" => {
                        message.extra_comment = Some(self.read_text("extracomment", false)?);
                    }
                    b"translatorcomment" => {
                        message.translator_comment =
                            Some(self.read_text("translatorcomment", false)?);
                    }
                    b"translation" => {
                        message.translation_type = self.translation_type(&child)?;
                        message.translation = if numerus {
                            Translation::Numerus(self.read_numerus_forms()?)
                        } else {
                            Translation::Single(self.read_text("translation", true)?)
                        };
                    }
                    _ => self.skip(&child, "message")?,
                },
                Event::Empty(child) => match child.name().as_ref() {
                    b"location" => message.locations.push(self.read_location(&child)?),
                    b"source" => source = Some(String::new()),
                    b"comment" => message.comment = Some(String::new()),
                    b"extracomment" => message.extra_comment = Some(String::new()),
                    b"translatorcomment" => message.translator_comment = Some(String::new()),
                    b"translation" => message.translation_type = self.translation_type(&child)?,
                    _ => {
                        debug!(parent = "message", element = %element_name(&child), "skipping unknown element");
                    }
                },
                Event::Text(text) if is_blank(&text) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(I18nError::UnexpectedText { parent: "message" });
                }
                Event::End(_) => break,
                Event::Eof => return Err(self.truncated("message")),
                _ => {}
            }
        }
        message.source = source.ok_or(I18nError::MissingElement {
            parent: "message",
            element: "source",
        })?;
        Ok(message)
    }

    fn read_location(&self, start: &BytesStart<'_>) -> Result<TsLocation, I18nError> {
        Ok(TsLocation {
            filename: self.attribute(start, "filename")?.unwrap_or_default(),
            line: self.attribute(start, "line")?,
        })
    }

    fn translation_type(&self, start: &BytesStart<'_>) -> Result<TranslationType, I18nError> {
        Ok(self
            .attribute(start, "type")?
            .map_or(TranslationType::Finished, |value| {
                TranslationType::from_attribute(&value)
            }))
    }

    fn read_numerus_forms(&mut self) -> Result<Vec<String>, I18nError> {
        let mut forms = Vec::new();
        loop {
            match self.next()? {
                Event::Start(child) if child.name().as_ref() == b"numerusform" => {
                    forms.push(self.read_text("numerusform", true)?);
                }
                Event::Empty(child) if child.name().as_ref() == b"numerusform" => {
                    forms.push(String::new());
                }
                Event::Start(child) | Event::Empty(child) => {
                    return Err(I18nError::UnexpectedElement {
                        parent: "translation",
                        element: element_name(&child),
                    });
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Text(_) | Event::CData(_) => {
                    return Err(I18nError::UnexpectedText {
                        parent: "translation",
                    });
                }
                Event::End(_) => return Ok(forms),
                Event::Eof => return Err(self.truncated("translation")),
                _ => {}
            }
        }
    }

    /// Collect the character data of a leaf element up to its end tag.
    ///
    /// `<byte>` children become their character. With `variants`, the
    /// `<lengthvariant>` children are joined by [`LENGTH_VARIANT_SEPARATOR`].
    fn read_text(&mut self, parent: &'static str, variants: bool) -> Result<String, I18nError> {
        let mut out = String::new();
        let mut lengths = Vec::new();
        loop {
            match self.next()? {
                Event::Text(text) => out.push_str(&self.text(&text)?),
                Event::CData(data) => out.push_str(&String::from_utf8_lossy(&data)),
                Event::Empty(child) if child.name().as_ref() == b"byte" => {
                    out.push(self.byte(&child)?);
                }
                Event::Start(child) if child.name().as_ref() == b"byte" => {
                    out.push(self.byte(&child)?);
                    self.reader
                        .read_to_end(child.name())
                        .map_err(|err| self.error(err))?;
                }
                Event::Start(child) if variants && child.name().as_ref() == b"lengthvariant" => {
                    lengths.push(self.read_text("lengthvariant", false)?);
                }
                Event::Empty(child) if variants && child.name().as_ref() == b"lengthvariant" => {
                    lengths.push(String::new());
                }
                Event::Start(child) | Event::Empty(child) => {
                    return Err(I18nError::UnexpectedElement {
                        parent,
                        element: element_name(&child),
                    });
                }
                Event::End(_) => break,
                Event::Eof => return Err(self.truncated(parent)),
                _ => {}
            }
        }
        if lengths.is_empty() {
            return Ok(out);
        }
        if !out.chars().all(char::is_whitespace) {
            return Err(I18nError::UnexpectedText { parent });
        }
        let mut separator = [0; 4];
        Ok(lengths.join(&*LENGTH_VARIANT_SEPARATOR.encode_utf8(&mut separator)))
    }

    /// Character of a `<byte value="xNN"/>` element (hex with `x`, else decimal).
    fn byte(&self, start: &BytesStart<'_>) -> Result<char, I18nError> {
        let value = self
            .attribute(start, "value")?
            .ok_or(I18nError::MissingAttribute {
                element: "byte",
                attribute: "value",
            })?;
        let code = match value.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => value.parse().ok(),
        };
        code.and_then(char::from_u32)
            .ok_or_else(|| self.error(format!("invalid <byte> value '{value}'")))
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

// ---------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------

/// Serialize a document in `lupdate` layout.
#[must_use]
pub fn write_ts(doc: &TsDocument) -> String {
    let mut out = String::with_capacity(128 + doc.message_count() * 96);
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS");
    if let Some(version) = &doc.version {
        push_attribute(&mut out, "version", version);
    }
    push_attribute(&mut out, "language", &doc.language);
    if let Some(source_language) = &doc.source_language {
        push_attribute(&mut out, "sourcelanguage", source_language);
    }
    out.push_str(">\n");

    for context in &doc.contexts {
        out.push_str("<context>\n");
        push_element(&mut out, 4, "name", &context.name);
        if let Some(comment) = &context.comment {
            push_element(&mut out, 4, "comment", comment);
        }
        for message in &context.messages {
            write_message(&mut out, message);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}

fn write_message(out: &mut String, message: &TsMessage) {
    out.push_str("    <message");
    if message.is_numerus() {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    for location in &message.locations {
        out.push_str("        <location");
        push_attribute(out, "filename", &location.filename);
        if let Some(line) = &location.line {
            push_attribute(out, "line", line);
        }
        out.push_str("/>\n");
    }
    push_element(out, 8, "source", &message.source);
    for (name, value) in [
        ("comment", &message.comment),
        ("extracomment", &message.extra_comment),
        ("translatorcomment", &message.translator_comment),
    ] {
        if let Some(value) = value {
            push_element(out, 8, name, value);
        }
    }

    out.push_str("        <translation");
    if let Some(kind) = message.translation_type.attribute() {
        push_attribute(out, "type", kind);
    }
    match &message.translation {
        Translation::Single(text) => push_variants(out, 8, text),
        Translation::Numerus(forms) => {
            out.push('>');
            for form in forms {
                out.push_str("\n            <numerusform");
                push_variants(out, 12, form);
                out.push_str("</numerusform>");
            }
            out.push_str("\n        ");
        }
    }
    out.push_str("</translation>\n");
    out.push_str("    </message>\n");
}

fn push_element(out: &mut String, indent: usize, name: &str, text: &str) {
    out.extend(std::iter::repeat_n(' ', indent));
    out.push('<');
    out.push_str(name);
    out.push('>');
    escape_into(out, text);
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

/// Close an open tag and write its text, one `<lengthvariant>` per variant
/// when there are several.
fn push_variants(out: &mut String, indent: usize, text: &str) {
    if !text.contains(LENGTH_VARIANT_SEPARATOR) {
        out.push('>');
        escape_into(out, text);
        return;
    }
    out.push_str(" variants=\"yes\">");
    for variant in text.split(LENGTH_VARIANT_SEPARATOR) {
        out.push('\n');
        out.extend(std::iter::repeat_n(' ', indent + 4));
        out.push_str("<lengthvariant>");
        escape_into(out, variant);
        out.push_str("</lengthvariant>");
    }
    out.push('\n');
    out.extend(std::iter::repeat_n(' ', indent));
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    for ch in value.chars() {
        match escape(ch) {
            Some(entity) => out.push_str(entity),
            None if needs_byte(ch) => out.push_str(&format!("&#x{:x};", u32::from(ch))),
            None => out.push(ch),
        }
    }
    out.push('"');
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match escape(ch) {
            Some(entity) => out.push_str(entity),
            None if needs_byte(ch) => {
                out.push_str(&format!("<byte value=\"x{:x}\"/>", u32::from(ch)));
            }
            None => out.push(ch),
        }
    }
}

const fn escape(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&apos;"),
        _ => None,
    }
}

/// Characters `lupdate` writes as `<byte>` elements.
fn needs_byte(ch: char) -> bool {
    match ch {
        '\n' | '\t' => false,
        _ => ch < ' ' || (!ch.is_ascii() && ch.is_whitespace()),
    }
}
