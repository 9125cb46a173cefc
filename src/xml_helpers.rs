//! Shared XML helpers for the XLSX reader and writer.
//!
//! Attribute lookups handle UTF-8 conversion and entity unescaping; the
//! escape helpers are used when writing package parts by hand.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

/// Extract an unescaped string attribute value by key.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Extract a string attribute by local name (ignoring namespace prefix).
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Extract a `u32` attribute value by key.
pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean attribute value by key.
///
/// Returns `None` if missing. Recognizes `"1"`, `"true"` as true.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

/// Extract a boolean attribute with a default value.
pub fn attr_bool_default(e: &BytesStart, key: &[u8], default: bool) -> bool {
    attr_bool(e, key).unwrap_or(default)
}

/// Collect the text content of the element just opened, up to its end tag.
///
/// Nested elements are flattened, so `<is><r><t>a</t></r><r><t>b</t></r></is>`
/// reads as `"ab"`. Phonetic runs (`rPh`) are skipped.
pub fn read_text<R: BufRead>(xml: &mut Reader<R>, end: &[u8]) -> String {
    let mut text = String::new();
    let mut buf = Vec::new();
    let mut skip_depth = 0u32;
    loop {
        buf.clear();
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"rPh" => skip_depth += 1,
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"rPh" => {
                skip_depth = skip_depth.saturating_sub(1);
            }
            Ok(Event::Text(ref t)) if skip_depth == 0 => {
                if let Ok(s) = t.unescape() {
                    text.push_str(&s);
                }
            }
            Ok(Event::CData(ref c)) if skip_depth == 0 => {
                text.push_str(&String::from_utf8_lossy(c));
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == end => break,
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    text
}

/// Escape text for element content or attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn first_start(xml: &str) -> (Reader<&[u8]>, BytesStart<'static>) {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            if let Ok(Event::Start(e) | Event::Empty(e)) = reader.read_event_into(&mut buf) {
                return (reader, e.into_owned());
            }
        }
    }

    #[test]
    fn test_attr_helpers() {
        let (_, e) = first_start(r#"<sheet name="Q&amp;A" sheetId="7" hidden="1" r:id="rId3"/>"#);
        assert_eq!(attr_string(&e, b"name").as_deref(), Some("Q&A"));
        assert_eq!(attr_u32(&e, b"sheetId"), Some(7));
        assert_eq!(attr_bool(&e, b"hidden"), Some(true));
        assert!(!attr_bool_default(&e, b"missing", false));
        assert_eq!(attr_string_local(&e, b"id").as_deref(), Some("rId3"));
    }

    #[test]
    fn test_read_text_flattens_runs() {
        let (mut reader, _) =
            first_start("<si><r><t>Root </t></r><r><t>cause</t></r><rPh><t>x</t></rPh></si>");
        assert_eq!(read_text(&mut reader, b"si"), "Root cause");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
