//! Image-set reference extraction from article body markup.
//!
//! Bodies are HTML-like fragments, not documents, and are frequently not
//! well formed. Before tokenizing, text that an HTML parser would never
//! read as markup is escaped: a `<` that cannot open a tag, comment,
//! CDATA section or doctype, and the content of raw-text elements such as
//! `<script>`. The reader then runs with end-name checks off so unbalanced
//! or mismatched tags pass through. A construct left open at the end of
//! the input ends extraction with the references found so far.
//!
//! Start and empty tags arrive in document order, which is a depth-first
//! pre-order walk of the element tree, so nested references are found
//! without building the tree.

use std::borrow::Cow;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

/// Ontology URI marking an embedded image set
pub const IMAGE_SET_TYPE: &str = "http://www.ft.com/ontology/content/ImageSet";

/// Element names that may embed content
const CONTENT_TAGS: [&[u8]; 2] = [b"ft-content", b"content"];

/// Elements whose content is text up to the matching end tag
const RAW_TEXT_TAGS: [&str; 8] = [
    "script", "style", "textarea", "title", "xmp", "iframe", "noembed", "noframes",
];

/// Markup the reader could not make progress on
#[derive(Debug, Clone, Error)]
#[error("markup could not be tokenized at byte {position}: {message}")]
pub struct MarkupError {
    pub position: u64,
    pub message: String,
}

/// Extract image-set identifiers from body markup.
///
/// Identifiers are returned in document order and may repeat.
pub fn extract_image_set_refs(markup: &str) -> Result<Vec<String>, MarkupError> {
    if markup.trim().is_empty() {
        return Ok(Vec::new());
    }

    let escaped = escape_text_markup(markup);
    let mut reader = Reader::from_str(&escaped);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.check_comments = false;
    config.expand_empty_elements = false;

    let mut refs = Vec::new();
    let mut last_error_at = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) | Ok(Event::Empty(tag)) => {
                if let Some(id) = image_set_ref(&tag) {
                    refs.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(quick_xml::Error::Syntax(e)) => {
                // Unclosed tag, comment or CDATA: the rest of the input is inside it
                debug!(error = %e, found = refs.len(), "Markup ends inside an open construct");
                break;
            }
            Err(quick_xml::Error::IllFormed(e)) => {
                let position = reader.buffer_position() as u64;
                // No progress since the last error: the reader is stuck
                if last_error_at == Some(position) {
                    return Err(MarkupError {
                        position,
                        message: e.to_string(),
                    });
                }
                last_error_at = Some(position);
                debug!(error = %e, position, "Ignoring ill-formed markup");
            }
            Err(e) => {
                return Err(MarkupError {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(refs)
}

/// Escape every `<` that an HTML tokenizer would treat as text.
fn escape_text_markup(markup: &str) -> Cow<'_, str> {
    let bytes = markup.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut pos = 0;

    let escape_at = |out: &mut String, copied: &mut usize, lt: usize| {
        out.push_str(&markup[*copied..lt]);
        out.push_str("&lt;");
        *copied = lt + 1;
    };

    while let Some(found) = bytes[pos..].iter().position(|&b| b == b'<') {
        let lt = pos + found;
        let rest = &bytes[lt + 1..];

        let construct_end = if starts_with_ignore_case(rest, b"!--") {
            find(bytes, lt + 4, b"-->").map(|end| end + 3)
        } else if starts_with_ignore_case(rest, b"![CDATA[") {
            find(bytes, lt + 9, b"]]>").map(|end| end + 3)
        } else if starts_with_ignore_case(rest, b"!DOCTYPE") || opens_tag(rest) {
            tag_end(bytes, lt + 1)
        } else {
            escape_at(&mut out, &mut copied, lt);
            pos = lt + 1;
            continue;
        };

        // Left open until the end of input; the reader reports it
        let Some(end) = construct_end else { break };
        pos = end;

        if let Some(name) = raw_text_element(rest) {
            let close = find_end_tag(bytes, end, name).unwrap_or(bytes.len());
            for (offset, &b) in bytes[end..close].iter().enumerate() {
                if b == b'<' {
                    escape_at(&mut out, &mut copied, end + offset);
                }
            }
            pos = close;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(markup);
    }
    out.push_str(&markup[copied..]);
    Cow::Owned(out)
}

/// `<` followed by a start or end tag name
fn opens_tag(rest: &[u8]) -> bool {
    match rest {
        [first, ..] if first.is_ascii_alphabetic() => true,
        [b'/', second, ..] => second.is_ascii_alphabetic(),
        _ => false,
    }
}

/// Index just past the `>` closing the tag that starts before `from`
fn tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote = None;
    for (offset, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Some(from + offset + 1),
                _ => {}
            },
        }
    }
    None
}

fn raw_text_element(rest: &[u8]) -> Option<&'static str> {
    RAW_TEXT_TAGS
        .iter()
        .find(|name| names_element(rest, name))
        .copied()
}

fn find_end_tag(bytes: &[u8], from: usize, name: &str) -> Option<usize> {
    let mut pos = from;
    while let Some(found) = find(bytes, pos, b"</") {
        if names_element(&bytes[found + 2..], name) {
            return Some(found);
        }
        pos = found + 2;
    }
    None
}

/// `rest` begins with the tag name `name` and nothing longer
fn names_element(rest: &[u8], name: &str) -> bool {
    starts_with_ignore_case(rest, name.as_bytes())
        && rest
            .get(name.len())
            .map_or(true, |&b| !(b.is_ascii_alphanumeric() || b == b'-'))
}

fn starts_with_ignore_case(bytes: &[u8], prefix: &[u8]) -> bool {
    bytes.len() >= prefix.len() && bytes[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

/// Identifier referenced by an element, if it embeds an image set
fn image_set_ref(tag: &BytesStart<'_>) -> Option<String> {
    let name = tag.name();
    if !CONTENT_TAGS
        .iter()
        .any(|t| name.as_ref().eq_ignore_ascii_case(t))
    {
        return None;
    }

    let mut content_type = None;
    let mut url = None;
    let mut id = None;

    let mut attrs = tag.html_attributes();
    attrs.with_checks(false);
    for attr in attrs {
        // A broken attribute ends the attribute list, not the walk
        let Ok(attr) = attr else { break };
        let key = attr.key.as_ref();
        let slot = if key.eq_ignore_ascii_case(b"type") {
            &mut content_type
        } else if key.eq_ignore_ascii_case(b"url") {
            &mut url
        } else if key.eq_ignore_ascii_case(b"id") {
            &mut id
        } else {
            continue;
        };
        if slot.is_none() {
            *slot = Some(attr_value(&attr.value));
        }
    }

    if content_type.as_deref() != Some(IMAGE_SET_TYPE) {
        return None;
    }

    let extracted = match (url, id) {
        (Some(url), _) => trailing_segment(&url).to_string(),
        (None, Some(id)) => id,
        (None, None) => return None,
    };

    if extracted.is_empty() {
        debug!("Image set reference without identifier");
        return None;
    }
    Some(extracted)
}

/// Decode an attribute value; unknown entities are left as written
fn attr_value(raw: &[u8]) -> String {
    let raw = String::from_utf8_lossy(raw);
    unescape(&raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

/// Path segment after the last `/`
fn trailing_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_segment() {
        assert_eq!(
            trailing_segment("http://api.ft.com/content/1234-abcd"),
            "1234-abcd"
        );
        assert_eq!(trailing_segment("no-slashes"), "no-slashes");
        assert_eq!(trailing_segment("ends/with/"), "");
    }

    #[test]
    fn test_attr_value_keeps_unknown_entities() {
        assert_eq!(attr_value(b"a&amp;b"), "a&b");
        assert_eq!(attr_value(b"a&nbsp;b"), "a&nbsp;b");
        assert_eq!(attr_value(b"plain"), "plain");
    }

    #[test]
    fn test_escape_leaves_wellformed_markup_alone() {
        let markup = r#"<p class="a">x</p><!-- <b> --><br/>"#;
        assert!(matches!(escape_text_markup(markup), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_stray_angle_brackets() {
        assert_eq!(escape_text_markup("a < b <i>x</i>"), "a &lt; b <i>x</i>");
        assert_eq!(escape_text_markup("I <3 it</>"), "I &lt;3 it&lt;/>");
        assert_eq!(escape_text_markup("<?php x ?>"), "&lt;?php x ?>");
    }

    #[test]
    fn test_escape_raw_text_content() {
        assert_eq!(
            escape_text_markup("<SCRIPT>if (a<b) x('<p>')</script><p>"),
            "<SCRIPT>if (a&lt;b) x('&lt;p>')</script><p>"
        );
        // Tag names that only start with a raw-text name are ordinary
        assert_eq!(escape_text_markup("<scripts><b>"), "<scripts><b>");
    }

    #[test]
    fn test_escape_skips_quoted_attribute_values() {
        let markup = r#"<a title="x < y > z">t</a> <"#;
        assert_eq!(
            escape_text_markup(markup),
            r#"<a title="x < y > z">t</a> &lt;"#
        );
    }

    #[test]
    fn test_url_wins_over_id() {
        let markup = format!(
            r#"<ft-content id="from-id" type="{}" url="http://api.ft.com/content/from-url"></ft-content>"#,
            IMAGE_SET_TYPE
        );
        assert_eq!(extract_image_set_refs(&markup).unwrap(), vec!["from-url"]);
    }

    #[test]
    fn test_tag_names_are_case_insensitive() {
        let markup = format!(r#"<FT-CONTENT TYPE="{}" ID="upper"/>"#, IMAGE_SET_TYPE);
        assert_eq!(extract_image_set_refs(&markup).unwrap(), vec!["upper"]);
    }
}
