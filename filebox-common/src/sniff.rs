//! Content-type sniffing.
//!
//! Binary formats (images, documents, archives, audio, video, fonts) are
//! recognised by `infer`. Markup, byte-order marks, and the plain-text test
//! follow the WHATWG MIME Sniffing rules so textual content always carries
//! a charset. At most the first 512 bytes of a buffer are inspected.

/// Maximum number of leading bytes considered when sniffing.
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

const TEXT_HTML_UTF8: &str = "text/html; charset=utf-8";
const TEXT_XML_UTF8: &str = "text/xml; charset=utf-8";

/// Matched case-insensitively and only when followed by a space or `>`.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

const BOMS: &[(&[u8], &str)] = &[
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", TEXT_PLAIN_UTF8),
];

/// Classify `data` by its leading bytes.
///
/// Always returns a valid MIME type; an empty buffer and anything that
/// matches no rule yield `application/octet-stream`.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return OCTET_STREAM;
    }
    let data = &data[..data.len().min(SNIFF_LEN)];
    let start = data
        .iter()
        .position(|b| !is_ws(*b))
        .unwrap_or(data.len());
    let trimmed = &data[start..];

    if let Some(ct) = markup_type(trimmed).or_else(|| bom_type(data)) {
        return ct;
    }

    // Text kinds from `infer` are left to the charset-aware rules.
    if let Some(kind) = infer::get(data) {
        if kind.matcher_type() != infer::MatcherType::Text {
            return kind.mime_type();
        }
    }

    if trimmed.iter().any(|b| is_binary(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN_UTF8
    }
}

fn markup_type(trimmed: &[u8]) -> Option<&'static str> {
    if HTML_TAGS.iter().any(|tag| is_html_tag(trimmed, tag)) {
        return Some(TEXT_HTML_UTF8);
    }
    trimmed.starts_with(b"<?xml").then_some(TEXT_XML_UTF8)
}

fn is_html_tag(data: &[u8], tag: &[u8]) -> bool {
    data.len() > tag.len()
        && data[..tag.len()].eq_ignore_ascii_case(tag)
        && matches!(data[tag.len()], b' ' | b'>')
}

fn bom_type(data: &[u8]) -> Option<&'static str> {
    BOMS.iter()
        .find(|(bom, _)| data.starts_with(bom))
        .map(|(_, ct)| *ct)
}

fn is_ws(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
