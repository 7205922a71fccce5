//! Content-type detection.
//!
//! The bytes win over the name: a file is sniffed first and its extension is
//! only consulted when nothing recognisable shows up in its leading bytes.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// How many leading bytes of a file are worth sniffing.
pub const SNIFF_LEN: usize = 1024;

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"\x89PNG\r\n\x1A\n", "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B", "application/gzip"),
];

const HTML_MARKERS: &[&[u8]] = &[b"<!doctype html", b"<html"];

/// Detects the content type of `head`, the leading bytes of a resource.
///
/// `name` is used as a fallback for content that carries no signature, such
/// as CSS or JavaScript.
pub fn detect(name: Option<&Path>, head: &[u8]) -> String {
    if let Some(mime) = sniff(head) {
        return mime.to_string();
    }

    if let Some(guess) = name.and_then(|n| mime_guess::from_path(n).first_raw()) {
        return guess.to_string();
    }

    if !head.is_empty() && !head.contains(&0) && std::str::from_utf8(head).is_ok() {
        TEXT_PLAIN.to_string()
    } else {
        OCTET_STREAM.to_string()
    }
}

fn sniff(head: &[u8]) -> Option<&'static str> {
    for (magic, mime) in SIGNATURES {
        if head.starts_with(magic) {
            return Some(*mime);
        }
    }

    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    let text = trim_leading_whitespace(head);
    let is_html = HTML_MARKERS.iter().any(|marker| {
        text.len() >= marker.len() && text[..marker.len()].eq_ignore_ascii_case(marker)
    });
    is_html.then_some(TEXT_HTML)
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
