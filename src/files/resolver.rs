use std::path::PathBuf;

use percent_encoding::percent_decode_str;

/// Served when the target is the bare root.
pub const DEFAULT_DOCUMENT: &str = "/index.html";

/// Maps a raw request target onto a path under `document_root`.
///
/// Every `..` is removed as plain text before decoding, and the result is
/// appended to the root with no further normalisation. Repeated slashes
/// survive, and an encoded `%2e%2e` is decoded after the strip, so this is
/// not a complete guard against leaving the document root.
pub fn resolve(document_root: &str, target: &str) -> PathBuf {
    let stripped = target.replace("..", "");

    let decoded = percent_decode_str(&stripped)
        .decode_utf8()
        .map(|d| d.into_owned());
    let decoded = match decoded {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!(
                request_target = target,
                error = %e,
                "could not decode request target, using it as-is"
            );
            stripped
        }
    };

    let resource = if decoded == "/" {
        DEFAULT_DOCUMENT
    } else {
        decoded.as_str()
    };

    let path = PathBuf::from(format!("{}{}", document_root, resource));
    tracing::debug!(request_target = target, path = %path.display(), "resolved request target");
    path
}
