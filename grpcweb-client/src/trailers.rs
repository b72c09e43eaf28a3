//! Trailer block parsing.
//!
//! A TRAILERS frame carries an HTTP/1-style header block: CRLF-delimited
//! lines, each `name: value`. Parsing is best-effort; a malformed line is a
//! data-quality defect, never a stream failure.

use crate::status::TrailerMap;

/// Parse a raw trailer block into a [`TrailerMap`].
///
/// The block is interpreted as text (lossy UTF-8 -- trailer headers are
/// ASCII in practice and a stray byte must not fail the stream), trimmed as
/// a whole, then split on CRLF. Each line splits at its first colon, both
/// halves trimmed. A line with no colon maps the whole trimmed line as a
/// key with an empty value. Later duplicates overwrite earlier ones.
pub fn parse_trailers(raw: &[u8]) -> TrailerMap {
    let text = String::from_utf8_lossy(raw);
    let mut map = TrailerMap::new();

    for line in text.trim().split("\r\n") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((name, value)) => {
                map.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => {
                map.insert(line.to_string(), String::new());
            }
        }
    }

    map
}
