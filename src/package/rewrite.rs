//! GUID reference rewriting.
//!
//! Assets refer to each other by embedding the target's GUID as plain text
//! (`{fileID: 11500000, guid: <hex>, type: 3}` and friends). Re-keying an
//! asset therefore means scanning every decodable text blob in the package
//! and replacing occurrences of the old GUID.
//!
//! A match only counts when it is not glued to another hexadecimal digit on
//! either side, so a GUID that happens to be a substring of a longer hex run
//! (a hash, another identifier) is left alone.

use std::sync::LazyLock;

use regex::Regex;

use super::Asset;
use crate::Guid;

static META_GUID_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^guid:[ \t]*[0-9a-fA-F]{32}\b").expect("static regex is valid")
});

/// Counts of what a rewrite touched.
#[must_use = "rewrite report should be checked to see what was modified"]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Number of payloads that were re-encoded.
    pub payloads_rewritten: usize,
    /// Number of sidecar metadata blobs that were re-encoded.
    pub metas_rewritten: usize,
    /// Total number of replaced occurrences.
    pub occurrences: usize,
}

impl RewriteReport {
    /// Returns the number of blobs that changed.
    pub fn blobs_rewritten(&self) -> usize {
        self.payloads_rewritten + self.metas_rewritten
    }
}

/// Returns the byte offsets of boundary-safe occurrences of `needle` in `text`.
fn boundary_matches<'a>(text: &'a str, needle: &'a str) -> impl Iterator<Item = usize> + 'a {
    let bytes = text.as_bytes();
    text.match_indices(needle).filter_map(move |(start, m)| {
        let end = start + m.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_hexdigit();
        let after_ok = end == bytes.len() || !bytes[end].is_ascii_hexdigit();
        (before_ok && after_ok).then_some(start)
    })
}

/// Returns `true` if `text` contains a boundary-safe occurrence of `guid`.
pub fn contains_guid(text: &str, guid: &Guid) -> bool {
    boundary_matches(text, guid.as_str()).next().is_some()
}

/// Replaces every boundary-safe occurrence of `old` in `text` with `new`.
///
/// Returns the rewritten text and the number of replacements, or `None` if
/// nothing matched.
pub fn replace_guid_in_text(text: &str, old: &Guid, new: &Guid) -> Option<(String, usize)> {
    let needle = old.as_str();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for start in boundary_matches(text, needle) {
        out.push_str(&text[last..start]);
        out.push_str(new.as_str());
        last = start + needle.len();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    out.push_str(&text[last..]);
    Some((out, count))
}

/// Rewrites `blob` in place if it is UTF-8 and mentions `old`.
///
/// Binary blobs are skipped silently. Returns the number of replacements.
fn rewrite_blob(blob: &mut Vec<u8>, old: &Guid, new: &Guid) -> usize {
    let Ok(text) = std::str::from_utf8(blob) else {
        return 0;
    };
    match replace_guid_in_text(text, old, new) {
        Some((rewritten, count)) => {
            *blob = rewritten.into_bytes();
            count
        }
        None => 0,
    }
}

/// Rewrites references to `old` in the payload and sidecar of every asset.
pub(crate) fn rewrite_references<'a>(
    old: &Guid,
    new: &Guid,
    assets: impl IntoIterator<Item = &'a mut Asset>,
) -> RewriteReport {
    let mut report = RewriteReport::default();
    for asset in assets {
        let count = rewrite_blob(&mut asset.payload, old, new);
        if count > 0 {
            report.payloads_rewritten += 1;
            report.occurrences += count;
        }
        if let Some(meta) = asset.meta.as_mut() {
            let count = rewrite_blob(meta, old, new);
            if count > 0 {
                report.metas_rewritten += 1;
                report.occurrences += count;
            }
        }
    }
    report
}

/// Replaces the `guid:` declaration line of a sidecar.
///
/// Returns `None` when the sidecar is not UTF-8 or has no such line.
pub fn rewrite_meta_guid(meta: &[u8], new: &Guid) -> Option<Vec<u8>> {
    let text = std::str::from_utf8(meta).ok()?;
    let found = META_GUID_LINE.find(text)?;
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..found.start()]);
    out.push_str("guid: ");
    out.push_str(new.as_str());
    out.push_str(&text[found.end()..]);
    Some(out.into_bytes())
}

/// Reads the GUID declared by a sidecar's `guid:` line.
pub fn meta_guid(meta: &[u8]) -> Option<Guid> {
    let text = std::str::from_utf8(meta).ok()?;
    let line = META_GUID_LINE.find(text)?.as_str();
    Guid::parse(line.trim_start_matches("guid:").trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD: &str = "0123456789abcdef0123456789abcdef";
    const NEW: &str = "fedcba9876543210fedcba9876543210";

    fn old() -> Guid {
        Guid::parse(OLD).unwrap()
    }

    fn new() -> Guid {
        Guid::parse(NEW).unwrap()
    }

    #[test]
    fn test_replace_plain_reference() {
        let text = format!("m_Script: {{fileID: 11500000, guid: {}, type: 3}}", OLD);
        let (out, count) = replace_guid_in_text(&text, &old(), &new()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(out, format!("m_Script: {{fileID: 11500000, guid: {}, type: 3}}", NEW));
    }

    #[test]
    fn test_boundary_safety() {
        let text = format!("a {OLD}\nb f{OLD}\nc {OLD}f\nd f{OLD}f\n");
        let (out, count) = replace_guid_in_text(&text, &old(), &new()).unwrap();
        assert_eq!(count, 1);
        assert_eq!(out, format!("a {NEW}\nb f{OLD}\nc {OLD}f\nd f{OLD}f\n"));
    }

    #[test]
    fn test_match_at_text_edges() {
        let text = format!("{OLD}-{OLD}");
        let (out, count) = replace_guid_in_text(&text, &old(), &new()).unwrap();
        assert_eq!(count, 2);
        assert_eq!(out, format!("{NEW}-{NEW}"));
    }

    #[test]
    fn test_no_match_returns_none() {
        assert!(replace_guid_in_text("nothing here", &old(), &new()).is_none());
        assert!(!contains_guid(&format!("0{OLD}"), &old()));
        assert!(contains_guid(&format!("guid: {OLD}"), &old()));
    }

    #[test]
    fn test_binary_blob_skipped() {
        let mut blob = vec![0xff, 0xfe, 0x00];
        blob.extend_from_slice(OLD.as_bytes());
        let before = blob.clone();
        assert_eq!(rewrite_blob(&mut blob, &old(), &new()), 0);
        assert_eq!(blob, before);
    }

    #[test]
    fn test_rewrite_meta_guid_line() {
        let meta = format!("fileFormatVersion: 2\nguid: {OLD}\nTextScriptImporter:\n");
        let out = rewrite_meta_guid(meta.as_bytes(), &new()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("fileFormatVersion: 2\nguid: {NEW}\nTextScriptImporter:\n")
        );
    }

    #[test]
    fn test_rewrite_meta_guid_crlf() {
        let meta = format!("fileFormatVersion: 2\r\nguid: {OLD}\r\n");
        let out = rewrite_meta_guid(meta.as_bytes(), &new()).unwrap();
        assert_eq!(out, format!("fileFormatVersion: 2\r\nguid: {NEW}\r\n").into_bytes());
    }

    #[test]
    fn test_meta_guid_reads_declaration() {
        let meta = format!("fileFormatVersion: 2\nguid: {OLD}\n");
        assert_eq!(meta_guid(meta.as_bytes()), Some(old()));
        assert_eq!(meta_guid(b"fileFormatVersion: 2\n"), None);
    }

    #[test]
    fn test_rewrite_meta_without_guid_line() {
        assert!(rewrite_meta_guid(b"fileFormatVersion: 2\n", &new()).is_none());
    }
}
