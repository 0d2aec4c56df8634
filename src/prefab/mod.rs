//! Script component editing for prefab and scene documents.
//!
//! A prefab is a stream of YAML documents, each introduced by a
//! `--- !u!<type> &<fileID>` line. This module never builds a structured
//! model of that stream: [`parse_components`] derives a fresh view from the
//! text on every call, and [`PrefabEditor`] edits the text directly.

use std::ops::Range;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::{Error, Result};

/// Type tag of script components.
pub const MONO_BEHAVIOUR_TYPE: &str = "114";

/// Line that opens the body of a script component.
pub const MONO_BEHAVIOUR_MARKER: &str = "MonoBehaviour:";

static DOCUMENT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!u!(\d+) &(-?\d+)").expect("static regex is valid"));

static SCRIPT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"m_Script:\s*\{fileID:\s*-?\d+,\s*guid:\s*([0-9a-fA-F]{32})")
        .expect("static regex is valid")
});

static FLAT_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^  ([^\s:#\-][^:]*):(?:[ \t]+(.*?))?[ \t]*$").expect("static regex is valid")
});

/// A script component, derived from the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabComponent {
    /// Document-local identifier from the `&<fileID>` anchor.
    pub file_id: String,
    /// Unity type tag from `!u!<type>`.
    pub unity_type: String,
    /// GUID of the script asset, if the component references one.
    pub script_guid: Option<String>,
    /// Top-level `key: value` properties in document order.
    pub properties: IndexMap<String, String>,
    /// The exact document text this component was read from.
    pub raw_span: String,
    /// Byte range of `raw_span` in the document.
    pub span: Range<usize>,
}

impl PrefabComponent {
    /// Returns the value of a top-level property.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    fn has_script(&self, guid: &str) -> bool {
        self.script_guid
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(guid))
    }
}

/// Byte ranges of the `---` separated documents in `text`.
fn document_spans(text: &str) -> Vec<Range<usize>> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.starts_with("---") {
            starts.push(offset);
        }
        offset += line.len();
    }
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| start..starts.get(i + 1).copied().unwrap_or(text.len()))
        .collect()
}

fn read_properties(segment: &str) -> IndexMap<String, String> {
    let mut properties = IndexMap::new();
    let mut lines = segment.lines();
    if !lines.by_ref().any(|line| line.trim_end() == MONO_BEHAVIOUR_MARKER) {
        return properties;
    }
    for line in lines {
        if let Some(caps) = FLAT_PROPERTY.captures(line) {
            let key = caps[1].trim_end().to_string();
            let value = caps.get(2).map_or("", |m| m.as_str()).to_string();
            properties.entry(key).or_insert(value);
        }
    }
    properties
}

fn read_component(text: &str, span: Range<usize>) -> Option<PrefabComponent> {
    let segment = &text[span.clone()];
    let header = segment.lines().next()?.trim_start_matches('-').trim_start();
    let caps = DOCUMENT_HEADER.captures(header)?;
    if &caps[1] != MONO_BEHAVIOUR_TYPE || !segment.contains(MONO_BEHAVIOUR_MARKER) {
        return None;
    }
    Some(PrefabComponent {
        file_id: caps[2].to_string(),
        unity_type: caps[1].to_string(),
        script_guid: SCRIPT_REFERENCE
            .captures(segment)
            .map(|c| c[1].to_string()),
        properties: read_properties(segment),
        raw_span: segment.to_string(),
        span,
    })
}

/// Derives the script components of a document.
pub fn parse_components(text: &str) -> Vec<PrefabComponent> {
    document_spans(text)
        .into_iter()
        .filter_map(|span| read_component(text, span))
        .collect()
}

/// Replaces the value of the first `key:` line in `span`.
///
/// Returns `None` when no such line exists.
fn replace_property(span: &str, key: &str, value: &str) -> Option<String> {
    let pattern = format!(r"(?m)^([ \t]+{}:)[ \t]*([^\r\n]*)", regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(span)?;
    let label = caps.get(1)?;
    let whole = caps.get(0)?;

    let mut out = String::with_capacity(span.len() + value.len());
    out.push_str(&span[..label.end()]);
    out.push(' ');
    out.push_str(value);
    out.push_str(&span[whole.end()..]);
    Some(out)
}

/// Text-splicing editor for script component properties.
///
/// # Example
///
/// ```rust
/// use unipkg::prefab::PrefabEditor;
///
/// let text = "--- !u!114 &11400000\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: 0123456789abcdef0123456789abcdef, type: 3}\n  speed: 5\n";
/// let mut prefab = PrefabEditor::new(text);
/// let changed = prefab.update_component_properties(
///     "0123456789abcdef0123456789abcdef",
///     [("speed", "7.5")],
/// );
/// assert_eq!(changed, 1);
/// assert!(prefab.export_to_yaml().contains("  speed: 7.5\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabEditor {
    text: String,
}

impl PrefabEditor {
    /// Wraps a document.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wraps a document stored as bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] if the bytes are not UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::document("prefab", format!("not UTF-8: {}", e)))?;
        Ok(Self::new(text))
    }

    /// Returns the script components currently in the document.
    pub fn components(&self) -> Vec<PrefabComponent> {
        parse_components(&self.text)
    }

    /// Returns the script component with the given file ID.
    pub fn component(&self, file_id: &str) -> Option<PrefabComponent> {
        self.components().into_iter().find(|c| c.file_id == file_id)
    }

    /// Returns components whose script reference matches `guid` (any case).
    pub fn find_components_by_script_guid(&self, guid: &str) -> Vec<PrefabComponent> {
        self.components()
            .into_iter()
            .filter(|c| c.has_script(guid))
            .collect()
    }

    /// Sets property values on every component using the script `guid`.
    ///
    /// Only the value after `key:` on the first matching line of each
    /// component changes; keys without such a line are ignored. Returns the
    /// number of components modified.
    pub fn update_component_properties<I, K, V>(&mut self, guid: &str, properties: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let properties: Vec<(K, V)> = properties.into_iter().collect();
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        for component in self.find_components_by_script_guid(guid) {
            let mut span = component.raw_span.clone();
            let mut touched = false;
            for (key, value) in &properties {
                if let Some(updated) = replace_property(&span, key.as_ref(), value.as_ref()) {
                    span = updated;
                    touched = true;
                }
            }
            if touched && span != component.raw_span {
                edits.push((component.span, span));
            }
        }

        edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
        let modified = edits.len();
        for (range, replacement) in edits {
            self.text.replace_range(range, &replacement);
        }
        log::debug!("updated {} components using script {}", modified, guid);
        modified
    }

    /// Returns the document text.
    pub fn export_to_yaml(&self) -> &str {
        &self.text
    }

    /// Consumes the editor, returning the document text.
    pub fn into_string(self) -> String {
        self.text
    }
}
