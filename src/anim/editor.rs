//! Splice-based editor for the `AnimationClip:` block of a `.anim` document.

use std::ops::Range;

use serde_yaml::{Mapping, Value};

use super::curve::{FloatCurve, Keyframe, number_value};
use crate::{Error, Result};

/// Header line of the block this editor rewrites.
pub const CLIP_TAG: &str = "AnimationClip:";

/// Curve families that are not modeled and pass through untouched.
pub const UNSUPPORTED_CURVE_FIELDS: &[&str] = &[
    "m_RotationCurves",
    "m_CompressedRotationCurves",
    "m_EulerCurves",
    "m_PositionCurves",
    "m_ScaleCurves",
    "m_PPtrCurves",
];

/// Keyframes within this distance of a removal time are removed.
pub const TIME_TOLERANCE: f64 = 0.001;

const DOCUMENT: &str = "animation clip";

/// Location of the clip block inside the source text.
#[derive(Debug)]
struct ClipBlock {
    span: Range<usize>,
    indent: String,
    line_ending: &'static str,
}

/// Editor for the float curves of an animation clip.
///
/// Only the lines under the `AnimationClip:` header are ever rewritten.
/// Within that block, fields the editor does not change keep their source
/// text. The name, the float and editor curves, the generic bindings and
/// the start/stop times are re-serialized once they differ from the
/// parsed document.
///
/// # Example
///
/// ```rust
/// use unipkg::anim::{AnimationClipEditor, FloatCurve, Keyframe};
///
/// # fn main() -> unipkg::Result<()> {
/// let source = "--- !u!74 &7400000\nAnimationClip:\n  m_Name: Idle\n  m_FloatCurves: []\n";
/// let mut clip = AnimationClipEditor::parse(source)?;
/// clip.add_curve(
///     FloatCurve::new("m_Alpha", "", 225)
///         .with_keyframes([Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)]),
/// );
/// let edited = clip.export_to_yaml()?;
/// assert!(edited.starts_with("--- !u!74 &7400000\nAnimationClip:\n"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnimationClipEditor {
    source: String,
    span: Range<usize>,
    indent: String,
    line_ending: &'static str,
    baseline: Mapping,
    parsed_name: String,
    parsed_curves: Vec<FloatCurve>,
    name: String,
    curves: Vec<FloatCurve>,
}

/// A `key:` line at a given indent and the lines nested under it.
#[derive(Debug)]
struct Field<'a> {
    key: &'a str,
    span: Range<usize>,
}

/// Replacement for a field of the clip block.
#[derive(Debug)]
enum Patch {
    /// Write the whole field with this value.
    Value(Value),
    /// Replace only these children of a nested mapping.
    Children(Vec<(&'static str, Patch)>),
}

fn locate_block(text: &str) -> Option<ClipBlock> {
    let mut offset = 0;
    let mut lines = text.split_inclusive('\n');

    let mut body_start = None;
    for line in lines.by_ref() {
        offset += line.len();
        if line.trim_end_matches(['\r', '\n']).trim_end() == CLIP_TAG {
            body_start = Some(offset);
            break;
        }
    }
    let start = body_start?;

    let mut end = start;
    let mut indent = None;
    let mut line_ending = "\n";
    for line in lines {
        let content = line.trim_end_matches(['\r', '\n']);
        if !content.trim().is_empty() {
            if !content.starts_with([' ', '\t']) {
                break;
            }
            if indent.is_none() {
                let width = content.len() - content.trim_start_matches([' ', '\t']).len();
                indent = Some(content[..width].to_string());
                if line.ends_with("\r\n") {
                    line_ending = "\r\n";
                }
            }
            end = offset + line.len();
        }
        offset += line.len();
    }

    Some(ClipBlock {
        span: start..end,
        indent: indent.unwrap_or_default(),
        line_ending,
    })
}

/// Splits `text[range]` into the fields that start at exactly `indent`.
///
/// Lines before the first field form a field with an empty key.
fn fields<'a>(text: &'a str, range: Range<usize>, indent: &str) -> Vec<Field<'a>> {
    let mut fields: Vec<Field<'a>> = Vec::new();
    let mut offset = range.start;
    for line in text[range].split_inclusive('\n') {
        let end = offset + line.len();
        let key = line
            .strip_prefix(indent)
            .filter(|rest| !rest.starts_with([' ', '\t', '-', '#', '\r', '\n']))
            .and_then(|rest| rest.split_once(':'))
            .map(|(key, _)| key.trim());
        match key {
            Some(key) => fields.push(Field { key, span: offset..end }),
            None => match fields.last_mut() {
                Some(last) => last.span.end = end,
                None => fields.push(Field { key: "", span: offset..end }),
            },
        }
        offset = end;
    }
    fields
}

/// Returns the length of a field's header line and the indent of the
/// block mapping nested under it.
fn nested_indent(raw: &str, indent: &str) -> Option<(usize, String)> {
    let header = raw.find('\n')? + 1;
    let (_, value) = raw[..header].split_once(':')?;
    if !value.trim().is_empty() {
        return None;
    }
    let first = raw[header..].lines().find(|line| !line.trim().is_empty())?;
    let width = first.len() - first.trim_start_matches([' ', '\t']).len();
    (width > indent.len() && !first[width..].starts_with('-'))
        .then(|| (header, first[..width].to_string()))
}

/// Blank lines that close a field.
fn trailing_blank_lines(raw: &str) -> &str {
    let body = raw.trim_end().len();
    match raw[body..].find('\n') {
        Some(i) => &raw[body + i + 1..],
        None => "",
    }
}

/// Builds the full value of a patched field from its previous value.
fn resolve(patch: &Patch, previous: Option<&Value>) -> Value {
    match patch {
        Patch::Value(value) => value.clone(),
        Patch::Children(children) => {
            let mut map = previous
                .and_then(Value::as_mapping)
                .cloned()
                .unwrap_or_default();
            for (key, child) in children {
                let value = resolve(child, map.get(*key));
                map.insert((*key).into(), value);
            }
            Value::Mapping(map)
        }
    }
}

fn dedent(block: &str, indent: &str) -> String {
    let mut out = String::with_capacity(block.len());
    for line in block.lines() {
        let line = line.strip_prefix(indent).unwrap_or_else(|| line.trim_start());
        out.push_str(line);
        out.push('\n');
    }
    out
}

impl AnimationClipEditor {
    /// Parses a `.anim` document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] for empty input or an empty block,
    /// [`Error::BlockNotFound`] if there is no `AnimationClip:` header, and
    /// [`Error::Yaml`] if the block is not valid YAML.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::document(DOCUMENT, "document is empty"));
        }
        let block = locate_block(text).ok_or(Error::BlockNotFound { tag: CLIP_TAG })?;
        if block.span.is_empty() {
            return Err(Error::document(DOCUMENT, "clip block has no fields"));
        }

        let body = dedent(&text[block.span.clone()], &block.indent);
        let baseline = match serde_yaml::from_str::<Value>(&body)? {
            Value::Mapping(map) => map,
            _ => return Err(Error::document(DOCUMENT, "clip block is not a mapping")),
        };

        let name = match baseline.get("m_Name") {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let curves: Vec<FloatCurve> = baseline
            .get("m_FloatCurves")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().map(FloatCurve::from_yaml).collect())
            .unwrap_or_default();

        log::debug!(
            "parsed clip '{}': {} curves, block at {:?}",
            name,
            curves.len(),
            block.span
        );

        Ok(Self {
            source: text.to_string(),
            span: block.span,
            indent: block.indent,
            line_ending: block.line_ending,
            baseline,
            parsed_name: name.clone(),
            parsed_curves: curves.clone(),
            name,
            curves,
        })
    }

    /// Returns the clip name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the clip name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the float curves in document order.
    pub fn float_curves(&self) -> &[FloatCurve] {
        &self.curves
    }

    /// Returns the curve with the given identity.
    pub fn curve(&self, attribute: &str, path: &str) -> Option<&FloatCurve> {
        self.curves.iter().find(|c| c.is(attribute, path))
    }

    /// Inserts a curve, or replaces the keyframes of an existing curve with
    /// the same `(attribute, path)`.
    pub fn add_curve(&mut self, mut curve: FloatCurve) {
        curve.sort_keyframes();
        match self
            .curves
            .iter_mut()
            .find(|c| c.is(&curve.attribute, &curve.path))
        {
            Some(existing) => existing.keyframes = curve.keyframes,
            None => self.curves.push(curve),
        }
    }

    /// Removes the curve with the given identity. Returns `true` if one was removed.
    pub fn remove_curve(&mut self, attribute: &str, path: &str) -> bool {
        let before = self.curves.len();
        self.curves.retain(|c| !c.is(attribute, path));
        self.curves.len() != before
    }

    /// Adds a keyframe, keeping the curve sorted by time.
    ///
    /// Returns `false` without changes if the curve does not exist.
    pub fn add_keyframe(&mut self, attribute: &str, path: &str, keyframe: Keyframe) -> bool {
        let Some(curve) = self.curves.iter_mut().find(|c| c.is(attribute, path)) else {
            return false;
        };
        curve.keyframes.push(keyframe);
        curve.sort_keyframes();
        true
    }

    /// Removes every keyframe within [`TIME_TOLERANCE`] of `time`.
    ///
    /// Returns the number of keyframes removed.
    pub fn remove_keyframe(&mut self, attribute: &str, path: &str, time: f64) -> usize {
        let Some(curve) = self.curves.iter_mut().find(|c| c.is(attribute, path)) else {
            return 0;
        };
        let before = curve.keyframes.len();
        curve
            .keyframes
            .retain(|k| (k.time - time).abs() > TIME_TOLERANCE);
        before - curve.keyframes.len()
    }

    /// Lists unmodeled curve families that are present and non-empty.
    pub fn unsupported_curve_kinds(&self) -> Vec<&'static str> {
        UNSUPPORTED_CURVE_FIELDS
            .iter()
            .copied()
            .filter(|field| {
                self.baseline
                    .get(*field)
                    .and_then(Value::as_sequence)
                    .is_some_and(|seq| !seq.is_empty())
            })
            .collect()
    }

    /// Collects the fields that differ from the parsed document.
    ///
    /// Curve-derived fields are only rewritten once the curves have changed.
    fn patches(&self) -> Vec<(&'static str, Patch)> {
        let mut patches = Vec::new();
        if self.name != self.parsed_name {
            patches.push(("m_Name", Patch::Value(self.name.as_str().into())));
        }
        if self.curves == self.parsed_curves {
            return patches;
        }

        let previous: &[Value] = self
            .baseline
            .get("m_FloatCurves")
            .and_then(Value::as_sequence)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let float_curves = self
            .curves
            .iter()
            .map(|curve| {
                let base = previous
                    .iter()
                    .find(|entry| FloatCurve::from_yaml(entry).is(&curve.attribute, &curve.path));
                curve.to_float_entry(base)
            })
            .collect();
        patches.push(("m_FloatCurves", Patch::Value(Value::Sequence(float_curves))));

        let editor_curves = self.curves.iter().map(FloatCurve::to_editor_entry).collect();
        patches.push(("m_EditorCurves", Patch::Value(Value::Sequence(editor_curves))));

        let bindings = Value::Sequence(self.curves.iter().map(FloatCurve::to_binding).collect());
        let constant = match self.baseline.get("m_ClipBindingConstant") {
            Some(Value::Mapping(_)) => {
                Patch::Children(vec![("genericBindings", Patch::Value(bindings))])
            }
            _ => {
                let mut fresh = Mapping::new();
                fresh.insert("genericBindings".into(), bindings);
                fresh.insert("pptrCurveMapping".into(), Value::Sequence(Vec::new()));
                Patch::Value(Value::Mapping(fresh))
            }
        };
        patches.push(("m_ClipBindingConstant", constant));

        // With no keyframes the previous start/stop times are kept as they are.
        let range = self
            .curves
            .iter()
            .filter_map(FloatCurve::time_range)
            .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
        if let Some((start, stop)) = range {
            patches.push((
                "m_AnimationClipSettings",
                Patch::Children(vec![
                    ("m_StartTime", Patch::Value(number_value(start))),
                    ("m_StopTime", Patch::Value(number_value(stop))),
                ]),
            ));
        }

        patches
    }

    /// Serializes one `key: value` field at `indent`.
    fn emit(&self, key: &str, value: &Value, indent: &str) -> Result<String> {
        let mut field = Mapping::new();
        field.insert(key.into(), value.clone());
        let emitted = serde_yaml::to_string(&field)?;
        let emitted = emitted.strip_prefix("---\n").unwrap_or(&emitted);

        let mut out = String::with_capacity(emitted.len() + indent.len() * 8);
        for line in emitted.lines() {
            if !line.is_empty() {
                out.push_str(indent);
                out.push_str(line);
            }
            out.push_str(self.line_ending);
        }
        Ok(out)
    }

    /// Writes the fields of `range` to `out`, replacing patched ones.
    ///
    /// Unpatched fields are copied from the source byte for byte. Patches
    /// naming a field that does not exist are appended.
    fn splice(
        &self,
        out: &mut String,
        range: Range<usize>,
        indent: &str,
        patches: &[(&'static str, Patch)],
        base: Option<&Mapping>,
    ) -> Result<()> {
        let mut applied = vec![false; patches.len()];
        for field in fields(&self.source, range, indent) {
            let raw = &self.source[field.span.clone()];
            let Some(i) = patches.iter().position(|(key, _)| *key == field.key) else {
                out.push_str(raw);
                continue;
            };
            applied[i] = true;
            let previous = base.and_then(|map| map.get(field.key));

            if let Patch::Children(children) = &patches[i].1 {
                if let Some((header, child_indent)) = nested_indent(raw, indent) {
                    out.push_str(&raw[..header]);
                    let nested = previous.and_then(Value::as_mapping);
                    let children_range = field.span.start + header..field.span.end;
                    self.splice(out, children_range, &child_indent, children, nested)?;
                    continue;
                }
            }
            out.push_str(&self.emit(field.key, &resolve(&patches[i].1, previous), indent)?);
            out.push_str(trailing_blank_lines(raw));
        }

        for ((key, patch), done) in patches.iter().zip(applied) {
            if done {
                continue;
            }
            if !out.is_empty() && !out.ends_with('\n') {
                out.push_str(self.line_ending);
            }
            let previous = base.and_then(|map| map.get(*key));
            out.push_str(&self.emit(key, &resolve(patch, previous), indent)?);
        }
        Ok(())
    }

    /// Serializes the clip back into the full document.
    ///
    /// Only fields whose content changed are re-serialized. Every other line,
    /// inside the `AnimationClip:` block or outside it, is returned byte for
    /// byte.
    pub fn export_to_yaml(&self) -> Result<String> {
        let patches = self.patches();
        if patches.is_empty() {
            return Ok(self.source.clone());
        }

        let original = &self.source[self.span.clone()];
        let mut block = String::with_capacity(original.len() + original.len() / 4);
        self.splice(
            &mut block,
            self.span.clone(),
            &self.indent,
            &patches,
            Some(&self.baseline),
        )?;
        if !original.ends_with('\n') {
            let trimmed = block.trim_end_matches(['\r', '\n']).len();
            block.truncate(trimmed);
        }

        let mut out = String::with_capacity(self.source.len() + block.len());
        out.push_str(&self.source[..self.span.start]);
        out.push_str(&block);
        out.push_str(&self.source[self.span.end..]);
        log::debug!(
            "spliced clip '{}': {} fields rewritten, {} -> {} bytes",
            self.name,
            patches.len(),
            original.len(),
            block.len()
        );
        Ok(out)
    }
}
