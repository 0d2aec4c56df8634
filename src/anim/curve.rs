//! Float curve model and its YAML mapping.

use serde_yaml::{Mapping, Value};

/// Default tangent weight Unity assigns to new keyframes.
pub const DEFAULT_WEIGHT: f64 = 1.0 / 3.0;

/// Keyframe serialization version written on export.
const KEYFRAME_VERSION: i64 = 3;

/// Curve serialization version written on export.
const CURVE_VERSION: i64 = 2;

/// `m_PreInfinity`/`m_PostInfinity` value meaning "clamp".
const WRAP_CLAMP_FOREVER: i64 = 2;

/// `m_RotationOrder` value for the default Euler order.
const ROTATION_ORDER: i64 = 4;

/// One sample of a float curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Time in seconds.
    pub time: f64,
    /// Sampled value.
    pub value: f64,
    /// Incoming tangent; may be infinite for stepped keys.
    pub in_slope: f64,
    /// Outgoing tangent; may be infinite for stepped keys.
    pub out_slope: f64,
    /// Packed tangent mode flags.
    pub tangent_mode: i64,
    /// Which tangent weights are active.
    pub weighted_mode: i64,
    /// Incoming tangent weight.
    pub in_weight: f64,
    /// Outgoing tangent weight.
    pub out_weight: f64,
}

impl Keyframe {
    /// Creates a flat keyframe with default weights.
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            in_slope: 0.0,
            out_slope: 0.0,
            tangent_mode: 0,
            weighted_mode: 0,
            in_weight: DEFAULT_WEIGHT,
            out_weight: DEFAULT_WEIGHT,
        }
    }

    /// Sets both tangents.
    pub fn with_slopes(mut self, in_slope: f64, out_slope: f64) -> Self {
        self.in_slope = in_slope;
        self.out_slope = out_slope;
        self
    }

    pub(crate) fn from_yaml(value: &Value) -> Self {
        Self {
            time: number_field(value, "time"),
            value: number_field(value, "value"),
            in_slope: number_field(value, "inSlope"),
            out_slope: number_field(value, "outSlope"),
            tangent_mode: int_field(value, "tangentMode"),
            weighted_mode: int_field(value, "weightedMode"),
            in_weight: number_field(value, "inWeight"),
            out_weight: number_field(value, "outWeight"),
        }
    }

    pub(crate) fn to_yaml(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("serializedVersion".into(), KEYFRAME_VERSION.into());
        map.insert("time".into(), number_value(self.time));
        map.insert("value".into(), number_value(self.value));
        map.insert("inSlope".into(), number_value(self.in_slope));
        map.insert("outSlope".into(), number_value(self.out_slope));
        map.insert("tangentMode".into(), self.tangent_mode.into());
        map.insert("weightedMode".into(), self.weighted_mode.into());
        map.insert("inWeight".into(), number_value(self.in_weight));
        map.insert("outWeight".into(), number_value(self.out_weight));
        Value::Mapping(map)
    }
}

/// A scalar property animated over time.
///
/// Curves are identified by the `(attribute, path)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatCurve {
    /// Animated property, e.g. `m_LocalPosition.x` or `material._Color.a`.
    pub attribute: String,
    /// Object path relative to the animated root; empty for the root itself.
    pub path: String,
    /// Unity class ID of the animated component.
    pub class_id: i64,
    /// Samples, ascending by time.
    pub keyframes: Vec<Keyframe>,
}

impl FloatCurve {
    /// Creates an empty curve.
    pub fn new(attribute: impl Into<String>, path: impl Into<String>, class_id: i64) -> Self {
        Self {
            attribute: attribute.into(),
            path: path.into(),
            class_id,
            keyframes: Vec::new(),
        }
    }

    /// Replaces the keyframes, sorting them by time.
    pub fn with_keyframes(mut self, keyframes: impl IntoIterator<Item = Keyframe>) -> Self {
        self.keyframes = keyframes.into_iter().collect();
        self.sort_keyframes();
        self
    }

    /// Returns `true` if this curve has the given identity.
    pub fn is(&self, attribute: &str, path: &str) -> bool {
        self.attribute == attribute && self.path == path
    }

    /// Stable-sorts keyframes ascending by time.
    pub fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }

    /// Returns the earliest and latest keyframe time.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let first = self.keyframes.first()?.time;
        Some(
            self.keyframes
                .iter()
                .fold((first, first), |(lo, hi), k| (lo.min(k.time), hi.max(k.time))),
        )
    }

    /// Reads an `m_FloatCurves` entry. Missing fields default to zero or empty.
    pub(crate) fn from_yaml(entry: &Value) -> Self {
        let keyframes = entry
            .get("curve")
            .and_then(|c| c.get("m_Curve"))
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().map(Keyframe::from_yaml).collect())
            .unwrap_or_default();
        Self {
            attribute: string_field(entry, "attribute"),
            path: string_field(entry, "path"),
            class_id: int_field(entry, "classID"),
            keyframes,
        }
    }

    /// Builds an `m_FloatCurves` entry.
    ///
    /// Fields of `base` that are not modeled here (wrap modes, flags) are
    /// kept; keyframes and identity are overwritten.
    pub(crate) fn to_float_entry(&self, base: Option<&Value>) -> Value {
        let Some(Value::Mapping(base)) = base else {
            return self.to_editor_entry();
        };
        let mut entry = base.clone();
        let mut curve = match entry.get("curve") {
            Some(Value::Mapping(curve)) => curve.clone(),
            _ => default_curve_mapping(),
        };
        curve.insert("m_Curve".into(), self.keyframes_yaml());
        entry.insert("curve".into(), Value::Mapping(curve));
        entry.insert("attribute".into(), self.attribute.as_str().into());
        entry.insert("path".into(), self.path.as_str().into());
        entry.insert("classID".into(), self.class_id.into());
        Value::Mapping(entry)
    }

    /// Builds a fresh curve entry with Unity's default wrap settings.
    pub(crate) fn to_editor_entry(&self) -> Value {
        let mut curve = default_curve_mapping();
        curve.insert("m_Curve".into(), self.keyframes_yaml());

        let mut entry = Mapping::new();
        entry.insert("curve".into(), Value::Mapping(curve));
        entry.insert("attribute".into(), self.attribute.as_str().into());
        entry.insert("path".into(), self.path.as_str().into());
        entry.insert("classID".into(), self.class_id.into());
        entry.insert("script".into(), null_reference());
        entry.insert("flags".into(), 0.into());
        Value::Mapping(entry)
    }

    /// Builds the generic binding Unity uses to resolve this curve at runtime.
    pub(crate) fn to_binding(&self) -> Value {
        let mut binding = Mapping::new();
        binding.insert("serializedVersion".into(), 2.into());
        binding.insert("path".into(), crc32fast::hash(self.path.as_bytes()).into());
        binding.insert(
            "attribute".into(),
            crc32fast::hash(self.attribute.as_bytes()).into(),
        );
        binding.insert("script".into(), null_reference());
        binding.insert("typeID".into(), self.class_id.into());
        binding.insert("customType".into(), 0.into());
        binding.insert("isPPtrCurve".into(), 0.into());
        binding.insert("isIntCurve".into(), 0.into());
        binding.insert("isSerializeReferenceCurve".into(), 0.into());
        Value::Mapping(binding)
    }

    fn keyframes_yaml(&self) -> Value {
        Value::Sequence(self.keyframes.iter().map(Keyframe::to_yaml).collect())
    }
}

fn default_curve_mapping() -> Mapping {
    let mut curve = Mapping::new();
    curve.insert("serializedVersion".into(), CURVE_VERSION.into());
    curve.insert("m_Curve".into(), Value::Sequence(Vec::new()));
    curve.insert("m_PreInfinity".into(), WRAP_CLAMP_FOREVER.into());
    curve.insert("m_PostInfinity".into(), WRAP_CLAMP_FOREVER.into());
    curve.insert("m_RotationOrder".into(), ROTATION_ORDER.into());
    curve
}

fn null_reference() -> Value {
    let mut script = Mapping::new();
    script.insert("fileID".into(), 0.into());
    Value::Mapping(script)
}

fn string_field(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn int_field(value: &Value, key: &str) -> i64 {
    match value.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn number_field(value: &Value, key: &str) -> f64 {
    value.get(key).map(read_number).unwrap_or(0.0)
}

/// Reads a YAML scalar as a float, accepting Unity's infinity spellings.
pub(crate) fn read_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number_token(s),
        _ => 0.0,
    }
}

fn parse_number_token(token: &str) -> f64 {
    let token = token.trim();
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let infinite = matches!(
        body.trim_start_matches('.').to_ascii_lowercase().as_str(),
        "inf" | "infinity"
    );
    if infinite {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    token.parse().unwrap_or(0.0)
}

/// Writes a float the way Unity does: `Infinity`/`-Infinity` tokens and no
/// fractional part for integral values.
pub(crate) fn number_value(n: f64) -> Value {
    if n.is_infinite() {
        let token = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return Value::String(token.to_string());
    }
    if n.is_nan() {
        return Value::String("NaN".to_string());
    }
    const EXACT_INT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < EXACT_INT {
        return Value::Number((n as i64).into());
    }
    Value::Number(n.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_keyframe_defaults() {
        let k = Keyframe::new(1.5, 2.0);
        assert_eq!(k.tangent_mode, 0);
        assert_eq!(k.weighted_mode, 0);
        assert!((k.in_weight - DEFAULT_WEIGHT).abs() < 1e-12);
        assert!((k.out_weight - DEFAULT_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_infinity_tokens() {
        assert_eq!(parse_number_token("Infinity"), f64::INFINITY);
        assert_eq!(parse_number_token("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_number_token(".inf"), f64::INFINITY);
        assert_eq!(parse_number_token("-.Inf"), f64::NEG_INFINITY);
        assert_eq!(parse_number_token("+INF"), f64::INFINITY);
        assert_eq!(parse_number_token("0.25"), 0.25);
        assert_eq!(parse_number_token("garbage"), 0.0);
    }

    #[test]
    fn test_number_value_forms() {
        assert_eq!(number_value(3.0), Value::Number(3.into()));
        assert_eq!(number_value(-0.0), Value::Number(0.into()));
        assert_eq!(number_value(0.5), Value::Number(0.5.into()));
        assert_eq!(number_value(f64::INFINITY), Value::String("Infinity".into()));
        assert_eq!(
            number_value(f64::NEG_INFINITY),
            Value::String("-Infinity".into())
        );
    }

    #[test]
    fn test_keyframe_reads_unity_yaml() {
        let v = parse(
            "serializedVersion: 3\ntime: 0.5\nvalue: 2\ninSlope: Infinity\noutSlope: -Infinity\n\
             tangentMode: 103\nweightedMode: 0\ninWeight: 0.33333334\noutWeight: 0.33333334\n",
        );
        let k = Keyframe::from_yaml(&v);
        assert_eq!(k.time, 0.5);
        assert_eq!(k.value, 2.0);
        assert_eq!(k.in_slope, f64::INFINITY);
        assert_eq!(k.out_slope, f64::NEG_INFINITY);
        assert_eq!(k.tangent_mode, 103);
        assert!((k.in_weight - 0.33333334).abs() < 1e-9);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let curve = FloatCurve::from_yaml(&parse("attribute: m_Alpha\n"));
        assert_eq!(curve.attribute, "m_Alpha");
        assert_eq!(curve.path, "");
        assert_eq!(curve.class_id, 0);
        assert!(curve.keyframes.is_empty());

        let k = Keyframe::from_yaml(&parse("time: wrong\n"));
        assert_eq!(k, Keyframe { in_weight: 0.0, out_weight: 0.0, ..Keyframe::new(0.0, 0.0) });
    }

    #[test]
    fn test_with_keyframes_sorts() {
        let curve = FloatCurve::new("a", "", 1).with_keyframes([
            Keyframe::new(2.0, 0.0),
            Keyframe::new(0.0, 1.0),
            Keyframe::new(1.0, 2.0),
        ]);
        let times: Vec<f64> = curve.keyframes.iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
        assert_eq!(curve.time_range(), Some((0.0, 2.0)));
        assert_eq!(FloatCurve::new("a", "", 1).time_range(), None);
    }

    #[test]
    fn test_binding_hashes() {
        let curve = FloatCurve::new("m_IsActive", "Body/Arm", 1);
        let binding = curve.to_binding();
        assert_eq!(
            binding.get("path").and_then(Value::as_u64),
            Some(u64::from(crc32fast::hash(b"Body/Arm")))
        );
        assert_eq!(
            binding.get("attribute").and_then(Value::as_u64),
            Some(u64::from(crc32fast::hash(b"m_IsActive")))
        );
        assert_eq!(binding.get("typeID").and_then(Value::as_i64), Some(1));
    }

    #[test]
    fn test_float_entry_keeps_unmodeled_fields() {
        let base = parse(
            "curve:\n  serializedVersion: 2\n  m_Curve: []\n  m_PreInfinity: 1\n  m_PostInfinity: 1\n  m_RotationOrder: 4\n\
             attribute: a\npath: p\nclassID: 23\nscript: {fileID: 0}\nflags: 16\n",
        );
        let curve = FloatCurve::new("a", "p", 23).with_keyframes([Keyframe::new(0.0, 1.0)]);
        let entry = curve.to_float_entry(Some(&base));
        assert_eq!(entry.get("flags").and_then(Value::as_i64), Some(16));
        let inner = entry.get("curve").unwrap();
        assert_eq!(inner.get("m_PreInfinity").and_then(Value::as_i64), Some(1));
        assert_eq!(inner.get("m_Curve").and_then(Value::as_sequence).map(Vec::len), Some(1));
    }

    #[test]
    fn test_editor_entry_defaults() {
        let entry = FloatCurve::new("a", "", 114).to_editor_entry();
        let inner = entry.get("curve").unwrap();
        assert_eq!(inner.get("m_PreInfinity").and_then(Value::as_i64), Some(2));
        assert_eq!(inner.get("m_PostInfinity").and_then(Value::as_i64), Some(2));
        assert_eq!(inner.get("m_RotationOrder").and_then(Value::as_i64), Some(4));
        assert_eq!(entry.get("flags").and_then(Value::as_i64), Some(0));
        assert_eq!(
            entry.get("script").and_then(|s| s.get("fileID")).and_then(Value::as_i64),
            Some(0)
        );
    }
}
