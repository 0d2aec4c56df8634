//! Animation clip editing.
//!
//! [`AnimationClipEditor`] models the float curves of a `.anim` document and
//! splices its changes back into the original text. Other curve families
//! (positions, rotations, scales, object references) are kept verbatim; see
//! [`AnimationClipEditor::unsupported_curve_kinds`].

mod curve;
mod editor;

pub use curve::{DEFAULT_WEIGHT, FloatCurve, Keyframe};
pub use editor::{AnimationClipEditor, CLIP_TAG, TIME_TOLERANCE, UNSUPPORTED_CURVE_FIELDS};
