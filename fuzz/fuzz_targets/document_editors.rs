//! Fuzz target for the animation clip and prefab editors.
//!
//! Feeds arbitrary text to both parsers and checks that exporting an
//! unedited prefab gives back the input.
//!
//! Run with: cargo +nightly fuzz run document_editors

#![no_main]

use libfuzzer_sys::fuzz_target;
use unipkg::anim::AnimationClipEditor;
use unipkg::prefab::PrefabEditor;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(clip) = AnimationClipEditor::parse(text) {
        let _ = clip.export_to_yaml();
    }

    let mut prefab = PrefabEditor::new(text);
    assert_eq!(prefab.export_to_yaml(), text);
    for component in prefab.components() {
        if let Some(guid) = component.script_guid.clone() {
            let _ = prefab.update_component_properties(&guid, [("m_Enabled", "0")]);
        }
    }
});
