//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use unipkg::codec::{ArchiveEntry, EntryMap};
use unipkg::{ExportOptions, Guid, Package};

pub const SCRIPT_GUID: &str = "0123456789abcdef0123456789abcdef";
pub const PREFAB_GUID: &str = "fedcba9876543210fedcba9876543210";
pub const TEXTURE_GUID: &str = "00112233445566778899aabbccddeeff";

pub fn guid(s: &str) -> Guid {
    Guid::parse(s).expect("test GUID is valid")
}

/// Minimal sidecar for `guid`.
pub fn meta(guid: &str) -> Vec<u8> {
    format!("fileFormatVersion: 2\nguid: {}\nMonoImporter:\n  serializedVersion: 2\n", guid).into_bytes()
}

/// A prefab with one script component referencing [`SCRIPT_GUID`].
pub fn prefab_text() -> String {
    format!(
        "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1 &100000
GameObject:
  m_Name: Hero
--- !u!114 &11400000
MonoBehaviour:
  m_GameObject: {{fileID: 100000}}
  m_Enabled: 1
  m_Script: {{fileID: 11500000, guid: {SCRIPT_GUID}, type: 3}}
  m_Name:
  speed: 5
  jumpHeight: 2.5
"
    )
}

/// Stand-in image payload. Only the `.png` extension matters to the store.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

/// Script, prefab (referencing the script) and texture with a preview.
pub fn sample_package() -> Package {
    let mut package = Package::new();
    package
        .add_asset(
            "Assets/Scripts/Hero.cs",
            guid(SCRIPT_GUID),
            b"public class Hero : MonoBehaviour {}\n".to_vec(),
            Some(meta(SCRIPT_GUID)),
        )
        .expect("add script");
    package
        .add_asset(
            "Assets/Hero.prefab",
            guid(PREFAB_GUID),
            prefab_text().into_bytes(),
            Some(meta(PREFAB_GUID)),
        )
        .expect("add prefab");
    package
        .add_asset(
            "Assets/Textures/Hero.png",
            guid(TEXTURE_GUID),
            FAKE_PNG.to_vec(),
            Some(meta(TEXTURE_GUID)),
        )
        .expect("add texture");
    package
        .asset_mut("Assets/Textures/Hero.png")
        .expect("texture present")
        .preview = Some(FAKE_PNG.to_vec());
    package
}

/// Builds raw archive entries: `(guid, pathname, payload, meta)`.
pub fn entries(assets: &[(&str, &str, &[u8], Option<&[u8]>)]) -> EntryMap {
    let mut map = EntryMap::new();
    for (guid, path, payload, meta) in assets {
        map.insert(format!("{guid}/pathname"), ArchiveEntry::file(path.as_bytes()));
        map.insert(format!("{guid}/asset"), ArchiveEntry::file(payload.to_vec()));
        if let Some(meta) = meta {
            map.insert(format!("{guid}/asset.meta"), ArchiveEntry::file(meta.to_vec()));
        }
    }
    map
}

/// Encodes raw entries into package bytes.
pub fn encode(entries: &EntryMap) -> Vec<u8> {
    unipkg::codec::encode(entries, &ExportOptions::default()).expect("encode entries")
}
