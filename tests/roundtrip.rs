//! Package round-trip tests.
//!
//! These tests verify that importing an exported package reproduces every
//! asset field for field, and that the container carries the header record
//! the Unity importer expects.

mod common;

use std::io::Read;

use flate2::read::GzDecoder;
use unipkg::codec::{ORIGINAL_NAME, gzip_header};
use unipkg::{ExportOptions, Package};

fn assert_same_assets(a: &Package, b: &Package) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.assets().zip(b.assets()) {
        assert_eq!(x.guid(), y.guid());
        assert_eq!(x.path(), y.path());
        assert_eq!(x.payload, y.payload);
        assert_eq!(x.meta, y.meta);
        assert_eq!(x.preview, y.preview);
    }
}

#[test]
fn test_roundtrip_preserves_assets() {
    let package = common::sample_package();
    let bytes = package.export().unwrap();
    let reloaded = Package::import(&bytes).unwrap();
    assert_same_assets(&package, &reloaded);
    assert_eq!(package, reloaded);
}

#[test]
fn test_three_successive_roundtrips() {
    let original = common::sample_package();
    let mut current = original.clone();
    for _ in 0..3 {
        current = Package::import(&current.export().unwrap()).unwrap();
        assert_same_assets(&original, &current);
    }
}

#[test]
fn test_export_is_deterministic() {
    let package = common::sample_package();
    assert_eq!(package.export().unwrap(), package.export().unwrap());
}

#[test]
fn test_header_carries_original_name() {
    let bytes = common::sample_package().export().unwrap();
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    assert_ne!(bytes[3] & gzip_header::FLAG_FNAME, 0);
    assert_eq!(gzip_header::original_name(&bytes).as_deref(), Some(ORIGINAL_NAME));
    assert_eq!(ORIGINAL_NAME, "archtemp.tar");

    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut tar = Vec::new();
    decoder.read_to_end(&mut tar).unwrap();
    let header = decoder.header().unwrap();
    assert_eq!(header.filename(), Some(ORIGINAL_NAME.as_bytes()));
}

#[test]
fn test_archive_layout() {
    let bytes = common::sample_package().export().unwrap();
    let mut tar = Vec::new();
    GzDecoder::new(bytes.as_slice()).read_to_end(&mut tar).unwrap();

    let mut archive = tar::Archive::new(tar.as_slice());
    let names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();

    let g = common::TEXTURE_GUID;
    assert!(names.contains(&format!("{g}/pathname")));
    assert!(names.contains(&format!("{g}/asset")));
    assert!(names.contains(&format!("{g}/asset.meta")));
    assert!(names.contains(&format!("{g}/preview.png")));
    assert!(!names.contains(&format!("{}/preview.png", common::SCRIPT_GUID)));
    assert_eq!(names.len(), 3 * 3 + 1);
}

#[test]
fn test_compression_levels_roundtrip() {
    let package = common::sample_package();
    for level in [0, 1, 9] {
        let options = ExportOptions::new().level(level).unwrap();
        let bytes = package.export_with_options(&options).unwrap();
        assert_eq!(Package::import(&bytes).unwrap(), package);
    }
}

#[test]
fn test_import_trims_pathname_and_skips_folders() {
    let entries = common::entries(&[
        (common::SCRIPT_GUID, "Assets/A.cs\n", b"class A {}", None),
        (common::PREFAB_GUID, "  Assets/B.txt  ", b"b", Some(&b"guid: x"[..])),
    ]);
    let mut entries = entries;
    // Folder assets carry a pathname and sidecar but no payload.
    entries.insert(
        format!("{}/pathname", common::TEXTURE_GUID),
        unipkg::codec::ArchiveEntry::file(b"Assets/Folder".to_vec()),
    );

    let package = Package::import(&common::encode(&entries)).unwrap();
    assert_eq!(package.len(), 2);
    assert!(package.contains_path("Assets/A.cs"));
    assert!(package.contains_path("Assets/B.txt"));
    assert!(!package.contains_path("Assets/Folder"));
    assert!(package.asset("Assets/A.cs").unwrap().meta.is_none());
}

#[test]
fn test_empty_package_roundtrip() {
    let bytes = Package::new().export().unwrap();
    assert!(Package::import(&bytes).unwrap().is_empty());
}
