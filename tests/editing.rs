//! Asset graph editing tests.
//!
//! These tests verify rename, add and remove operations and the invariant
//! that GUIDs and paths stay unique and indexed in both directions.

mod common;

use common::{PREFAB_GUID, SCRIPT_GUID, TEXTURE_GUID};
use unipkg::{Error, Guid, Package};

fn assert_indexes_consistent(package: &Package) {
    let mut guids = std::collections::HashSet::new();
    for asset in package.assets() {
        assert!(guids.insert(asset.guid().clone()), "duplicate GUID {}", asset.guid());
        assert_eq!(package.guid_of(asset.path().as_str()), Some(asset.guid()));
        assert_eq!(package.path_of(asset.guid()), Some(asset.path()));
    }
    assert_eq!(guids.len(), package.len());
}

#[test]
fn test_rename_moves_asset() {
    let mut package = common::sample_package();
    let before = package.asset("Assets/Hero.prefab").unwrap().clone();

    assert!(package.rename("Assets/Hero.prefab", "Assets/Prefabs/Hero.prefab").unwrap());

    assert_eq!(package.len(), 3);
    assert!(!package.contains_path("Assets/Hero.prefab"));
    let after = package.asset("Assets/Prefabs/Hero.prefab").unwrap();
    assert_eq!(after.guid(), before.guid());
    assert_eq!(after.payload, before.payload);
    assert_eq!(after.meta, before.meta);
    assert_indexes_consistent(&package);

    let reloaded = Package::import(&package.export().unwrap()).unwrap();
    assert_eq!(
        reloaded.path_of(&common::guid(PREFAB_GUID)).unwrap().as_str(),
        "Assets/Prefabs/Hero.prefab"
    );
}

#[test]
fn test_rename_missing_is_false() {
    let mut package = common::sample_package();
    assert!(!package.rename("Assets/Missing.cs", "Assets/Other.cs").unwrap());
    assert_eq!(package, common::sample_package());
}

#[test]
fn test_rename_collision() {
    let mut package = common::sample_package();
    let err = package
        .rename("Assets/Hero.prefab", "Assets/Scripts/Hero.cs")
        .unwrap_err();
    assert!(matches!(err, Error::PathCollision { .. }));
    assert_eq!(package, common::sample_package());
}

#[test]
fn test_rename_rejects_invalid_path() {
    let mut package = common::sample_package();
    for bad in ["", "/Assets/Abs.cs", "Assets/../Up.cs", "Assets\\Win.cs", "Assets//Double.cs"] {
        let err = package.rename("Assets/Hero.prefab", bad).unwrap_err();
        assert!(matches!(err, Error::InvalidAssetPath(_)), "{bad:?} accepted");
    }
    assert_indexes_consistent(&package);
}

#[test]
fn test_rename_then_replace_guid() {
    let mut package = common::sample_package();
    package.rename("Assets/Scripts/Hero.cs", "Assets/Scripts/Player.cs").unwrap();
    let change = package
        .replace_guid("Assets/Scripts/Player.cs", None)
        .unwrap()
        .unwrap();
    assert_eq!(change.old.as_str(), SCRIPT_GUID);
    assert_indexes_consistent(&package);

    let prefab = package.asset("Assets/Hero.prefab").unwrap().payload_text().unwrap();
    assert!(prefab.contains(change.new.as_str()));
}

#[test]
fn test_add_and_remove() {
    let mut package = common::sample_package();
    let guid = Guid::generate();
    package
        .add_asset(
            "Assets/Docs/readme.txt",
            guid.clone(),
            b"read me".to_vec(),
            Some(Package::generate_meta(&guid)),
        )
        .unwrap();
    assert_eq!(package.len(), 4);
    assert_indexes_consistent(&package);

    let removed = package.remove_asset("Assets/Textures/Hero.png").unwrap();
    assert_eq!(removed.guid().as_str(), TEXTURE_GUID);
    assert!(!package.contains_guid(&common::guid(TEXTURE_GUID)));
    assert_eq!(package.len(), 3);
    assert_indexes_consistent(&package);

    let reloaded = Package::import(&package.export().unwrap()).unwrap();
    assert_eq!(reloaded, package);
}

#[test]
fn test_generate_meta_declares_guid() {
    let guid = common::guid(SCRIPT_GUID);
    let meta = Package::generate_meta(&guid);
    assert_eq!(
        unipkg::package::rewrite::meta_guid(&meta).as_ref(),
        Some(&guid)
    );
}

#[test]
fn test_set_payload_for_editor_writeback() {
    let mut package = common::sample_package();
    let text = package
        .asset("Assets/Hero.prefab")
        .and_then(|a| a.payload_text())
        .unwrap()
        .replace("speed: 5", "speed: 6");
    assert!(package.set_payload("Assets/Hero.prefab", text.clone()));
    assert_eq!(
        package.asset("Assets/Hero.prefab").unwrap().payload_text(),
        Some(text.as_str())
    );
}
