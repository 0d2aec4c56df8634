//! Tests for resource limit enforcement.
//!
//! These tests verify that import refuses packages exceeding the configured
//! limits (entry count, single entry size, total unpacked size) and that
//! default limits accept ordinary packages.
//!
//! Note: builder tests for `ResourceLimits` are in src/options.rs.

mod common;

use unipkg::{Error, ErrorKind, ImportOptions, Package, ResourceLimits};

fn import_with(limits: ResourceLimits, bytes: &[u8]) -> unipkg::Result<Package> {
    Package::import_with_options(bytes, &ImportOptions::new().limits(limits))
}

#[test]
fn test_default_limits_accept_sample() {
    let bytes = common::sample_package().export().unwrap();
    let package = import_with(ResourceLimits::default(), &bytes).unwrap();
    assert_eq!(package.len(), 3);
}

#[test]
fn test_unlimited_accepts_sample() {
    let bytes = common::sample_package().export().unwrap();
    assert!(import_with(ResourceLimits::unlimited(), &bytes).is_ok());
}

#[test]
fn test_entry_count_limit() {
    // 3 assets: 3 pathnames, 3 payloads, 3 sidecars and one preview.
    let bytes = common::sample_package().export().unwrap();
    assert!(import_with(ResourceLimits::new().max_entries(10), &bytes).is_ok());

    let err = import_with(ResourceLimits::new().max_entries(9), &bytes).unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
    assert_eq!(err.kind(), ErrorKind::Limit);
}

#[test]
fn test_entry_size_limit() {
    let big = vec![b'x'; 64 * 1024];
    let entries = common::entries(&[(common::SCRIPT_GUID, "Assets/Big.txt", &big, None)]);
    let bytes = common::encode(&entries);

    assert!(import_with(ResourceLimits::new().max_entry_size(64 * 1024), &bytes).is_ok());
    let err = import_with(ResourceLimits::new().max_entry_size(64 * 1024 - 1), &bytes).unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
}

#[test]
fn test_total_size_limit_stops_inflation() {
    // Highly compressible payload: a few KB on the wire, 4 MiB unpacked.
    let bomb = vec![0u8; 4 << 20];
    let entries = common::entries(&[(common::SCRIPT_GUID, "Assets/Bomb.bytes", &bomb, None)]);
    let bytes = common::encode(&entries);
    assert!(bytes.len() < 64 * 1024);

    let err = import_with(ResourceLimits::new().max_total_size(1 << 20), &bytes).unwrap_err();
    assert!(matches!(err, Error::ResourceLimitExceeded(_)));
}

#[test]
fn test_limit_error_message_names_limit() {
    let bytes = common::sample_package().export().unwrap();
    let err = import_with(ResourceLimits::new().max_entries(2), &bytes).unwrap_err();
    assert!(err.to_string().contains("more than 2 entries"), "{err}");
}
