//! Fuzz target for Package::import with arbitrary byte input.
//!
//! Exercises gzip/tar decoding and asset grouping with malformed or
//! adversarial input, looking for panics, hangs or runaway allocation.
//!
//! Run with: cargo +nightly fuzz run package_import

#![no_main]

use libfuzzer_sys::fuzz_target;
use unipkg::{ImportOptions, Package, ResourceLimits};

fuzz_target!(|data: &[u8]| {
    let limits = ResourceLimits::new()
        .max_entries(1024)
        .max_entry_size(1 << 20)
        .max_total_size(8 << 20);
    let options = ImportOptions::new().limits(limits);

    if let Ok(mut package) = Package::import_with_options(data, &options) {
        // Whatever was accepted must survive a round-trip.
        let bytes = package.export().expect("accepted package re-encodes");
        let again = Package::import(&bytes).expect("exported package decodes");
        assert_eq!(again, package);

        let first = package.paths().next().map(|p| p.to_string());
        if let Some(path) = first {
            let _ = package.replace_guid(&path, None);
        }
    }
});
