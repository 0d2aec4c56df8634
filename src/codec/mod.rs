//! Package archive codec.
//!
//! A package is a gzip-compressed tar stream. This module turns such a stream
//! into a flat map of entry names to blobs and back again. Grouping entries
//! into assets is the job of [`crate::package`].
//!
//! Every encoded stream gets an FNAME record in its gzip header (see
//! [`gzip_header`]); the importer of the reference consumer relies on it.

pub mod gzip_header;

use std::collections::BTreeMap;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::options::{ExportOptions, ResourceLimits};
use crate::{Error, Result};

pub use gzip_header::{ORIGINAL_NAME, inject_original_name, original_name};

/// A single named blob in a package archive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArchiveEntry {
    /// Entry contents (empty for directories).
    pub data: Vec<u8>,
    /// Whether the tar header marks this entry as a directory.
    pub is_directory: bool,
}

impl ArchiveEntry {
    /// Creates a regular file entry.
    pub fn file(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            is_directory: false,
        }
    }

    /// Creates a directory entry.
    pub fn directory() -> Self {
        Self {
            data: Vec::new(),
            is_directory: true,
        }
    }
}

/// Entries of an archive keyed by normalized name.
pub type EntryMap = BTreeMap<String, ArchiveEntry>;

/// Normalizes a tar entry name: strips leading `./` and trailing `/`.
fn normalize_name(raw: &str) -> &str {
    let mut name = raw;
    while let Some(rest) = name.strip_prefix("./") {
        name = rest;
    }
    name.trim_end_matches('/')
}

/// Decodes a gzip-compressed tar stream into named entries.
///
/// # Errors
///
/// Returns [`Error::InvalidArchive`] for empty input, a missing gzip
/// signature, a corrupt deflate stream or a malformed tar stream, and
/// [`Error::ResourceLimitExceeded`] when `limits` are exceeded.
pub fn decode(data: &[u8], limits: &ResourceLimits) -> Result<EntryMap> {
    if data.is_empty() {
        return Err(Error::InvalidArchive("empty input".into()));
    }
    if data.len() < 2 || data[..2] != gzip_header::GZIP_MAGIC {
        return Err(Error::InvalidArchive("missing gzip signature".into()));
    }

    let mut tar_bytes = Vec::new();
    GzDecoder::new(data)
        .take(limits.max_total_size.saturating_add(1))
        .read_to_end(&mut tar_bytes)
        .map_err(|e| Error::InvalidArchive(format!("gzip stream: {}", e)))?;
    if tar_bytes.len() as u64 > limits.max_total_size {
        return Err(Error::ResourceLimitExceeded(format!(
            "unpacked package exceeds {} bytes",
            limits.max_total_size
        )));
    }
    log::debug!(
        "inflated package: {} -> {} bytes",
        data.len(),
        tar_bytes.len()
    );

    let mut archive = tar::Archive::new(tar_bytes.as_slice());
    let entries = archive
        .entries()
        .map_err(|e| Error::InvalidArchive(format!("tar stream: {}", e)))?;

    let mut map = EntryMap::new();
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::InvalidArchive(format!("tar entry: {}", e)))?;

        if map.len() >= limits.max_entries {
            return Err(Error::ResourceLimitExceeded(format!(
                "package has more than {} entries",
                limits.max_entries
            )));
        }

        let size = entry.size();
        if size > limits.max_entry_size {
            return Err(Error::ResourceLimitExceeded(format!(
                "entry of {} bytes exceeds limit of {} bytes",
                size, limits.max_entry_size
            )));
        }

        let raw_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let name = normalize_name(&raw_name).to_string();
        if name.is_empty() {
            continue;
        }

        let entry_type = entry.header().entry_type();
        let decoded = if entry_type.is_dir() {
            ArchiveEntry::directory()
        } else if entry_type.is_file() || entry_type.is_gnu_sparse() {
            let mut buf = Vec::with_capacity(entry_capacity(size, tar_bytes.len()));
            entry
                .read_to_end(&mut buf)
                .map_err(|e| Error::InvalidArchive(format!("entry '{}': {}", name, e)))?;
            ArchiveEntry::file(buf)
        } else {
            log::debug!("skipping tar entry '{}' of type {:?}", name, entry_type);
            continue;
        };

        log::trace!("decoded entry '{}' ({} bytes)", name, decoded.data.len());
        map.insert(name, decoded);
    }

    Ok(map)
}

/// Buffer size for an entry whose header declares `declared` bytes.
///
/// An entry can never hold more than the inflated stream, whatever its
/// header says.
fn entry_capacity(declared: u64, available: usize) -> usize {
    declared.min(available as u64) as usize
}

/// Encodes entries into a gzip-compressed tar stream.
///
/// The gzip header always carries [`ORIGINAL_NAME`] as its FNAME record.
pub fn encode(entries: &EntryMap, options: &ExportOptions) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());

    for (name, entry) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_mtime(options.mtime);
        if entry.is_directory {
            header.set_entry_type(tar::EntryType::Directory);
            header.set_mode(0o755);
            header.set_size(0);
            builder.append_data(&mut header, format!("{}/", name), std::io::empty())?;
        } else {
            header.set_entry_type(tar::EntryType::Regular);
            header.set_mode(0o644);
            header.set_size(entry.data.len() as u64);
            builder.append_data(&mut header, name, entry.data.as_slice())?;
        }
    }

    let tar_bytes = builder.into_inner()?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(options.level));
    encoder.write_all(&tar_bytes)?;
    let compressed = encoder.finish()?;
    log::debug!(
        "encoded {} entries: {} -> {} bytes",
        entries.len(),
        tar_bytes.len(),
        compressed.len()
    );

    inject_original_name(&compressed, ORIGINAL_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> EntryMap {
        let mut map = EntryMap::new();
        map.insert("abc/pathname".into(), ArchiveEntry::file(b"Assets/a.txt".to_vec()));
        map.insert("abc/asset".into(), ArchiveEntry::file(b"hello".to_vec()));
        map.insert("abc".into(), ArchiveEntry::directory());
        map
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let entries = sample_entries();
        let bytes = encode(&entries, &ExportOptions::default()).unwrap();
        let decoded = decode(&bytes, &ResourceLimits::default()).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_encode_sets_original_name() {
        let bytes = encode(&sample_entries(), &ExportOptions::default()).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        assert_ne!(bytes[3] & gzip_header::FLAG_FNAME, 0);
        assert_eq!(original_name(&bytes).as_deref(), Some(ORIGINAL_NAME));
    }

    #[test]
    fn test_entry_capacity_is_bounded_by_stream() {
        assert_eq!(entry_capacity(3 << 30, 4096), 4096);
        assert_eq!(entry_capacity(10, 4096), 10);
        assert_eq!(entry_capacity(0, 0), 0);
    }

    #[test]
    fn test_decode_oversized_declared_entry() {
        let mut header = tar::Header::new_gnu();
        header.set_path("abc/asset").unwrap();
        header.set_size(1 << 31);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        let mut tar_bytes = header.as_bytes().to_vec();
        tar_bytes.extend_from_slice(&[7u8; 512]);

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar_bytes).unwrap();
        let bytes = encoder.finish().unwrap();

        match decode(&bytes, &ResourceLimits::default()) {
            Ok(map) => assert!(map.values().all(|e| e.data.len() <= 512)),
            Err(err) => assert!(err.is_decode_error()),
        }
    }

    #[test]
    fn test_decode_empty_input() {
        let err = decode(&[], &ResourceLimits::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArchive(_)));
    }

    #[test]
    fn test_decode_not_gzip() {
        let err = decode(b"plain text, not a package", &ResourceLimits::default()).unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_decode_truncated_stream() {
        let bytes = encode(&sample_entries(), &ExportOptions::default()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode(truncated, &ResourceLimits::default()).is_err());
    }

    #[test]
    fn test_decode_entry_limit() {
        let bytes = encode(&sample_entries(), &ExportOptions::default()).unwrap();
        let err = decode(&bytes, &ResourceLimits::default().max_entries(1)).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));
    }

    #[test]
    fn test_decode_total_size_limit() {
        let bytes = encode(&sample_entries(), &ExportOptions::default()).unwrap();
        let err = decode(&bytes, &ResourceLimits::default().max_total_size(100)).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded(_)));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("./abc/asset"), "abc/asset");
        assert_eq!(normalize_name("abc/"), "abc");
        assert_eq!(normalize_name("././x"), "x");
        assert_eq!(normalize_name("./"), "");
    }

    #[test]
    fn test_long_entry_names_survive() {
        let mut entries = EntryMap::new();
        let long = format!("{}/pathname", "d".repeat(150));
        entries.insert(long.clone(), ArchiveEntry::file(b"Assets/x".to_vec()));
        let bytes = encode(&entries, &ExportOptions::default()).unwrap();
        let decoded = decode(&bytes, &ResourceLimits::default()).unwrap();
        assert!(decoded.contains_key(&long));
    }
}
