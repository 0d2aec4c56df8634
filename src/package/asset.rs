//! A single asset inside a package.

use crate::{AssetPath, Guid};

/// Entry-name suffixes used inside a package, one set per asset.
pub mod entry {
    /// Project path of the asset (UTF-8 text).
    pub const PATHNAME: &str = "pathname";
    /// Raw asset bytes.
    pub const ASSET: &str = "asset";
    /// Sidecar metadata (UTF-8 text with a `guid:` line).
    pub const META: &str = "asset.meta";
    /// Preview image (PNG).
    pub const PREVIEW: &str = "preview.png";
}

/// One asset: payload bytes plus identity and optional companions.
///
/// The GUID and path are owned by the [`Package`](crate::Package) indexes and
/// can only be changed through it; the blobs are freely mutable via
/// [`Package::asset_mut`](crate::Package::asset_mut).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub(crate) guid: Guid,
    pub(crate) path: AssetPath,
    /// Raw asset bytes.
    pub payload: Vec<u8>,
    /// Sidecar `.meta` contents, if the package carries one.
    pub meta: Option<Vec<u8>>,
    /// Preview image bytes, if the package carries one.
    pub preview: Option<Vec<u8>>,
}

impl Asset {
    pub(crate) fn new(guid: Guid, path: AssetPath, payload: Vec<u8>) -> Self {
        Self {
            guid,
            path,
            payload,
            meta: None,
            preview: None,
        }
    }

    /// Returns the asset GUID.
    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Returns the project path.
    pub fn path(&self) -> &AssetPath {
        &self.path
    }

    /// Returns the payload as text if it is valid UTF-8.
    pub fn payload_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Returns the sidecar as text if present and valid UTF-8.
    pub fn meta_text(&self) -> Option<&str> {
        self.meta
            .as_deref()
            .and_then(|meta| std::str::from_utf8(meta).ok())
    }

    /// Returns `true` if the asset can produce a preview thumbnail.
    pub fn is_image(&self) -> bool {
        self.path.is_image()
    }
}
