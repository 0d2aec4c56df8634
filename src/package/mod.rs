//! The asset graph of a package.
//!
//! [`Package`] groups the decoded archive entries by GUID and keeps two
//! derived indexes (GUID to path and path to GUID) that always agree with the
//! stored assets. All identity changes go through methods on `Package`; the
//! asset blobs themselves can be edited directly through [`Package::asset_mut`].
//!
//! # Example
//!
//! ```rust,no_run
//! use unipkg::{Guid, Package};
//!
//! # fn main() -> unipkg::Result<()> {
//! let bytes = std::fs::read("Tools.unitypackage")?;
//! let mut package = Package::import(&bytes)?;
//!
//! package.rename("Assets/Old.cs", "Assets/New.cs")?;
//! if let Some(change) = package.replace_guid("Assets/New.cs", None)? {
//!     println!("{} -> {} ({} blobs updated)",
//!         change.old, change.new, change.report.blobs_rewritten());
//! }
//!
//! std::fs::write("Tools-edited.unitypackage", package.export()?)?;
//! # Ok(())
//! # }
//! ```

mod asset;
pub mod rewrite;

use std::collections::{BTreeMap, HashMap};

use crate::codec::{self, ArchiveEntry, EntryMap};
use crate::options::{ExportOptions, ImportOptions};
use crate::thumbnail::ThumbnailGenerator;
use crate::{AssetPath, Error, Guid, Result};

pub use asset::{Asset, entry};
pub use rewrite::RewriteReport;

/// Size in pixels of previews generated by [`Package::refresh_thumbnail`] callers
/// that have no preference.
pub const DEFAULT_PREVIEW_SIZE: u32 = 128;

/// Outcome of a successful [`Package::replace_guid`].
#[must_use = "the generated GUID is only reported here"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidChange {
    /// GUID the asset had before.
    pub old: Guid,
    /// GUID the asset has now.
    pub new: Guid,
    /// What the reference rewrite touched.
    pub report: RewriteReport,
}

/// Blobs collected for one GUID prefix during import.
#[derive(Default)]
struct EntryGroup {
    pathname: Option<Vec<u8>>,
    asset: Option<Vec<u8>>,
    meta: Option<Vec<u8>>,
    preview: Option<Vec<u8>>,
}

/// An editable asset package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    assets: BTreeMap<AssetPath, Asset>,
    guid_to_path: HashMap<Guid, AssetPath>,
    path_to_guid: HashMap<AssetPath, Guid>,
}

impl Package {
    /// Creates an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a package with default options.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the archive is empty or corrupt. Incomplete
    /// asset groups are dropped with a warning and do not fail the import.
    pub fn import(data: &[u8]) -> Result<Self> {
        Self::import_with_options(data, &ImportOptions::default())
    }

    /// Decodes a package with the given options.
    pub fn import_with_options(data: &[u8], options: &ImportOptions) -> Result<Self> {
        let entries = codec::decode(data, &options.limits)?;
        Ok(Self::from_entries(entries))
    }

    /// Builds a package from already decoded archive entries.
    pub fn from_entries(entries: EntryMap) -> Self {
        let mut groups: BTreeMap<String, EntryGroup> = BTreeMap::new();

        for (name, archive_entry) in entries {
            if archive_entry.is_directory {
                continue;
            }
            let Some((prefix, kind)) = name.split_once('/') else {
                log::debug!("ignoring top-level entry '{}'", name);
                continue;
            };
            let group = groups.entry(prefix.to_string()).or_default();
            let slot = match kind {
                entry::PATHNAME => &mut group.pathname,
                entry::ASSET => &mut group.asset,
                entry::META => &mut group.meta,
                entry::PREVIEW => &mut group.preview,
                _ => {
                    log::debug!("ignoring unknown entry '{}'", name);
                    continue;
                }
            };
            *slot = Some(archive_entry.data);
        }

        let mut package = Self::new();
        for (prefix, group) in groups {
            let Ok(guid) = Guid::parse(&prefix) else {
                log::warn!("dropping entries under '{}': not a GUID", prefix);
                continue;
            };
            let (Some(pathname), Some(payload)) = (group.pathname, group.asset) else {
                log::warn!("dropping incomplete asset group {}", guid);
                continue;
            };
            let Ok(text) = String::from_utf8(pathname) else {
                log::warn!("dropping asset {}: pathname is not UTF-8", guid);
                continue;
            };
            let raw_path = text.lines().next().unwrap_or_default().trim();
            let Some(path) = AssetPath::from_archive(raw_path) else {
                log::warn!("dropping asset {}: blank pathname", guid);
                continue;
            };
            if let Err(e) = AssetPath::new(raw_path) {
                log::debug!("keeping asset {} with unusual path: {}", guid, e);
            }
            if package.assets.contains_key(&path) {
                log::warn!("dropping asset {}: duplicate path '{}'", guid, path);
                continue;
            }
            // Prefixes differing only in letter case name the same GUID.
            if package.guid_to_path.contains_key(&guid) {
                log::warn!("dropping asset {}: duplicate GUID", guid);
                continue;
            }

            let mut asset = Asset::new(guid, path, payload);
            asset.meta = group.meta;
            asset.preview = group.preview;
            package.insert(asset);
        }

        log::debug!("grouped package into {} assets", package.len());
        package
    }

    /// Flattens the package into archive entries.
    pub fn to_entries(&self) -> EntryMap {
        let mut entries = EntryMap::new();
        for asset in self.assets.values() {
            let key = |suffix: &str| format!("{}/{}", asset.guid, suffix);
            entries.insert(
                key(entry::PATHNAME),
                ArchiveEntry::file(asset.path.as_str().as_bytes()),
            );
            entries.insert(key(entry::ASSET), ArchiveEntry::file(asset.payload.clone()));
            if let Some(meta) = &asset.meta {
                entries.insert(key(entry::META), ArchiveEntry::file(meta.clone()));
            }
            if let Some(preview) = &asset.preview {
                entries.insert(key(entry::PREVIEW), ArchiveEntry::file(preview.clone()));
            }
        }
        entries
    }

    /// Encodes the package with default options.
    pub fn export(&self) -> Result<Vec<u8>> {
        self.export_with_options(&ExportOptions::default())
    }

    /// Encodes the package with the given options.
    pub fn export_with_options(&self, options: &ExportOptions) -> Result<Vec<u8>> {
        codec::encode(&self.to_entries(), options)
    }

    /// Returns the number of assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns `true` if the package has no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Iterates over assets in path order.
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Iterates over asset paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &AssetPath> {
        self.assets.keys()
    }

    /// Returns the asset stored under `path`.
    pub fn asset(&self, path: &str) -> Option<&Asset> {
        self.assets.get(path)
    }

    /// Returns the asset stored under `path` for blob edits.
    pub fn asset_mut(&mut self, path: &str) -> Option<&mut Asset> {
        self.assets.get_mut(path)
    }

    /// Returns the asset with the given GUID.
    pub fn asset_by_guid(&self, guid: &Guid) -> Option<&Asset> {
        self.guid_to_path
            .get(guid)
            .and_then(|path| self.assets.get(path))
    }

    /// Returns the GUID of the asset at `path`.
    pub fn guid_of(&self, path: &str) -> Option<&Guid> {
        self.path_to_guid.get(path)
    }

    /// Returns the path of the asset with the given GUID.
    pub fn path_of(&self, guid: &Guid) -> Option<&AssetPath> {
        self.guid_to_path.get(guid)
    }

    /// Returns `true` if an asset is stored under `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    /// Returns `true` if an asset has the given GUID.
    pub fn contains_guid(&self, guid: &Guid) -> bool {
        self.guid_to_path.contains_key(guid)
    }

    fn insert(&mut self, asset: Asset) {
        self.guid_to_path
            .insert(asset.guid.clone(), asset.path.clone());
        self.path_to_guid
            .insert(asset.path.clone(), asset.guid.clone());
        self.assets.insert(asset.path.clone(), asset);
        self.debug_check_indexes();
    }

    fn collision(&self, guid: &Guid) -> Option<Error> {
        self.guid_to_path.get(guid).map(|owner| Error::GuidCollision {
            guid: guid.to_string(),
            path: owner.to_string(),
        })
    }

    /// Adds a new asset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathCollision`] or [`Error::GuidCollision`] if either
    /// key is taken, and [`Error::InvalidAssetPath`] for a malformed path.
    pub fn add_asset(
        &mut self,
        path: &str,
        guid: Guid,
        payload: impl Into<Vec<u8>>,
        meta: Option<Vec<u8>>,
    ) -> Result<()> {
        let path = AssetPath::new(path)?;
        if self.assets.contains_key(&path) {
            return Err(Error::PathCollision {
                path: path.to_string(),
            });
        }
        if let Some(err) = self.collision(&guid) {
            return Err(err);
        }
        let mut asset = Asset::new(guid, path, payload.into());
        asset.meta = meta;
        self.insert(asset);
        Ok(())
    }

    /// Removes the asset at `path`, returning it.
    pub fn remove_asset(&mut self, path: &str) -> Option<Asset> {
        let asset = self.assets.remove(path)?;
        self.guid_to_path.remove(&asset.guid);
        self.path_to_guid.remove(path);
        self.debug_check_indexes();
        Some(asset)
    }

    /// Replaces the payload of the asset at `path`.
    ///
    /// Returns `false` if there is no such asset.
    pub fn set_payload(&mut self, path: &str, payload: impl Into<Vec<u8>>) -> bool {
        match self.assets.get_mut(path) {
            Some(asset) => {
                asset.payload = payload.into();
                true
            }
            None => false,
        }
    }

    /// Moves an asset to a new path. The GUID is untouched.
    ///
    /// Returns `Ok(false)` if `old_path` does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathCollision`] if another asset already lives at
    /// `new_path`, and [`Error::InvalidAssetPath`] if `new_path` is malformed.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<bool> {
        if !self.assets.contains_key(old_path) {
            return Ok(false);
        }
        let new_path = AssetPath::new(new_path)?;
        if new_path.as_str() == old_path {
            return Ok(true);
        }
        if self.assets.contains_key(&new_path) {
            return Err(Error::PathCollision {
                path: new_path.to_string(),
            });
        }

        let Some(mut asset) = self.assets.remove(old_path) else {
            return Ok(false);
        };
        self.path_to_guid.remove(old_path);
        asset.path = new_path.clone();
        self.guid_to_path
            .insert(asset.guid.clone(), new_path.clone());
        self.path_to_guid
            .insert(new_path.clone(), asset.guid.clone());
        self.assets.insert(new_path, asset);
        self.debug_check_indexes();

        log::debug!("renamed '{}'", old_path);
        Ok(true)
    }

    /// Gives the asset at `path` a new GUID and rewrites every reference to it.
    ///
    /// When `new_guid` is `None` a random unused GUID is generated. The
    /// sidecar's `guid:` line is updated, and every boundary-safe occurrence
    /// of the old GUID in any decodable payload or sidecar of the package is
    /// replaced.
    ///
    /// Returns `Ok(None)` if there is no asset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GuidCollision`] if `new_guid` is already assigned
    /// (including to this asset); the package is left unchanged.
    pub fn replace_guid(&mut self, path: &str, new_guid: Option<Guid>) -> Result<Option<GuidChange>> {
        let Some(old) = self.path_to_guid.get(path).cloned() else {
            return Ok(None);
        };

        let new = match new_guid {
            Some(guid) => {
                if let Some(err) = self.collision(&guid) {
                    return Err(err);
                }
                guid
            }
            None => loop {
                let candidate = Guid::generate();
                if !self.guid_to_path.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let Some(asset) = self.assets.get_mut(path) else {
            return Ok(None);
        };
        asset.guid = new.clone();
        if let Some(meta) = asset.meta.as_ref() {
            match rewrite::rewrite_meta_guid(meta, &new) {
                Some(updated) => asset.meta = Some(updated),
                None => log::warn!("sidecar of '{}' has no guid line", path),
            }
        }
        let owner = asset.path.clone();

        self.guid_to_path.remove(&old);
        self.guid_to_path.insert(new.clone(), owner.clone());
        self.path_to_guid.insert(owner, new.clone());

        let report = rewrite::rewrite_references(&old, &new, self.assets.values_mut());
        self.debug_check_indexes();

        log::debug!(
            "re-keyed '{}' {} -> {}: {} occurrences in {} blobs",
            path,
            old,
            new,
            report.occurrences,
            report.blobs_rewritten()
        );
        Ok(Some(GuidChange { old, new, report }))
    }

    /// Returns the paths of other assets whose text mentions `guid`.
    pub fn find_references(&self, guid: &Guid) -> Vec<&AssetPath> {
        self.assets
            .values()
            .filter(|asset| &asset.guid != guid)
            .filter(|asset| {
                asset
                    .payload_text()
                    .is_some_and(|text| rewrite::contains_guid(text, guid))
                    || asset
                        .meta_text()
                        .is_some_and(|text| rewrite::contains_guid(text, guid))
            })
            .map(|asset| &asset.path)
            .collect()
    }

    /// Builds a minimal sidecar declaring `guid`.
    pub fn generate_meta(guid: &Guid) -> Vec<u8> {
        format!("fileFormatVersion: 2\nguid: {}\n", guid).into_bytes()
    }

    /// Regenerates the preview image of the asset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssetNotFound`] for an unknown path,
    /// [`Error::UnsupportedMedia`] if the asset is not an image or no drawing
    /// surface is available, and [`Error::Thumbnail`] if rasterisation fails.
    pub fn refresh_thumbnail(
        &mut self,
        path: &str,
        generator: &ThumbnailGenerator,
        size: u32,
    ) -> Result<()> {
        let asset = self.assets.get_mut(path).ok_or_else(|| Error::AssetNotFound {
            path: path.to_string(),
        })?;
        if !asset.is_image() {
            return Err(Error::UnsupportedMedia {
                reason: format!("'{}' is not an image asset", path),
            });
        }
        let preview = generator.generate_png(&asset.payload, size)?;
        asset.preview = Some(preview);
        Ok(())
    }

    /// Regenerates previews for every image asset.
    ///
    /// Failures are logged and skipped. Returns the number of previews written.
    pub fn refresh_all_thumbnails(&mut self, generator: &ThumbnailGenerator, size: u32) -> usize {
        let mut written = 0;
        for asset in self.assets.values_mut().filter(|asset| asset.is_image()) {
            match generator.generate_png(&asset.payload, size) {
                Ok(preview) => {
                    asset.preview = Some(preview);
                    written += 1;
                }
                Err(e) => log::warn!("no preview for '{}': {}", asset.path, e),
            }
        }
        written
    }

    fn debug_check_indexes(&self) {
        debug_assert_eq!(self.guid_to_path.len(), self.assets.len());
        debug_assert_eq!(self.path_to_guid.len(), self.assets.len());
        debug_assert!(self.assets.iter().all(|(path, asset)| {
            &asset.path == path
                && self.guid_to_path.get(&asset.guid) == Some(path)
                && self.path_to_guid.get(path) == Some(&asset.guid)
        }));
    }
}
