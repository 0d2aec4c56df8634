//! # unipkg
//!
//! A pure-Rust library for editing Unity asset packages (`.unitypackage`)
//! without losing the parts it does not understand.
//!
//! A package is a gzip-compressed tar archive in which every asset lives
//! under a directory named after its GUID. This crate decodes that archive
//! into a [`Package`], an asset graph indexed both by GUID and by project
//! path, and lets you rename assets, re-key them (rewriting every textual
//! reference to the old GUID) and edit two kinds of embedded documents:
//! animation clips ([`anim`]) and prefab script components ([`prefab`]).
//!
//! ## Quick Start
//!
//! ### Renaming and re-keying assets
//!
//! ```rust,no_run
//! use unipkg::{Guid, Package, Result};
//!
//! fn main() -> Result<()> {
//!     let bytes = std::fs::read("Characters.unitypackage")?;
//!     let mut package = Package::import(&bytes)?;
//!
//!     for asset in package.assets() {
//!         println!("{}  {}", asset.guid(), asset.path());
//!     }
//!
//!     package.rename("Assets/Hero.prefab", "Assets/Characters/Hero.prefab")?;
//!
//!     let guid = Guid::parse("0123456789abcdef0123456789abcdef")?;
//!     if let Some(change) = package.replace_guid("Assets/Scripts/Hero.cs", Some(guid))? {
//!         println!("updated {} references", change.report.occurrences);
//!     }
//!
//!     std::fs::write("Characters-edited.unitypackage", package.export()?)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Editing embedded documents
//!
//! Editors work on text and splice their changes back, so bytes they do not
//! model are preserved.
//!
//! ```rust,no_run
//! use unipkg::anim::{AnimationClipEditor, Keyframe};
//! use unipkg::prefab::PrefabEditor;
//! use unipkg::{Package, Result};
//!
//! fn main() -> Result<()> {
//!     let mut package = Package::import(&std::fs::read("Characters.unitypackage")?)?;
//!
//!     let text = package.asset("Assets/Blink.anim").and_then(|a| a.payload_text());
//!     if let Some(text) = text {
//!         let mut clip = AnimationClipEditor::parse(text)?;
//!         clip.add_keyframe("m_Enabled", "Eyes", Keyframe::new(1.0, 0.0));
//!         let edited = clip.export_to_yaml()?;
//!         package.set_payload("Assets/Blink.anim", edited);
//!     }
//!
//!     if let Some(asset) = package.asset("Assets/Hero.prefab") {
//!         let mut prefab = PrefabEditor::from_bytes(&asset.payload)?;
//!         prefab.update_component_properties(
//!             "0123456789abcdef0123456789abcdef",
//!             [("speed", "7.5")],
//!         );
//!         package.set_payload("Assets/Hero.prefab", prefab.into_string());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `raster` | Yes | Software thumbnail surface via the `image` crate |
//! | `async` | No | Async/await API with Tokio integration |
//! | `cli` | No | Command-line interface tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Lookups that simply miss (renaming
//! a path that does not exist) report it through their return value;
//! collisions and undecodable input are errors. [`Error::kind`] groups the
//! variants into coarse families.
//!
//! ## Resource Limits
//!
//! Decoding enforces [`ResourceLimits`] on entry count, entry size and total
//! unpacked size, so a hostile package cannot exhaust memory.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod anim;
pub mod asset_path;
pub mod codec;
pub mod error;
pub mod guid;
pub mod options;
pub mod package;
pub mod prefab;
pub mod thumbnail;

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub mod async_api;

pub use asset_path::AssetPath;
pub use error::{Error, ErrorKind, Result};
pub use guid::Guid;
pub use options::{ExportOptions, ImportOptions, ResourceLimits};
pub use package::{Asset, GuidChange, Package, RewriteReport};
pub use thumbnail::{RasterSurface, ThumbnailGenerator};
