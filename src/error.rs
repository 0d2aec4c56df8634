//! Error types for package and document editing.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when working with asset packages and the documents stored
//! inside them, along with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. "Soft"
//! lookups such as [`Package::rename`] report a missing asset through their
//! return value instead of an error; collisions are always hard errors.
//!
//! ```rust,no_run
//! use unipkg::{Error, Package};
//!
//! fn retarget(bytes: &[u8]) -> unipkg::Result<Vec<u8>> {
//!     let mut package = Package::import(bytes)?;
//!     match package.replace_guid("Assets/Player.prefab", None) {
//!         Ok(Some(change)) => println!("{} -> {}", change.old, change.new),
//!         Ok(None) => println!("no such asset"),
//!         Err(e @ Error::GuidCollision { .. }) => return Err(e),
//!         Err(e) => return Err(e),
//!     }
//!     package.export()
//! }
//! ```
//!
//! [`Package::rename`]: crate::Package::rename

use std::io;

/// Coarse classification of an [`Error`].
///
/// Callers that only care about the family of a failure (for example to pick
/// an exit code) can match on this instead of on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The archive or a document could not be decoded.
    Decode,
    /// An asset, curve or component does not exist.
    NotFound,
    /// A GUID or path is already in use.
    Collision,
    /// A thumbnail was requested for something that cannot produce one.
    UnsupportedMedia,
    /// An I/O error from the underlying reader or writer.
    Io,
    /// A caller-supplied value was rejected.
    InvalidInput,
    /// A configured resource limit was hit.
    Limit,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode => write!(f, "decode error"),
            Self::NotFound => write!(f, "not found"),
            Self::Collision => write!(f, "collision"),
            Self::UnsupportedMedia => write!(f, "unsupported media"),
            Self::Io => write!(f, "I/O error"),
            Self::InvalidInput => write!(f, "invalid input"),
            Self::Limit => write!(f, "resource limit"),
        }
    }
}

/// The main error type for package operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Decode | [`InvalidArchive`][Self::InvalidArchive], [`InvalidDocument`][Self::InvalidDocument], [`BlockNotFound`][Self::BlockNotFound], [`Yaml`][Self::Yaml] | Corrupt input |
/// | Lookup | [`AssetNotFound`][Self::AssetNotFound] | Unknown asset path |
/// | Identity | [`GuidCollision`][Self::GuidCollision], [`PathCollision`][Self::PathCollision] | Duplicate keys |
/// | Media | [`UnsupportedMedia`][Self::UnsupportedMedia], [`Thumbnail`][Self::Thumbnail] | Preview generation |
/// | Resources | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | Safety limits |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading or writing a stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The package archive is empty, truncated or not a gzip/tar stream.
    #[error("Invalid package archive: {0}")]
    InvalidArchive(String),

    /// An embedded text document is malformed.
    #[error("Invalid {document} document: {reason}")]
    InvalidDocument {
        /// The kind of document being parsed (e.g. "animation clip").
        document: &'static str,
        /// A description of the problem.
        reason: String,
    },

    /// The block introduced by `tag` does not occur in the document.
    #[error("Block '{tag}' not found in document")]
    BlockNotFound {
        /// The header line that was searched for.
        tag: &'static str,
    },

    /// The YAML parser or emitter failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A string is not a 32-character hexadecimal GUID.
    #[error("Invalid GUID '{0}'")]
    InvalidGuid(String),

    /// A project path failed validation.
    #[error("Invalid asset path: {0}")]
    InvalidAssetPath(String),

    /// An option value is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// No asset is stored under the given path.
    #[error("Asset not found: {path}")]
    AssetNotFound {
        /// The path that was looked up.
        path: String,
    },

    /// The GUID is already assigned to another asset.
    #[error("GUID {guid} is already used by '{path}'")]
    GuidCollision {
        /// The conflicting GUID.
        guid: String,
        /// The asset currently owning it.
        path: String,
    },

    /// The path is already occupied by another asset.
    #[error("Asset path already exists: {path}")]
    PathCollision {
        /// The conflicting path.
        path: String,
    },

    /// The asset or environment cannot produce a preview image.
    #[error("Unsupported media: {reason}")]
    UnsupportedMedia {
        /// Why the request was refused.
        reason: String,
    },

    /// Thumbnail rasterisation failed.
    #[error("Thumbnail generation failed: {0}")]
    Thumbnail(String),

    /// A resource limit was exceeded while decoding a package.
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),
}

impl Error {
    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidArchive(_)
            | Self::InvalidDocument { .. }
            | Self::BlockNotFound { .. }
            | Self::Yaml(_) => ErrorKind::Decode,
            Self::InvalidGuid(_) | Self::InvalidAssetPath(_) | Self::InvalidOption(_) => {
                ErrorKind::InvalidInput
            }
            Self::AssetNotFound { .. } => ErrorKind::NotFound,
            Self::GuidCollision { .. } | Self::PathCollision { .. } => ErrorKind::Collision,
            Self::UnsupportedMedia { .. } | Self::Thumbnail(_) => ErrorKind::UnsupportedMedia,
            Self::ResourceLimitExceeded(_) => ErrorKind::Limit,
        }
    }

    /// Returns `true` for errors caused by undecodable input.
    pub fn is_decode_error(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    pub(crate) fn document(document: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            document,
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for package operations.
pub type Result<T> = std::result::Result<T, Error>;
