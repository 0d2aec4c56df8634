//! Async wrappers for the CPU-heavy package operations.
//!
//! Archive decoding, encoding and thumbnail rendering run on Tokio's
//! blocking pool so they do not stall the async runtime. Each call is a
//! single-shot future; there is no cancellation or retry.
//!
//! # Example
//!
//! ```rust,no_run
//! use unipkg::async_api::{export_async, import_async};
//!
//! #[tokio::main]
//! async fn main() -> unipkg::Result<()> {
//!     let bytes = std::fs::read("Tools.unitypackage")?;
//!     let mut package = import_async(bytes).await?;
//!     package.rename("Assets/Old.cs", "Assets/New.cs")?;
//!     let out = export_async(&package).await?;
//!     std::fs::write("Tools-edited.unitypackage", out)?;
//!     Ok(())
//! }
//! ```

use crate::codec;
use crate::options::{ExportOptions, ImportOptions};
use crate::thumbnail::ThumbnailGenerator;
use crate::{Error, Package, Result};

async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}

/// Decodes a package with default options.
pub async fn import_async(data: Vec<u8>) -> Result<Package> {
    import_async_with_options(data, ImportOptions::default()).await
}

/// Decodes a package with the given options.
pub async fn import_async_with_options(data: Vec<u8>, options: ImportOptions) -> Result<Package> {
    run_blocking(move || Package::import_with_options(&data, &options)).await
}

/// Encodes a package with default options.
pub async fn export_async(package: &Package) -> Result<Vec<u8>> {
    export_async_with_options(package, ExportOptions::default()).await
}

/// Encodes a package with the given options.
///
/// The entry map is snapshotted before the future first yields, so later
/// edits to `package` do not affect the output.
pub async fn export_async_with_options(
    package: &Package,
    options: ExportOptions,
) -> Result<Vec<u8>> {
    let entries = package.to_entries();
    run_blocking(move || codec::encode(&entries, &options)).await
}

/// Renders a thumbnail on the blocking pool.
pub async fn generate_thumbnail_async(
    generator: &ThumbnailGenerator,
    data: Vec<u8>,
    size: u32,
    mime: &str,
) -> Result<Vec<u8>> {
    let generator = generator.clone();
    let mime = mime.to_string();
    run_blocking(move || generator.generate(&data, size, &mime)).await
}

/// Regenerates the preview of the asset at `path`.
///
/// Fails like [`Package::refresh_thumbnail`].
pub async fn refresh_thumbnail_async(
    package: &mut Package,
    path: &str,
    generator: &ThumbnailGenerator,
    size: u32,
) -> Result<()> {
    let asset = package.asset(path).ok_or_else(|| Error::AssetNotFound {
        path: path.to_string(),
    })?;
    if !asset.is_image() {
        return Err(Error::UnsupportedMedia {
            reason: format!("'{}' is not an image asset", path),
        });
    }
    let payload = asset.payload.clone();
    let preview = generate_thumbnail_async(generator, payload, size, crate::thumbnail::MIME_PNG).await?;

    let asset = package.asset_mut(path).ok_or_else(|| Error::AssetNotFound {
        path: path.to_string(),
    })?;
    asset.preview = Some(preview);
    Ok(())
}
