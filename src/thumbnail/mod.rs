//! Square preview thumbnails.
//!
//! Rasterisation is delegated to a [`RasterSurface`]. This module only does
//! the layout (aspect-preserving fit, centred on a transparent square) and
//! the validation around it, so it works the same with any surface.
//!
//! With the `raster` feature (enabled by default) [`software::SoftwareSurface`]
//! provides an in-process implementation.

#[cfg(feature = "raster")]
pub mod software;

use std::fmt;
use std::sync::Arc;

use crate::{Error, Result};

/// MIME type of PNG output.
pub const MIME_PNG: &str = "image/png";

/// MIME type of JPEG output.
pub const MIME_JPEG: &str = "image/jpeg";

/// An RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Bitmap {
    /// Creates a fully transparent bitmap.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wraps raw RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Thumbnail`] if `pixels` does not hold exactly
    /// `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::Thumbnail(format!(
                "{}x{} bitmap needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw pixels.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Consumes the bitmap, returning its pixels.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Returns the RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }
}

/// Where a scaled image lands on the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Scaled width.
    pub width: u32,
    /// Scaled height.
    pub height: u32,
}

/// Fits a `width x height` image into a `size x size` square, keeping its
/// aspect ratio, and centres it.
///
/// Both inputs must be non-zero.
pub fn fit_square(width: u32, height: u32, size: u32) -> Placement {
    let scale = (f64::from(size) / f64::from(width)).min(f64::from(size) / f64::from(height));
    let scaled = |n: u32| ((f64::from(n) * scale).round() as u32).clamp(1, size.max(1));
    let (w, h) = (scaled(width), scaled(height));
    Placement {
        x: (size - w) / 2,
        y: (size - h) / 2,
        width: w,
        height: h,
    }
}

/// A 2D drawing backend.
pub trait RasterSurface: Send + Sync {
    /// Decodes encoded image bytes.
    fn decode(&self, data: &[u8]) -> Result<Bitmap>;

    /// Draws `source` scaled into `placement` on `canvas`.
    fn draw_scaled(&self, canvas: &mut Bitmap, source: &Bitmap, placement: Placement)
    -> Result<()>;

    /// Encodes `bitmap` as `mime`.
    fn encode(&self, bitmap: &Bitmap, mime: &str) -> Result<Vec<u8>>;
}

/// Produces square previews through an injected [`RasterSurface`].
#[derive(Clone, Default)]
pub struct ThumbnailGenerator {
    surface: Option<Arc<dyn RasterSurface>>,
}

impl fmt::Debug for ThumbnailGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThumbnailGenerator")
            .field("available", &self.is_available())
            .finish()
    }
}

impl ThumbnailGenerator {
    /// Creates a generator drawing on `surface`.
    pub fn new(surface: Arc<dyn RasterSurface>) -> Self {
        Self {
            surface: Some(surface),
        }
    }

    /// Creates a generator with no drawing surface. Every request fails
    /// with [`Error::UnsupportedMedia`].
    pub fn unavailable() -> Self {
        Self { surface: None }
    }

    /// Creates a generator backed by the in-process software surface.
    #[cfg(feature = "raster")]
    pub fn software() -> Self {
        Self::new(Arc::new(software::SoftwareSurface))
    }

    /// Returns `true` if a drawing surface is attached.
    pub fn is_available(&self) -> bool {
        self.surface.is_some()
    }

    /// Renders `data` into a `size x size` thumbnail encoded as `mime`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedMedia`] without a surface or for an unknown `mime`
    /// - [`Error::InvalidOption`] for a zero `size`
    /// - [`Error::Thumbnail`] for an empty source image or empty output
    pub fn generate(&self, data: &[u8], size: u32, mime: &str) -> Result<Vec<u8>> {
        let surface = self.surface.as_ref().ok_or_else(|| Error::UnsupportedMedia {
            reason: "no drawing surface available".into(),
        })?;
        if mime != MIME_PNG && mime != MIME_JPEG {
            return Err(Error::UnsupportedMedia {
                reason: format!("cannot encode thumbnails as '{}'", mime),
            });
        }
        if size == 0 {
            return Err(Error::InvalidOption("thumbnail size must be non-zero".into()));
        }

        let source = surface.decode(data)?;
        if source.width() == 0 || source.height() == 0 {
            return Err(Error::Thumbnail("source image has zero width or height".into()));
        }

        let placement = fit_square(source.width(), source.height(), size);
        let mut canvas = Bitmap::transparent(size, size);
        surface.draw_scaled(&mut canvas, &source, placement)?;

        let encoded = surface.encode(&canvas, mime)?;
        if encoded.is_empty() {
            return Err(Error::Thumbnail("encoder produced no output".into()));
        }
        log::debug!(
            "thumbnail {}x{} -> {}px ({} bytes)",
            source.width(),
            source.height(),
            size,
            encoded.len()
        );
        Ok(encoded)
    }

    /// Shorthand for [`generate`](Self::generate) with PNG output.
    pub fn generate_png(&self, data: &[u8], size: u32) -> Result<Vec<u8>> {
        self.generate(data, size, MIME_PNG)
    }
}
