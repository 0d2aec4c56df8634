//! In-process raster surface built on the `image` crate.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};

use super::{Bitmap, MIME_JPEG, MIME_PNG, Placement, RasterSurface};
use crate::{Error, Result};

/// Software [`RasterSurface`] supporting PNG, JPEG, GIF, BMP and WebP input.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareSurface;

fn to_image(bitmap: &Bitmap) -> Result<RgbaImage> {
    RgbaImage::from_raw(bitmap.width(), bitmap.height(), bitmap.pixels().to_vec())
        .ok_or_else(|| Error::Thumbnail("bitmap buffer does not match its size".into()))
}

impl RasterSurface for SoftwareSurface {
    fn decode(&self, data: &[u8]) -> Result<Bitmap> {
        let image = image::load_from_memory(data)
            .map_err(|e| Error::Thumbnail(format!("decode: {}", e)))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Bitmap::from_rgba(width, height, image.into_raw())
    }

    fn draw_scaled(&self, canvas: &mut Bitmap, source: &Bitmap, placement: Placement) -> Result<()> {
        let scaled = imageops::resize(
            &to_image(source)?,
            placement.width,
            placement.height,
            FilterType::Triangle,
        );
        let mut target = to_image(canvas)?;
        imageops::overlay(
            &mut target,
            &scaled,
            i64::from(placement.x),
            i64::from(placement.y),
        );
        *canvas = Bitmap::from_rgba(target.width(), target.height(), target.into_raw())?;
        Ok(())
    }

    fn encode(&self, bitmap: &Bitmap, mime: &str) -> Result<Vec<u8>> {
        let image = DynamicImage::ImageRgba8(to_image(bitmap)?);
        let mut out = Cursor::new(Vec::new());
        let written = match mime {
            MIME_PNG => image.write_to(&mut out, ImageFormat::Png),
            // JPEG has no alpha channel.
            MIME_JPEG => DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut out, ImageFormat::Jpeg),
            other => {
                return Err(Error::UnsupportedMedia {
                    reason: format!("cannot encode '{}'", other),
                });
            }
        };
        written.map_err(|e| Error::Thumbnail(format!("encode: {}", e)))?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let bitmap = SoftwareSurface.decode(&png(3, 2, [1, 2, 3, 255])).unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (3, 2));
        assert_eq!(bitmap.pixel(2, 1), Some([1, 2, 3, 255]));
    }

    #[test]
    fn test_decode_garbage() {
        let err = SoftwareSurface.decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Thumbnail(_)));
    }

    #[test]
    fn test_draw_scaled_centres() {
        let source = SoftwareSurface.decode(&png(4, 2, [0, 0, 255, 255])).unwrap();
        let mut canvas = Bitmap::transparent(4, 4);
        let placement = super::super::fit_square(4, 2, 4);
        SoftwareSurface
            .draw_scaled(&mut canvas, &source, placement)
            .unwrap();
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 255, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_encode_png_and_jpeg() {
        let bitmap = Bitmap::transparent(2, 2);
        let png = SoftwareSurface.encode(&bitmap, MIME_PNG).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let jpeg = SoftwareSurface.encode(&bitmap, MIME_JPEG).unwrap();
        assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
        assert!(SoftwareSurface.encode(&bitmap, "image/tiff").is_err());
    }
}
