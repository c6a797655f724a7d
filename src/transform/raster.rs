//! Pure Rust raster transformer built on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF) | `image` crate (pure Rust decoders) |
//! | Dimensions / format sniffing | `ImageReader::with_guessed_format` |
//! | Crop | `DynamicImage::crop_imm`, clamped to the source bounds |
//! | Resize | `image::imageops` with `Lanczos3` filter |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode PNG / GIF / TIFF | `DynamicImage::write_to` |
//!
//! Scalable formats (SVG, EPS, PDF) are declared [`Capability::Unable`]
//! across the board; rasterizing them needs a dedicated transformer.

use super::backend::{Capability, ImageTransformer, TransformError};
use super::params::{ImageAttributes, ModifyParams};
use crate::geometry::{Rect, Size};
use crate::image_type::ImageType;
use crate::store::ImageFile;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Raster transformer. Stateless; one instance serves the whole process.
pub struct RasterTransformer;

impl RasterTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RasterTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn raster_format(image_type: ImageType) -> Option<ImageFormat> {
    match image_type {
        ImageType::Jpeg => Some(ImageFormat::Jpeg),
        ImageType::Png => Some(ImageFormat::Png),
        ImageType::Gif => Some(ImageFormat::Gif),
        ImageType::Tiff => Some(ImageFormat::Tiff),
        ImageType::Svg | ImageType::Eps | ImageType::Pdf => None,
    }
}

fn type_for_format(format: ImageFormat) -> Option<ImageType> {
    match format {
        ImageFormat::Jpeg => Some(ImageType::Jpeg),
        ImageFormat::Png => Some(ImageType::Png),
        ImageFormat::Gif => Some(ImageType::Gif),
        ImageFormat::Tiff => Some(ImageType::Tiff),
        _ => None,
    }
}

fn decode(file: &ImageFile) -> Result<DynamicImage, TransformError> {
    let format = raster_format(file.image_type).ok_or_else(|| {
        TransformError::Failed(format!("cannot decode {} input", file.image_type))
    })?;
    image::load_from_memory_with_format(&file.bytes, format)
        .map_err(|e| TransformError::Failed(format!("failed to decode {}: {e}", file.image_type)))
}

/// Intersect the crop rect with the image bounds. A crop that leaves no
/// pixels is an error rather than a zero-sized rendition.
fn clamp_crop(crop: Rect, image: Size) -> Result<(u32, u32, u32, u32), TransformError> {
    let x = crop.left().clamp(0, image.width as i32) as u32;
    let y = crop.top().clamp(0, image.height as i32) as u32;
    let right = crop.right().clamp(0, image.width as i32) as u32;
    let bottom = crop.bottom().clamp(0, image.height as i32) as u32;
    if right <= x || bottom <= y {
        return Err(TransformError::Failed(format!(
            "crop {crop} lies outside the {image} source"
        )));
    }
    Ok((x, y, right - x, bottom - y))
}

fn encode(image: &DynamicImage, params: &ModifyParams) -> Result<Vec<u8>, TransformError> {
    let mut bytes = Vec::new();
    match params.output_type {
        ImageType::Jpeg => {
            // JPEG carries no alpha; flatten before encoding.
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            let encoder =
                JpegEncoder::new_with_quality(&mut bytes, params.quality.value() as u8);
            rgb.write_with_encoder(encoder)
        }
        ImageType::Png => image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png),
        ImageType::Gif => image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Gif),
        ImageType::Tiff => image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Tiff),
        other => {
            return Err(TransformError::Failed(format!(
                "cannot encode {other} output"
            )));
        }
    }
    .map_err(|e| TransformError::Failed(format!("failed to encode {}: {e}", params.output_type)))?;
    Ok(bytes)
}

impl ImageTransformer for RasterTransformer {
    fn name(&self) -> &str {
        "raster"
    }

    fn order(&self) -> i32 {
        0
    }

    fn can_compute_dimensions(&self, image_type: ImageType) -> Capability {
        if raster_format(image_type).is_some() {
            Capability::Preferred
        } else {
            Capability::Unable
        }
    }

    fn can_read_attributes(&self, image_type: Option<ImageType>) -> Capability {
        match image_type {
            Some(t) if raster_format(t).is_some() => Capability::Preferred,
            // No hint: sniff the raster signatures, anything else will fail.
            None => Capability::Possible,
            Some(_) => Capability::Unable,
        }
    }

    fn can_modify(&self, params: &ModifyParams) -> Capability {
        if raster_format(params.source_type).is_some()
            && raster_format(params.output_type).is_some()
        {
            Capability::Preferred
        } else {
            Capability::Unable
        }
    }

    fn compute_dimensions(&self, file: &ImageFile) -> Result<Size, TransformError> {
        let reader = ImageReader::new(Cursor::new(&file.bytes)).with_guessed_format()?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| TransformError::Failed(format!("failed to read dimensions: {e}")))?;
        Ok(Size::new(width, height))
    }

    fn read_attributes(&self, bytes: &[u8]) -> Result<ImageAttributes, TransformError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let image_type = reader
            .format()
            .and_then(type_for_format)
            .ok_or_else(|| TransformError::Failed("unrecognized image data".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| TransformError::Failed(format!("failed to read dimensions: {e}")))?;
        Ok(ImageAttributes {
            image_type,
            size: Size::new(width, height),
        })
    }

    fn modify(&self, file: &ImageFile, params: &ModifyParams) -> Result<ImageFile, TransformError> {
        let mut image = decode(file)?;
        if let Some(crop) = params.crop {
            let bounds = Size::new(image.width(), image.height());
            let (x, y, width, height) = clamp_crop(crop, bounds)?;
            image = image.crop_imm(x, y, width, height);
        }
        if image.width() != params.target.width || image.height() != params.target.height {
            image = image.resize_exact(
                params.target.width,
                params.target.height,
                FilterType::Lanczos3,
            );
        }
        let bytes = encode(&image, params)?;
        Ok(ImageFile::new(params.output_type, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::super::params::Quality;
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_of(width: u32, height: u32, color: Rgb<u8>) -> ImageFile {
        let img = RgbImage::from_pixel(width, height, color);
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageFile::new(ImageType::Png, bytes)
    }

    fn params(target: Size, output_type: ImageType) -> ModifyParams {
        ModifyParams {
            source_type: ImageType::Png,
            crop: None,
            target,
            output_type,
            quality: Quality::default(),
        }
    }

    #[test]
    fn resize_produces_the_target_size() {
        let t = RasterTransformer::new();
        let out = t
            .modify(
                &png_of(8, 8, Rgb([200, 10, 10])),
                &params(Size::new(4, 2), ImageType::Png),
            )
            .unwrap();
        assert_eq!(out.image_type, ImageType::Png);
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 2));
    }

    #[test]
    fn crop_is_applied_before_resize() {
        // Left half red, right half blue; crop the right half.
        let mut img = RgbImage::from_pixel(8, 4, Rgb([255, 0, 0]));
        for y in 0..4 {
            for x in 4..8 {
                img.put_pixel(x, y, Rgb([0, 0, 255]));
            }
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let file = ImageFile::new(ImageType::Png, bytes);

        let t = RasterTransformer::new();
        let out = t
            .modify(
                &file,
                &ModifyParams {
                    crop: Some(Rect::from_coords(4, 0, 4, 4)),
                    ..params(Size::new(4, 4), ImageType::Png)
                },
            )
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(decoded.get_pixel(3, 3), &Rgb([0, 0, 255]));
    }

    #[test]
    fn crop_is_clamped_to_the_source() {
        let t = RasterTransformer::new();
        let out = t
            .modify(
                &png_of(8, 8, Rgb([1, 2, 3])),
                &ModifyParams {
                    crop: Some(Rect::from_coords(-2, -2, 20, 20)),
                    ..params(Size::new(8, 8), ImageType::Png)
                },
            )
            .unwrap();
        let decoded = image::load_from_memory(&out.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn crop_outside_the_source_fails() {
        let t = RasterTransformer::new();
        let err = t
            .modify(
                &png_of(8, 8, Rgb([1, 2, 3])),
                &ModifyParams {
                    crop: Some(Rect::from_coords(100, 100, 4, 4)),
                    ..params(Size::new(4, 4), ImageType::Png)
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::Failed(_)));
    }

    #[test]
    fn jpeg_output_flattens_and_encodes() {
        let t = RasterTransformer::new();
        let out = t
            .modify(
                &png_of(8, 8, Rgb([10, 20, 30])),
                &params(Size::new(8, 8), ImageType::Jpeg),
            )
            .unwrap();
        assert_eq!(out.image_type, ImageType::Jpeg);
        // JPEG magic.
        assert_eq!(&out.bytes[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn compute_dimensions_reads_the_header() {
        let t = RasterTransformer::new();
        let dims = t.compute_dimensions(&png_of(13, 7, Rgb([0, 0, 0]))).unwrap();
        assert_eq!(dims, Size::new(13, 7));
    }

    #[test]
    fn read_attributes_sniffs_the_format() {
        let t = RasterTransformer::new();
        let attrs = t.read_attributes(&png_of(5, 9, Rgb([0, 0, 0])).bytes).unwrap();
        assert_eq!(attrs.image_type, ImageType::Png);
        assert_eq!(attrs.size, Size::new(5, 9));
    }

    #[test]
    fn read_attributes_rejects_non_image_data() {
        let t = RasterTransformer::new();
        assert!(t.read_attributes(b"<html></html>").is_err());
    }

    #[test]
    fn scalable_formats_are_unable() {
        let t = RasterTransformer::new();
        assert_eq!(
            t.can_compute_dimensions(ImageType::Svg),
            Capability::Unable
        );
        assert_eq!(
            t.can_modify(&ModifyParams {
                source_type: ImageType::Pdf,
                ..params(Size::new(10, 10), ImageType::Jpeg)
            }),
            Capability::Unable
        );
        assert_eq!(
            t.can_modify(&params(Size::new(10, 10), ImageType::Svg)),
            Capability::Unable
        );
    }
}
