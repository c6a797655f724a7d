//! The set of image formats the engine knows about.
//!
//! Raster formats (JPEG, PNG, GIF, TIFF) can be produced as rendition output;
//! scalable formats (SVG, EPS, PDF) only occur as stored originals and need a
//! backend that can rasterize them. The preferred-output policy decides what
//! a rendition is encoded as when the request doesn't say: formats that can
//! carry transparency stay lossless (PNG), everything else downgrades to
//! JPEG.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    Svg,
    Eps,
    Pdf,
    Tiff,
}

impl ImageType {
    /// The content-type header value for this format.
    pub fn content_type(self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Gif => "image/gif",
            ImageType::Svg => "image/svg+xml",
            ImageType::Eps => "application/postscript",
            ImageType::Pdf => "application/pdf",
            ImageType::Tiff => "image/tiff",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpeg",
            ImageType::Png => "png",
            ImageType::Gif => "gif",
            ImageType::Svg => "svg",
            ImageType::Eps => "eps",
            ImageType::Pdf => "pdf",
            ImageType::Tiff => "tiff",
        }
    }

    /// Map an upstream content type to a format. Unrecognized content types
    /// return `None`, which the acquisition layer treats as a hard error.
    pub fn for_content_type(content_type: &str) -> Option<ImageType> {
        let token = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        match token.as_str() {
            "image/jpeg" | "image/pjpeg" => Some(ImageType::Jpeg),
            "image/png" | "image/x-png" => Some(ImageType::Png),
            "image/gif" => Some(ImageType::Gif),
            "image/svg+xml" => Some(ImageType::Svg),
            "application/postscript" | "image/eps" | "application/eps" => Some(ImageType::Eps),
            "application/pdf" => Some(ImageType::Pdf),
            "image/tiff" => Some(ImageType::Tiff),
            _ => None,
        }
    }

    /// Map a file extension (without the dot) back to a format.
    pub fn for_extension(extension: &str) -> Option<ImageType> {
        match extension.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            "gif" => Some(ImageType::Gif),
            "svg" => Some(ImageType::Svg),
            "eps" => Some(ImageType::Eps),
            "pdf" => Some(ImageType::Pdf),
            "tiff" | "tif" => Some(ImageType::Tiff),
            _ => None,
        }
    }

    /// Whether the format can carry an alpha channel.
    pub fn has_transparency(self) -> bool {
        matches!(self, ImageType::Png | ImageType::Gif | ImageType::Svg)
    }

    /// Whether the format is resolution-independent and must be rasterized
    /// before pixel work.
    pub fn is_scalable(self) -> bool {
        matches!(self, ImageType::Svg | ImageType::Eps | ImageType::Pdf)
    }

    /// The output format a rendition of an original of this type defaults to
    /// when the request doesn't pick one. Transparency-capable originals stay
    /// PNG so the alpha channel survives; the rest go lossy.
    pub fn preferred_output_type(self) -> Option<ImageType> {
        if self.has_transparency() {
            Some(ImageType::Png)
        } else {
            Some(ImageType::Jpeg)
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_mapping_is_case_insensitive() {
        assert_eq!(
            ImageType::for_content_type("Image/JPEG"),
            Some(ImageType::Jpeg)
        );
        assert_eq!(
            ImageType::for_content_type("image/pjpeg"),
            Some(ImageType::Jpeg)
        );
    }

    #[test]
    fn content_type_mapping_ignores_parameters() {
        assert_eq!(
            ImageType::for_content_type("image/png; charset=binary"),
            Some(ImageType::Png)
        );
    }

    #[test]
    fn extension_mapping_roundtrips() {
        for t in [
            ImageType::Jpeg,
            ImageType::Png,
            ImageType::Gif,
            ImageType::Svg,
            ImageType::Eps,
            ImageType::Pdf,
            ImageType::Tiff,
        ] {
            assert_eq!(ImageType::for_extension(t.extension()), Some(t));
        }
        assert_eq!(ImageType::for_extension("jpg"), Some(ImageType::Jpeg));
        assert_eq!(ImageType::for_extension("bmp"), None);
    }

    #[test]
    fn unknown_content_type_is_none() {
        assert_eq!(ImageType::for_content_type("text/html"), None);
        assert_eq!(ImageType::for_content_type(""), None);
    }

    #[test]
    fn preferred_output_keeps_transparency_lossless() {
        assert_eq!(
            ImageType::Png.preferred_output_type(),
            Some(ImageType::Png)
        );
        assert_eq!(
            ImageType::Gif.preferred_output_type(),
            Some(ImageType::Png)
        );
        assert_eq!(
            ImageType::Svg.preferred_output_type(),
            Some(ImageType::Png)
        );
    }

    #[test]
    fn preferred_output_downgrades_opaque_formats_to_jpeg() {
        for t in [ImageType::Jpeg, ImageType::Tiff, ImageType::Eps, ImageType::Pdf] {
            assert_eq!(t.preferred_output_type(), Some(ImageType::Jpeg));
        }
    }

    #[test]
    fn scalable_formats() {
        assert!(ImageType::Pdf.is_scalable());
        assert!(ImageType::Eps.is_scalable());
        assert!(ImageType::Svg.is_scalable());
        assert!(!ImageType::Jpeg.is_scalable());
    }
}
