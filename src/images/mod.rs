//! Input image decoding.
//!
//! Identifies the format of each input and extracts what page assembly needs:
//! pixel size, colour mode, embedded resolution and the payload. JPEG and
//! JPEG2000 files are only inspected, never decoded, so their bytes can be
//! embedded unmodified. Every other format is decoded through the `image`
//! crate.
//!
//! # Detection order
//!
//! 1. JPEG2000 (JP2 signature box)
//! 2. JPEG (`FF D8` start-of-image marker)
//! 3. anything the `image` crate can decode

pub mod jp2;
pub mod jpeg;
pub mod raster;

use std::fmt;
use std::str::FromStr;

use image::DynamicImage;

use crate::error::{Error, Result};

/// Container format of an input image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG (embedded as-is with DCTDecode)
    Jpeg,
    /// JPEG2000 (embedded as-is with JPXDecode)
    Jpeg2000,
    /// PNG
    Png,
    /// TIFF
    Tiff,
    /// GIF
    Gif,
    /// BMP
    Bmp,
    /// Any other format the decoder understands
    Other,
}

impl ImageFormat {
    /// Whether the payload is embedded without decoding.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, ImageFormat::Jpeg | ImageFormat::Jpeg2000)
    }

    /// Short human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Jpeg2000 => "JPEG2000",
            ImageFormat::Png => "PNG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Gif => "GIF",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Other => "raster",
        }
    }
}

impl From<image::ImageFormat> for ImageFormat {
    fn from(format: image::ImageFormat) -> Self {
        match format {
            image::ImageFormat::Jpeg => ImageFormat::Jpeg,
            image::ImageFormat::Png => ImageFormat::Png,
            image::ImageFormat::Tiff => ImageFormat::Tiff,
            image::ImageFormat::Gif => ImageFormat::Gif,
            image::ImageFormat::Bmp => ImageFormat::Bmp,
            _ => ImageFormat::Other,
        }
    }
}

/// Colour model of the source pixels.
///
/// Parsed from and displayed as the usual mode tags (`L`, `RGB`, `CMYK`,
/// `CMYK;I`, `1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorMode {
    /// 8-bit grayscale
    Gray,
    /// 8-bit RGB
    Rgb,
    /// 8-bit CMYK
    Cmyk,
    /// 8-bit CMYK with inverted samples (Adobe APP14 JPEGs)
    CmykInverted,
    /// 1-bit bitonal
    Bilevel,
    /// Anything without a PDF device colour space
    Other(String),
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "L" => Ok(ColorMode::Gray),
            "RGB" => Ok(ColorMode::Rgb),
            "CMYK" => Ok(ColorMode::Cmyk),
            "CMYK;I" => Ok(ColorMode::CmykInverted),
            "1" => Ok(ColorMode::Bilevel),
            other => Err(Error::UnsupportedColorSpace(other.to_string())),
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Gray => write!(f, "L"),
            ColorMode::Rgb => write!(f, "RGB"),
            ColorMode::Cmyk => write!(f, "CMYK"),
            ColorMode::CmykInverted => write!(f, "CMYK;I"),
            ColorMode::Bilevel => write!(f, "1"),
            ColorMode::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A decoded or inspected input image.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Container format
    pub format: ImageFormat,
    /// Colour model (already replaced by a forced one, if any)
    pub color: ColorMode,
    /// Embedded resolution, rounded to whole dots per inch
    pub dpi: Option<(f64, f64)>,
    /// JPEG carried an Adobe APP14 marker
    pub adobe_app14: bool,
    /// Original file bytes
    pub raw: Vec<u8>,
    /// Decoded pixels, for formats that are not passed through
    pub pixels: Option<DynamicImage>,
}

/// Inspect or decode one input image.
///
/// `forced` replaces whatever colour model is detected.
pub fn load_image(bytes: &[u8], forced: Option<&ColorMode>) -> Result<SourceImage> {
    let mut image = if jp2::is_jp2(bytes) {
        let info = jp2::parse(bytes)?;
        let color = match (forced, info.color) {
            (Some(c), _) => c.clone(),
            (None, Some(c)) => c,
            (None, None) => {
                return Err(Error::UnsupportedColorSpace(
                    "unknown JPEG2000 colour space".to_string(),
                ))
            },
        };
        SourceImage {
            width: info.width,
            height: info.height,
            format: ImageFormat::Jpeg2000,
            color,
            dpi: info.dpi,
            adobe_app14: false,
            raw: bytes.to_vec(),
            pixels: None,
        }
    } else if jpeg::is_jpeg(bytes) {
        let info = jpeg::parse(bytes)?;
        SourceImage {
            width: info.width,
            height: info.height,
            format: ImageFormat::Jpeg,
            color: info.color_mode(),
            dpi: info.dpi,
            adobe_app14: info.adobe_app14,
            raw: bytes.to_vec(),
            pixels: None,
        }
    } else {
        raster::load(bytes)?
    };

    if let Some(color) = forced {
        image.color = color.clone();
    }
    image.dpi = image.dpi.map(|(x, y)| (x.round(), y.round()));

    log::debug!(
        "input: {} {}x{} px, colour {}, dpi {:?}",
        image.format.name(),
        image.width,
        image.height,
        image.color,
        image.dpi
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mode_round_trip_tags() {
        for tag in ["L", "RGB", "CMYK", "CMYK;I", "1"] {
            let mode: ColorMode = tag.parse().unwrap();
            assert_eq!(mode.to_string(), tag);
        }
    }

    #[test]
    fn test_unknown_color_mode() {
        assert!(matches!(
            "P".parse::<ColorMode>(),
            Err(Error::UnsupportedColorSpace(_))
        ));
        assert_eq!(ColorMode::Other("LAB".into()).to_string(), "LAB");
    }

    #[test]
    fn test_pass_through_formats() {
        assert!(ImageFormat::Jpeg.is_pass_through());
        assert!(ImageFormat::Jpeg2000.is_pass_through());
        assert!(!ImageFormat::Png.is_pass_through());
        assert_eq!(ImageFormat::from(image::ImageFormat::Png), ImageFormat::Png);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = load_image(b"definitely not an image", None).unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
    }

    #[test]
    fn test_forced_color_replaces_detected() {
        let jpeg = jpeg::tests::minimal_jpeg(3, None, false);
        let img = load_image(&jpeg, Some(&ColorMode::Gray)).unwrap();
        assert_eq!(img.color, ColorMode::Gray);
        assert_eq!(img.raw, jpeg);
    }

    #[test]
    fn test_dpi_rounded() {
        let jpeg = jpeg::tests::minimal_jpeg(3, Some((2, 118, 118)), false);
        let img = load_image(&jpeg, None).unwrap();
        // 118 dots/cm = 299.72 dpi
        assert_eq!(img.dpi, Some((300.0, 300.0)));
    }
}
