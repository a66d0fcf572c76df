//! Image XObjects.
//!
//! Images are represented as XObjects. JPEG and JPEG2000 data is embedded
//! exactly as read, with the matching decode filter; everything else is
//! flattened to 8-bit samples and Flate compressed.
//!
//! # Color Spaces
//!
//! - DeviceGray (1 component)
//! - DeviceRGB (3 components)
//! - DeviceCMYK (4 components)

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;

use super::pdf_writer::PdfVersion;
use crate::error::{Error, Result};
use crate::images::{ColorMode, ImageFormat, SourceImage};
use crate::object::Object;

/// Color space for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Grayscale (1 component per pixel)
    DeviceGray,
    /// RGB color (3 components per pixel)
    DeviceRGB,
    /// CMYK color (4 components per pixel)
    DeviceCMYK,
}

impl ColorSpace {
    /// Device colour space for a colour model.
    pub fn for_mode(mode: &ColorMode) -> Result<Self> {
        match mode {
            ColorMode::Gray => Ok(ColorSpace::DeviceGray),
            ColorMode::Rgb => Ok(ColorSpace::DeviceRGB),
            ColorMode::Cmyk | ColorMode::CmykInverted => Ok(ColorSpace::DeviceCMYK),
            other => Err(Error::UnsupportedColorSpace(other.to_string())),
        }
    }

    /// Get the number of color components.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::DeviceGray => 1,
            ColorSpace::DeviceRGB => 3,
            ColorSpace::DeviceCMYK => 4,
        }
    }

    /// Get the PDF name for this color space.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// Stream filter of an image XObject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// JPEG pass-through
    DCTDecode,
    /// JPEG2000 pass-through
    JPXDecode,
    /// zlib-compressed samples
    FlateDecode,
}

impl ImageFilter {
    /// Get the PDF name for this filter.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ImageFilter::DCTDecode => "DCTDecode",
            ImageFilter::JPXDecode => "JPXDecode",
            ImageFilter::FlateDecode => "FlateDecode",
        }
    }
}

/// Image data ready for embedding.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per component (always 8)
    pub bits_per_component: u8,
    /// Color space
    pub color_space: ColorSpace,
    /// Stream filter
    pub filter: ImageFilter,
    /// Samples are stored inverted (`/Decode [1 0 ...]`)
    pub inverted: bool,
    /// Encoded image data
    pub data: Vec<u8>,
}

impl ImageData {
    /// Choose the encoding for a source image and produce the stream payload.
    pub fn from_source(source: SourceImage) -> Result<Self> {
        let SourceImage {
            width,
            height,
            format,
            color,
            raw,
            pixels,
            ..
        } = source;

        let (color, filter, data) = match format {
            ImageFormat::Jpeg | ImageFormat::Jpeg2000 => {
                if color == ColorMode::Bilevel {
                    return Err(Error::MonochromePassThrough(format.name()));
                }
                let filter = if format == ImageFormat::Jpeg {
                    ImageFilter::DCTDecode
                } else {
                    ImageFilter::JPXDecode
                };
                log::debug!("{}: embedding {} bytes unmodified", format.name(), raw.len());
                (color, filter, raw)
            },
            _ => {
                let pixels = pixels
                    .ok_or_else(|| Error::Image("no decoded pixel data".to_string()))?;
                // no CCITT support, bitonal goes out as gray
                let color = if color == ColorMode::Bilevel {
                    ColorMode::Gray
                } else {
                    color
                };
                let samples = flatten(&pixels, &color)?;
                log::debug!("{}: compressing {} sample bytes", format.name(), samples.len());
                (color, ImageFilter::FlateDecode, compress_image_data(&samples)?)
            },
        };

        Ok(Self {
            width,
            height,
            bits_per_component: 8,
            color_space: ColorSpace::for_mode(&color)?,
            filter,
            inverted: color == ColorMode::CmykInverted,
            data,
        })
    }

    /// Lowest PDF version able to decode this image.
    pub fn min_version(&self) -> PdfVersion {
        match self.filter {
            ImageFilter::JPXDecode => PdfVersion::V1_5,
            _ => PdfVersion::V1_3,
        }
    }

    /// Build the PDF Image XObject dictionary, `/Length` included.
    pub fn build_xobject_dict(&self) -> Object {
        let mut entries = vec![
            ("Type", Object::name("XObject")),
            ("Subtype", Object::name("Image")),
            ("Width", Object::Integer(self.width as i64)),
            ("Height", Object::Integer(self.height as i64)),
            ("ColorSpace", Object::name(self.color_space.pdf_name())),
            ("BitsPerComponent", Object::Integer(self.bits_per_component as i64)),
            ("Filter", Object::name(self.filter.pdf_name())),
            ("Length", Object::Integer(self.data.len() as i64)),
        ];
        if self.inverted {
            let decode = (0..self.color_space.components())
                .flat_map(|_| [Object::Integer(1), Object::Integer(0)])
                .collect();
            entries.push(("Decode", Object::Array(decode)));
        }
        Object::dict(entries)
    }
}

/// Flatten pixels into interleaved 8-bit samples of the given colour model.
fn flatten(pixels: &DynamicImage, color: &ColorMode) -> Result<Vec<u8>> {
    match color {
        ColorMode::Gray => Ok(pixels.to_luma8().into_raw()),
        ColorMode::Rgb => Ok(pixels.to_rgb8().into_raw()),
        ColorMode::Cmyk => Ok(pixels
            .to_rgb8()
            .pixels()
            .flat_map(|p| [255 - p[0], 255 - p[1], 255 - p[2], 0])
            .collect()),
        ColorMode::CmykInverted => Ok(pixels
            .to_rgb8()
            .pixels()
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect()),
        other => Err(Error::UnsupportedColorSpace(other.to_string())),
    }
}

/// Compress image data using Flate.
fn compress_image_data(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, RgbImage};

    fn jpeg_source(color: ColorMode) -> SourceImage {
        SourceImage {
            width: 16,
            height: 8,
            format: ImageFormat::Jpeg,
            color,
            dpi: None,
            adobe_app14: false,
            raw: vec![0xFF, 0xD8, 0xFF, 0xD9],
            pixels: None,
        }
    }

    fn raster_source(color: ColorMode, pixels: DynamicImage) -> SourceImage {
        SourceImage {
            width: pixels.width(),
            height: pixels.height(),
            format: ImageFormat::Png,
            color,
            dpi: None,
            adobe_app14: false,
            raw: Vec::new(),
            pixels: Some(pixels),
        }
    }

    fn inflate(data: &[u8]) -> Vec<u8> {
        use std::io::Read;
        let mut out = Vec::new();
        flate2::read::ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_color_space_components() {
        assert_eq!(ColorSpace::DeviceGray.components(), 1);
        assert_eq!(ColorSpace::DeviceRGB.components(), 3);
        assert_eq!(ColorSpace::DeviceCMYK.components(), 4);
    }

    #[test]
    fn test_color_space_for_mode() {
        assert_eq!(ColorSpace::for_mode(&ColorMode::Gray).unwrap(), ColorSpace::DeviceGray);
        assert_eq!(
            ColorSpace::for_mode(&ColorMode::CmykInverted).unwrap(),
            ColorSpace::DeviceCMYK
        );
        assert!(matches!(
            ColorSpace::for_mode(&ColorMode::Other("P".into())),
            Err(Error::UnsupportedColorSpace(_))
        ));
    }

    #[test]
    fn test_jpeg_pass_through() {
        let image = ImageData::from_source(jpeg_source(ColorMode::Rgb)).unwrap();
        assert_eq!(image.filter, ImageFilter::DCTDecode);
        assert_eq!(image.data, vec![0xFF, 0xD8, 0xFF, 0xD9]);
        assert_eq!(image.min_version(), PdfVersion::V1_3);

        let dict = image.build_xobject_dict();
        let d = dict.as_dict().unwrap();
        assert_eq!(d.get("Filter"), Some(&Object::name("DCTDecode")));
        assert_eq!(d.get("Length"), Some(&Object::Integer(4)));
        assert_eq!(d.get("ColorSpace"), Some(&Object::name("DeviceRGB")));
        assert!(d.get("Decode").is_none());
    }

    #[test]
    fn test_jpx_needs_pdf_1_5() {
        let mut source = jpeg_source(ColorMode::Rgb);
        source.format = ImageFormat::Jpeg2000;
        let image = ImageData::from_source(source).unwrap();
        assert_eq!(image.filter, ImageFilter::JPXDecode);
        assert_eq!(image.min_version(), PdfVersion::V1_5);
    }

    #[test]
    fn test_inverted_cmyk_decode_array() {
        let image = ImageData::from_source(jpeg_source(ColorMode::CmykInverted)).unwrap();
        let dict = image.build_xobject_dict();
        let decode = dict.as_dict().unwrap().get("Decode").unwrap().as_array().unwrap();
        let values: Vec<i64> = decode.iter().filter_map(Object::as_integer).collect();
        assert_eq!(values, vec![1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_monochrome_pass_through_rejected() {
        let err = ImageData::from_source(jpeg_source(ColorMode::Bilevel)).unwrap_err();
        assert_eq!(err.to_string(), "JPEG images cannot be monochrome");
    }

    #[test]
    fn test_unsupported_pass_through_color() {
        let err = ImageData::from_source(jpeg_source(ColorMode::Other("2 components".into())));
        assert!(matches!(err, Err(Error::UnsupportedColorSpace(_))));
    }

    #[test]
    fn test_raster_rgb_flate() {
        let pixels = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30])));
        let image = ImageData::from_source(raster_source(ColorMode::Rgb, pixels)).unwrap();
        assert_eq!(image.filter, ImageFilter::FlateDecode);
        assert_eq!(inflate(&image.data), [10, 20, 30].repeat(4));
    }

    #[test]
    fn test_raster_bilevel_promoted_to_gray() {
        let pixels = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 1, image::Luma([255])));
        let image = ImageData::from_source(raster_source(ColorMode::Bilevel, pixels)).unwrap();
        assert_eq!(image.color_space, ColorSpace::DeviceGray);
        assert_eq!(inflate(&image.data), vec![255, 255, 255]);
    }

    #[test]
    fn test_raster_cmyk_conversion() {
        let pixels = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 100])));
        let image = ImageData::from_source(raster_source(ColorMode::Cmyk, pixels.clone())).unwrap();
        assert_eq!(inflate(&image.data), vec![0, 255, 155, 0]);
        assert!(!image.inverted);

        let image = ImageData::from_source(raster_source(ColorMode::CmykInverted, pixels)).unwrap();
        assert_eq!(inflate(&image.data), vec![255, 0, 100, 255]);
        assert!(image.inverted);
    }

    #[test]
    fn test_raster_without_pixels() {
        let mut source = jpeg_source(ColorMode::Rgb);
        source.format = ImageFormat::Png;
        assert!(matches!(ImageData::from_source(source), Err(Error::Image(_))));
    }
}
