//! Decoding of formats that are re-encoded (PNG, TIFF, GIF, BMP, ...).
//!
//! Pixels come from the `image` crate. It does not expose resolution
//! metadata, so PNG `pHYs` chunks and TIFF resolution tags are read here.

use std::io::Cursor;

use byteorder::{BigEndian, ByteOrder};
use image::{ColorType, GenericImageView};
use tiff::decoder::ifd::Value;
use tiff::decoder::Decoder as TiffDecoder;
use tiff::tags::Tag;

use super::{ColorMode, ImageFormat, SourceImage};
use crate::error::{Error, Result};

const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const INCHES_PER_METRE: f64 = 0.0254;

/// Decode an image into pixels.
///
/// Grayscale sources become `L`; everything else becomes `RGB` (alpha is
/// dropped when the pixels are flattened).
pub fn load(bytes: &[u8]) -> Result<SourceImage> {
    let format = image::guess_format(bytes)
        .map(ImageFormat::from)
        .unwrap_or(ImageFormat::Other);
    let pixels = image::load_from_memory(bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;

    let color = match pixels.color() {
        ColorType::L8 | ColorType::L16 => ColorMode::Gray,
        _ => ColorMode::Rgb,
    };
    let dpi = match format {
        ImageFormat::Png => png_dpi(bytes),
        ImageFormat::Tiff => tiff_dpi(bytes),
        _ => None,
    };

    let (width, height) = pixels.dimensions();
    Ok(SourceImage {
        width,
        height,
        format,
        color,
        dpi,
        adobe_app14: false,
        raw: bytes.to_vec(),
        pixels: Some(pixels),
    })
}

/// Physical pixel dimensions from the PNG `pHYs` chunk (unit 1 = metre).
pub fn png_dpi(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut pos = PNG_SIGNATURE.len();
    if !bytes.starts_with(PNG_SIGNATURE) {
        return None;
    }
    while pos + 8 <= bytes.len() {
        let length = BigEndian::read_u32(&bytes[pos..]) as usize;
        let chunk_type = &bytes[pos + 4..pos + 8];
        let data_start = pos + 8;
        let data_end = data_start.checked_add(length)?;
        if data_end > bytes.len() {
            return None;
        }
        match chunk_type {
            b"pHYs" if length >= 9 => {
                let data = &bytes[data_start..data_end];
                let x = BigEndian::read_u32(&data[0..4]) as f64;
                let y = BigEndian::read_u32(&data[4..8]) as f64;
                return (data[8] == 1 && x > 0.0 && y > 0.0)
                    .then(|| (x * INCHES_PER_METRE, y * INCHES_PER_METRE));
            },
            // pHYs must precede the image data
            b"IDAT" | b"IEND" => return None,
            _ => {},
        }
        // data plus CRC
        pos = data_end + 4;
    }
    None
}

/// Resolution from TIFF XResolution/YResolution and ResolutionUnit.
pub fn tiff_dpi(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut decoder = TiffDecoder::new(Cursor::new(bytes)).ok()?;
    let x = decoder.find_tag(Tag::XResolution).ok().flatten().and_then(number)?;
    let y = decoder.find_tag(Tag::YResolution).ok().flatten().and_then(number)?;
    // 1 = none, 2 = inch (default), 3 = centimetre
    let unit = decoder
        .find_tag(Tag::ResolutionUnit)
        .ok()
        .flatten()
        .and_then(number)
        .unwrap_or(2.0);
    if x <= 0.0 || y <= 0.0 {
        return None;
    }
    match unit as u32 {
        2 => Some((x, y)),
        3 => Some((x * 2.54, y * 2.54)),
        _ => None,
    }
}

fn number(value: Value) -> Option<f64> {
    match value {
        Value::Rational(n, d) if d != 0 => Some(n as f64 / d as f64),
        Value::Short(n) => Some(n as f64),
        Value::Unsigned(n) => Some(n as f64),
        _ => None,
    }
}
