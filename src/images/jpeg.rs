//! JPEG header inspection.
//!
//! Walks the marker segments up to the start of scan and collects the frame
//! size, the component count, the JFIF density and whether an Adobe APP14
//! segment is present. The entropy-coded data is never touched.

use byteorder::{BigEndian, ByteOrder};

use super::ColorMode;
use crate::error::{Error, Result};

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP14: u8 = 0xEE;
const SOS: u8 = 0xDA;

/// What the header tells us about a JPEG.
#[derive(Debug, Clone, PartialEq)]
pub struct JpegInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of colour components in the frame
    pub components: u8,
    /// JFIF density converted to dots per inch
    pub dpi: Option<(f64, f64)>,
    /// An Adobe APP14 segment was found
    pub adobe_app14: bool,
}

impl JpegInfo {
    /// Colour model implied by the component count.
    ///
    /// Adobe applications write CMYK JPEGs with inverted samples, so a
    /// four-component frame with an APP14 segment is `CMYK;I`.
    pub fn color_mode(&self) -> ColorMode {
        match (self.components, self.adobe_app14) {
            (1, _) => ColorMode::Gray,
            (3, _) => ColorMode::Rgb,
            (4, true) => ColorMode::CmykInverted,
            (4, false) => ColorMode::Cmyk,
            (n, _) => ColorMode::Other(format!("{} components", n)),
        }
    }
}

/// Check for the start-of-image marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&SOI)
}

fn is_sof(marker: u8) -> bool {
    matches!(
        marker,
        0xC0 | 0xC1 | 0xC2 | 0xC3 | 0xC5 | 0xC6 | 0xC7 | 0xC9 | 0xCA | 0xCB | 0xCD | 0xCE | 0xCF
    )
}

fn truncated() -> Error {
    Error::ImageDecode("truncated JPEG header".to_string())
}

/// Parse the JPEG header.
pub fn parse(data: &[u8]) -> Result<JpegInfo> {
    if !is_jpeg(data) {
        return Err(Error::ImageDecode("not a JPEG file".to_string()));
    }

    let mut frame: Option<(u32, u32, u8)> = None;
    let mut dpi = None;
    let mut adobe_app14 = false;

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        pos += 2;
        // standalone markers carry no length
        if marker == 0x00 || marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            continue;
        }
        if marker == SOS {
            break;
        }

        if pos + 2 > data.len() {
            return Err(truncated());
        }
        let length = BigEndian::read_u16(&data[pos..]) as usize;
        if length < 2 || pos + length > data.len() {
            return Err(truncated());
        }
        let segment = &data[pos + 2..pos + length];
        pos += length;

        match marker {
            APP0 if segment.len() >= 12 && segment.starts_with(b"JFIF\0") => {
                dpi = jfif_density(segment);
            },
            APP14 if segment.starts_with(b"Adobe") => {
                adobe_app14 = true;
            },
            m if is_sof(m) => {
                if segment.len() < 6 {
                    return Err(truncated());
                }
                let height = BigEndian::read_u16(&segment[1..3]) as u32;
                let width = BigEndian::read_u16(&segment[3..5]) as u32;
                frame = Some((width, height, segment[5]));
            },
            _ => {},
        }
    }

    let (width, height, components) =
        frame.ok_or_else(|| Error::ImageDecode("could not find JPEG dimensions".to_string()))?;
    log::debug!(
        "JPEG frame {}x{}, {} components, adobe={}",
        width,
        height,
        components,
        adobe_app14
    );
    Ok(JpegInfo {
        width,
        height,
        components,
        dpi,
        adobe_app14,
    })
}

/// Density from a JFIF APP0 segment. Unit 1 is dots per inch, 2 dots per cm.
fn jfif_density(segment: &[u8]) -> Option<(f64, f64)> {
    let unit = segment[7];
    let x = BigEndian::read_u16(&segment[8..10]) as f64;
    let y = BigEndian::read_u16(&segment[10..12]) as f64;
    if x == 0.0 || y == 0.0 {
        return None;
    }
    match unit {
        1 => Some((x, y)),
        2 => Some((x * 2.54, y * 2.54)),
        _ => None,
    }
}
