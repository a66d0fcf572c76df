//! JPEG2000 (JP2 container) header inspection.
//!
//! Reads the image header, colour specification and resolution boxes from the
//! `jp2h` superbox. The codestream itself is left alone.

use byteorder::{BigEndian, ByteOrder};

use super::ColorMode;
use crate::error::{Error, Result};

/// The JP2 signature box, always the first twelve bytes of the file.
pub const SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];

/// Header fields of a JP2 file.
#[derive(Debug, Clone, PartialEq)]
pub struct Jp2Info {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Enumerated colour space, if it maps to a known colour model
    pub color: Option<ColorMode>,
    /// Capture or display resolution in dots per inch
    pub dpi: Option<(f64, f64)>,
}

/// Check for the JP2 signature box.
pub fn is_jp2(data: &[u8]) -> bool {
    data.starts_with(&SIGNATURE)
}

/// Split a byte range into `(box type, payload)` pairs.
fn boxes(data: &[u8]) -> Result<Vec<([u8; 4], &[u8])>> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos + 8 <= data.len() {
        let length = BigEndian::read_u32(&data[pos..]) as u64;
        let mut box_type = [0u8; 4];
        box_type.copy_from_slice(&data[pos + 4..pos + 8]);
        pos += 8;

        let (box_len, header_len) = match length {
            // extends to the end of the data
            0 => ((data.len() - pos + 8) as u64, 8),
            1 => {
                if pos + 8 > data.len() {
                    return Err(Error::Jpeg2000("box missing extended length".to_string()));
                }
                let ext = BigEndian::read_u64(&data[pos..]);
                pos += 8;
                (ext, 16)
            },
            n => (n, 8),
        };
        if box_len < header_len {
            return Err(Error::Jpeg2000("invalid box length".to_string()));
        }
        let payload_len = box_len - header_len;
        if payload_len > (data.len() - pos) as u64 {
            return Err(Error::Jpeg2000(format!(
                "box '{}' exceeds the file",
                String::from_utf8_lossy(&box_type)
            )));
        }
        let payload_len = payload_len as usize;
        out.push((box_type, &data[pos..pos + payload_len]));
        pos += payload_len;
    }
    Ok(out)
}

/// Parse the header boxes of a JP2 file.
pub fn parse(data: &[u8]) -> Result<Jp2Info> {
    if !is_jp2(data) {
        return Err(Error::Jpeg2000("missing JP2 signature".to_string()));
    }

    let header = boxes(data)?
        .into_iter()
        .find(|(t, _)| t == b"jp2h")
        .map(|(_, payload)| payload)
        .ok_or_else(|| Error::Jpeg2000("no jp2h header box".to_string()))?;

    let mut size = None;
    let mut color = None;
    let mut dpi = None;
    for (box_type, payload) in boxes(header)? {
        match &box_type {
            b"ihdr" => {
                if payload.len() < 8 {
                    return Err(Error::Jpeg2000("short ihdr box".to_string()));
                }
                let height = BigEndian::read_u32(&payload[0..4]);
                let width = BigEndian::read_u32(&payload[4..8]);
                size = Some((width, height));
            },
            b"colr" => {
                // method 1 is an enumerated colour space
                if payload.len() >= 7 && payload[0] == 1 {
                    color = enumerated_color(BigEndian::read_u32(&payload[3..7]));
                }
            },
            b"res " => dpi = resolution(payload)?,
            _ => {},
        }
    }

    let (width, height) = size.ok_or_else(|| Error::Jpeg2000("no ihdr box".to_string()))?;
    log::debug!("JPEG2000 {}x{}, colour {:?}, dpi {:?}", width, height, color, dpi);
    Ok(Jp2Info {
        width,
        height,
        color,
        dpi,
    })
}

fn enumerated_color(cs: u32) -> Option<ColorMode> {
    match cs {
        16 | 18 => Some(ColorMode::Rgb),
        17 => Some(ColorMode::Gray),
        12 => Some(ColorMode::Cmyk),
        _ => None,
    }
}

/// Resolution superbox. Capture resolution (`resc`) wins over display (`resd`).
fn resolution(payload: &[u8]) -> Result<Option<(f64, f64)>> {
    let mut capture = None;
    let mut display = None;
    for (box_type, inner) in boxes(payload)? {
        match &box_type {
            b"resc" => capture = grid_resolution(inner),
            b"resd" => display = grid_resolution(inner),
            _ => {},
        }
    }
    Ok(capture.or(display))
}

/// `VR_N VR_D HR_N HR_D VR_E HR_E`, in grid points per metre.
fn grid_resolution(payload: &[u8]) -> Option<(f64, f64)> {
    if payload.len() < 10 {
        return None;
    }
    let vr_n = BigEndian::read_u16(&payload[0..2]) as f64;
    let vr_d = BigEndian::read_u16(&payload[2..4]) as f64;
    let hr_n = BigEndian::read_u16(&payload[4..6]) as f64;
    let hr_d = BigEndian::read_u16(&payload[6..8]) as f64;
    let vr_e = payload[8] as i8 as i32;
    let hr_e = payload[9] as i8 as i32;
    if vr_d == 0.0 || hr_d == 0.0 {
        return None;
    }
    let per_metre = |n: f64, d: f64, e: i32| n / d * 10f64.powi(e);
    Some((
        per_metre(hr_n, hr_d, hr_e) * 0.0254,
        per_metre(vr_n, vr_d, vr_e) * 0.0254,
    ))
}
