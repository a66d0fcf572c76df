//! End-to-end conversion tests: real image bytes in, PDF bytes out.

use std::io::{Read, Write};

use imgpdf::api::{convert, convert_files};
use imgpdf::geometry::{GeometrySpec, SizeSpec};
use imgpdf::images::{load_image, ColorMode, ImageFormat};
use imgpdf::writer::DocumentMetadata;
use imgpdf::{ConvertConfig, Error};
use regex::bytes::Regex;

// Minimal valid JPEG data (1x1 gray pixel)
const MINIMAL_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43, 0x00, 0x08, 0x06, 0x06, 0x07, 0x06, 0x05, 0x08,
    0x07, 0x07, 0x07, 0x09, 0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B, 0x0C, 0x19, 0x12,
    0x13, 0x0F, 0x14, 0x1D, 0x1A, 0x1F, 0x1E, 0x1D, 0x1A, 0x1C, 0x1C, 0x20, 0x24, 0x2E, 0x27, 0x20,
    0x22, 0x2C, 0x23, 0x1C, 0x1C, 0x28, 0x37, 0x29, 0x2C, 0x30, 0x31, 0x34, 0x34, 0x34, 0x1F, 0x27,
    0x39, 0x3D, 0x38, 0x32, 0x3C, 0x2E, 0x33, 0x34, 0x32, 0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x01,
    0x00, 0x01, 0x01, 0x01, 0x11, 0x00, 0xFF, 0xC4, 0x00, 0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01,
    0x01, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04,
    0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0xFF, 0xC4, 0x00, 0xB5, 0x10, 0x00, 0x02, 0x01, 0x03,
    0x03, 0x02, 0x04, 0x03, 0x05, 0x05, 0x04, 0x04, 0x00, 0x00, 0x01, 0x7D, 0x01, 0x02, 0x03, 0x00,
    0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07, 0x22, 0x71, 0x14, 0x32,
    0x81, 0x91, 0xA1, 0x08, 0x23, 0x42, 0xB1, 0xC1, 0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72,
    0x82, 0x09, 0x0A, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35,
    0x36, 0x37, 0x38, 0x39, 0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55,
    0x56, 0x57, 0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
    0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92, 0x93, 0x94,
    0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xB2,
    0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9,
    0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6,
    0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA, 0xFF, 0xDA,
    0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00, 0xFB, 0xD5, 0xDB, 0x20, 0xA8, 0xF1, 0x47, 0xFF,
    0xD9,
];

/// JPEG headers only: SOF0 of 20x10 with `components`, JFIF density in dpi,
/// optional Adobe APP14 marker.
fn jpeg_headers(components: u8, dpi: u16, adobe: bool) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[1, 1, 1]);
    out.extend_from_slice(&dpi.to_be_bytes());
    out.extend_from_slice(&dpi.to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    if adobe {
        out.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
        out.extend_from_slice(b"Adobe");
        out.extend_from_slice(&[0, 100, 0, 0, 0, 0, 2]);
    }
    out.extend_from_slice(&[0xFF, 0xC0]);
    out.extend_from_slice(&(8 + 3 * components as u16).to_be_bytes());
    out.extend_from_slice(&[8, 0, 10, 0, 20, components]);
    for id in 1..=components {
        out.extend_from_slice(&[id, 0x11, 0]);
    }
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 1, 1, 0, 0, 63, 0, 0xFF, 0xD9]);
    out
}

fn jp2_box(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = ((data.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    out
}

/// JP2 container headers for an sRGB image of the given size.
fn jp2_headers(width: u32, height: u32) -> Vec<u8> {
    let mut ihdr = height.to_be_bytes().to_vec();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&[0, 3, 7, 7, 0, 0]);
    let mut colr = vec![1, 0, 0];
    colr.extend_from_slice(&16u32.to_be_bytes());

    let mut header = jp2_box(b"ihdr", &ihdr);
    header.extend(jp2_box(b"colr", &colr));

    let mut out = vec![0, 0, 0, 0x0C, b'j', b'P', b' ', b' ', 0x0D, 0x0A, 0x87, 0x0A];
    out.extend(jp2_box(b"ftyp", b"jp2 \0\0\0\0jp2 "));
    out.extend(jp2_box(b"jp2h", &header));
    out.extend(jp2_box(b"jp2c", &[0xFF, 0x4F, 0xFF, 0x51, 0xFF, 0xD9]));
    out
}

/// Create a minimal valid RGB PNG, with a pHYs chunk when `ppm` is given.
fn create_test_png(width: u32, height: u32, ppm: Option<u32>) -> Vec<u8> {
    fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], chunk_data: &[u8]) {
        out.extend_from_slice(&(chunk_data.len() as u32).to_be_bytes());
        out.extend_from_slice(chunk_type);
        out.extend_from_slice(chunk_data);
        let mut crc_data = Vec::new();
        crc_data.extend_from_slice(chunk_type);
        crc_data.extend_from_slice(chunk_data);
        out.extend_from_slice(&crc32fast::hash(&crc_data).to_be_bytes());
    }

    let mut raw_pixels = Vec::new();
    for _ in 0..height {
        raw_pixels.push(0);
        for _ in 0..width {
            raw_pixels.extend_from_slice(&[255, 0, 0]);
        }
    }
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&raw_pixels).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    write_chunk(&mut data, b"IHDR", &ihdr);
    if let Some(ppm) = ppm {
        let mut phys = ppm.to_be_bytes().to_vec();
        phys.extend_from_slice(&ppm.to_be_bytes());
        phys.push(1);
        write_chunk(&mut data, b"pHYs", &phys);
    }
    write_chunk(&mut data, b"IDAT", &compressed);
    write_chunk(&mut data, b"IEND", &[]);
    data
}

fn config() -> ConvertConfig {
    ConvertConfig::new().with_metadata(DocumentMetadata::new().nodate(true))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn text(pdf: &[u8]) -> String {
    String::from_utf8_lossy(pdf).to_string()
}

#[test]
fn test_jpeg_embedded_unmodified() {
    let pdf = convert(&[MINIMAL_JPEG], &config()).unwrap();
    assert!(contains(&pdf, MINIMAL_JPEG));
    let t = text(&pdf);
    assert!(t.contains("/Filter /DCTDecode"));
    assert!(t.contains("/ColorSpace /DeviceGray"));
    assert!(t.contains(&format!("/Length {}", MINIMAL_JPEG.len())));
    assert!(t.starts_with("%PDF-1.3\n"));
}

#[test]
fn test_jpeg_without_density_uses_default_dpi() {
    // 1x1 px at 96 dpi
    let pdf = convert(&[MINIMAL_JPEG], &config()).unwrap();
    assert!(text(&pdf).contains("/MediaBox [ 0 0 0.7500 0.7500 ]"));
}

#[test]
fn test_jpeg_density_sets_page_size() {
    let jpeg = jpeg_headers(3, 72, false);
    let pdf = convert(&[&jpeg], &config()).unwrap();
    let t = text(&pdf);
    assert!(t.contains("/MediaBox [ 0 0 20.0000 10.0000 ]"));
    assert!(t.contains("/ColorSpace /DeviceRGB"));
    assert!(t.contains("20.0000 0 0 10.0000 0 0 cm"));
}

#[test]
fn test_cmyk_jpeg_adobe_marker_inverts() {
    let pdf = convert(&[jpeg_headers(4, 72, true)], &config()).unwrap();
    let t = text(&pdf);
    assert!(t.contains("/ColorSpace /DeviceCMYK"));
    assert!(t.contains("/Decode [ 1 0 1 0 1 0 1 0 ]"));

    let pdf = convert(&[jpeg_headers(4, 72, false)], &config()).unwrap();
    let t = text(&pdf);
    assert!(t.contains("/ColorSpace /DeviceCMYK"));
    assert!(!t.contains("/Decode"));
}

#[test]
fn test_jpeg2000_forces_pdf_1_5() {
    let jp2 = jp2_headers(8, 4);
    let pdf = convert(&[jpeg_headers(3, 72, false), jp2.clone()], &config()).unwrap();
    assert!(pdf.starts_with(b"%PDF-1.5\n"));
    assert!(contains(&pdf, &jp2));
    assert!(text(&pdf).contains("/Filter /JPXDecode"));
}

#[test]
fn test_monochrome_jpeg_rejected() {
    let config = config().with_colorspace(ColorMode::Bilevel);
    let err = convert(&[MINIMAL_JPEG], &config).unwrap_err();
    assert!(matches!(err, Error::MonochromePassThrough("JPEG")));
}

#[test]
fn test_png_is_flate_compressed() {
    let png = create_test_png(3, 2, Some(2835));
    let pdf = convert(&[&png], &config()).unwrap();
    let t = text(&pdf);
    assert!(t.contains("/Filter /FlateDecode"));
    assert!(t.contains("/Width 3"));
    assert!(t.contains("/Height 2"));
    // 2835 px/m rounds to 72 dpi
    assert!(t.contains("/MediaBox [ 0 0 3.0000 2.0000 ]"));

    let re = Regex::new(r"/Length (\d+)\n    /Subtype /Image\n    /Type /XObject\n    /Width 3\n>>\nstream\n").unwrap();
    let caps = re.captures(&pdf).unwrap();
    let length: usize = std::str::from_utf8(&caps[1]).unwrap().parse().unwrap();
    let start = caps.get(0).unwrap().end();
    let mut samples = Vec::new();
    flate2::read::ZlibDecoder::new(&pdf[start..start + length])
        .read_to_end(&mut samples)
        .unwrap();
    assert_eq!(samples, [255, 0, 0].repeat(6));
}

#[test]
fn test_forced_gray_colorspace() {
    let png = create_test_png(2, 2, None);
    let pdf = convert(&[&png], &config().with_colorspace(ColorMode::Gray)).unwrap();
    assert!(text(&pdf).contains("/ColorSpace /DeviceGray"));
}

#[test]
fn test_pagesize_applies_to_every_page() {
    let geometry = GeometrySpec {
        pagesize: Some(SizeSpec::parse_page("A4!").unwrap()),
        ..Default::default()
    };
    let config = config().with_geometry(geometry);
    let pdf = convert(&[jpeg_headers(3, 72, false), create_test_png(5, 5, None)], &config).unwrap();
    let t = text(&pdf);
    assert_eq!(t.matches("/MediaBox [ 0 0 595.0000 842.0000 ]").count(), 2);
    assert!(t.contains("/Count 2"));
}

#[test]
fn test_metadata_in_info() {
    let metadata = DocumentMetadata::new()
        .title("Scans")
        .author("A")
        .keywords(["x", "y"])
        .nodate(true);
    let pdf = convert(&[MINIMAL_JPEG], &ConvertConfig::new().with_metadata(metadata)).unwrap();
    let mut needle = b"/Title (\xFE\xFF".to_vec();
    needle.extend("Scans".encode_utf16().flat_map(u16::to_be_bytes));
    needle.push(b')');
    assert!(contains(&pdf, &needle));
    assert!(!text(&pdf).contains("/CreationDate"));
    assert!(text(&pdf).contains("/Keywords ("));
}

#[test]
fn test_nodate_is_deterministic() {
    let inputs = [MINIMAL_JPEG.to_vec(), create_test_png(4, 4, None)];
    assert_eq!(convert(&inputs, &config()).unwrap(), convert(&inputs, &config()).unwrap());
}

#[test]
fn test_load_image_detection() {
    assert_eq!(load_image(MINIMAL_JPEG, None).unwrap().format, ImageFormat::Jpeg);
    assert_eq!(load_image(&jp2_headers(2, 2), None).unwrap().format, ImageFormat::Jpeg2000);
    assert_eq!(load_image(&create_test_png(1, 1, None), None).unwrap().format, ImageFormat::Png);
}

#[test]
fn test_empty_input_is_error() {
    let none: Vec<Vec<u8>> = Vec::new();
    assert!(matches!(convert(&none, &config()), Err(Error::NoInput)));
}

#[test]
fn test_convert_files() {
    let dir = tempfile::tempdir().unwrap();
    let jpeg = dir.path().join("a.jpg");
    let png = dir.path().join("b.png");
    std::fs::write(&jpeg, MINIMAL_JPEG).unwrap();
    std::fs::write(&png, create_test_png(2, 2, None)).unwrap();

    let pdf = convert_files(&[&jpeg, &png], &config()).unwrap();
    assert!(text(&pdf).contains("/Count 2"));

    let missing = dir.path().join("missing.jpg");
    assert!(matches!(convert_files(&[missing], &config()), Err(Error::Io(_))));
}
