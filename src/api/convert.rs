//! Conversion entry points.

use std::fs;
use std::path::Path;

use crate::config::ConvertConfig;
use crate::error::{Error, Result};
use crate::images::load_image;
use crate::writer::PdfWriter;

/// Convert in-memory images into a PDF document.
///
/// Fails with [`Error::NoInput`] when `images` is empty. Any image that
/// cannot be read or placed aborts the whole conversion.
pub fn convert<B: AsRef<[u8]>>(images: &[B], config: &ConvertConfig) -> Result<Vec<u8>> {
    if images.is_empty() {
        return Err(Error::NoInput);
    }

    let mut writer = PdfWriter::with_config(config.writer_config());
    for (index, bytes) in images.iter().enumerate() {
        log::debug!("input {}: {} bytes", index + 1, bytes.as_ref().len());
        let source = load_image(bytes.as_ref(), config.colorspace.as_ref())?;
        writer.add_image(source, &config.geometry)?;
    }
    writer.finish()
}

/// Read image files and convert them into a PDF document.
pub fn convert_files<P: AsRef<Path>>(paths: &[P], config: &ConvertConfig) -> Result<Vec<u8>> {
    let images = paths
        .iter()
        .map(|path| {
            log::debug!("reading {}", path.as_ref().display());
            fs::read(path)
        })
        .collect::<std::io::Result<Vec<_>>>()?;
    convert(&images, config)
}
