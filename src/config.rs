//! Configuration for image to PDF conversion.

use crate::geometry::{GeometrySpec, ResolverDefaults};
use crate::images::ColorMode;
use crate::writer::{DocumentMetadata, PdfWriterConfig};

/// Conversion configuration, shared by every input image.
#[derive(Debug, Clone, Default)]
pub struct ConvertConfig {
    /// Page size, image size, border, fit and DPI options.
    pub geometry: GeometrySpec,

    /// Colour model forced onto every input instead of the detected one.
    pub colorspace: Option<ColorMode>,

    /// Info dictionary contents.
    pub metadata: DocumentMetadata,

    /// Resolver constants.
    pub defaults: ResolverDefaults,
}

impl ConvertConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page geometry options.
    pub fn with_geometry(mut self, geometry: GeometrySpec) -> Self {
        self.geometry = geometry;
        self
    }

    /// Force a colour model.
    pub fn with_colorspace(mut self, colorspace: ColorMode) -> Self {
        self.colorspace = Some(colorspace);
        self
    }

    /// Set document metadata.
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set resolver constants.
    pub fn with_defaults(mut self, defaults: ResolverDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Writer configuration derived from this one.
    pub fn writer_config(&self) -> PdfWriterConfig {
        PdfWriterConfig::default()
            .with_metadata(self.metadata.clone())
            .with_defaults(self.defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SizeSpec;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::new();
        assert_eq!(config.geometry, GeometrySpec::default());
        assert!(config.colorspace.is_none());
        assert_eq!(config.defaults.dpi, 96.0);
    }

    #[test]
    fn test_builders() {
        let geometry = GeometrySpec {
            pagesize: Some(SizeSpec::parse_page("A4").unwrap()),
            ..Default::default()
        };
        let config = ConvertConfig::new()
            .with_geometry(geometry.clone())
            .with_colorspace(ColorMode::Gray)
            .with_metadata(DocumentMetadata::new().title("x").nodate(true));
        assert_eq!(config.geometry, geometry);
        assert_eq!(config.colorspace, Some(ColorMode::Gray));
        assert_eq!(config.writer_config().metadata.title.as_deref(), Some("x"));
    }
}
