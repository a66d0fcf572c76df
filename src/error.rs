//! Error types for the image-to-PDF converter.
//!
//! Every error here is fatal to the conversion: there is no partial document
//! and no retry. Non-fatal conditions (tiny page dimensions) are logged instead.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting images to PDF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed page or image size specification
    #[error("Invalid size '{spec}': {reason}")]
    InvalidSize {
        /// The offending size string (or a description of the spec)
        spec: String,
        /// Why it was rejected
        reason: String,
    },

    /// Length with a unit suffix we do not know
    #[error("Unrecognized unit '{0}'")]
    UnrecognizedUnit(String),

    /// Malformed border specification
    #[error("Invalid border '{0}': expected one to four lengths separated by ':'")]
    InvalidBorder(String),

    /// Date string that none of the accepted formats could parse
    #[error("Cannot parse date: {0}")]
    InvalidDate(String),

    /// Non-positive or non-finite DPI value
    #[error("Invalid DPI value: {0}")]
    InvalidDpi(f64),

    /// Colour model with no PDF device colour space
    #[error("Unsupported color space: {0}")]
    UnsupportedColorSpace(String),

    /// Bitonal colour model requested for a pass-through codec
    #[error("{0} images cannot be monochrome")]
    MonochromePassThrough(&'static str),

    /// Conversion called without any input image
    #[error("No input images given")]
    NoInput,

    /// Input that neither the image decoder nor the JPEG2000 parser accepts
    #[error("Cannot read input image (not JPEG2000): {0}")]
    ImageDecode(String),

    /// Malformed JPEG2000 container
    #[error("JPEG2000 error: {0}")]
    Jpeg2000(String),

    /// Other image-level failure (zero size, missing pixel data, compression)
    #[error("Image error: {0}")]
    Image(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidSize`].
    pub(crate) fn invalid_size(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSize {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}
