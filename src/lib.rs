// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::enum_variant_names)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # imgpdf
//!
//! Lossless conversion of raster images into PDF documents.
//!
//! ## Core Features
//!
//! - **Pass-through embedding**: JPEG and JPEG2000 data is copied into the PDF
//!   byte for byte (`DCTDecode` / `JPXDecode`), never re-encoded
//! - **Lossless raster input**: PNG, TIFF, GIF and BMP are stored as Flate
//!   compressed samples
//! - **Page geometry**: paper sizes, image sizes, borders, fit modes and
//!   automatic orientation, with DPI taken from the image metadata
//! - **Reproducible output**: optional omission of dates for byte-identical
//!   documents
//!
//! ## Quick Start
//!
//! ```ignore
//! use imgpdf::{api, ConvertConfig};
//! use imgpdf::geometry::{GeometrySpec, SizeSpec};
//!
//! # fn main() -> imgpdf::Result<()> {
//! let geometry = GeometrySpec {
//!     pagesize: Some(SizeSpec::parse_page("A4")?),
//!     ..Default::default()
//! };
//! let pdf = api::convert_files(&["scan.jpg"], &ConvertConfig::new().with_geometry(geometry))?;
//! std::fs::write("scan.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! - [`object`]: PDF value model and indirect objects
//! - [`geometry`]: size parsing and the page layout resolver
//! - [`images`]: input detection and decoding
//! - [`writer`]: XObjects, content streams, the document writer and serializer
//! - [`api`]: one-call conversion

#![warn(missing_docs)]

// Error handling
pub mod error;

// PDF value model
pub mod object;

// Page geometry
pub mod geometry;

// Image input
pub mod images;

// PDF writing
pub mod writer;

// Configuration
pub mod config;

// High-level API
pub mod api;

// Re-exports
pub use config::ConvertConfig;
pub use error::{Error, Result};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
