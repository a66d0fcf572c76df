//! High-level API: turn a list of images into one PDF.
//!
//! Every input becomes one page, in input order, with the geometry options
//! of the [`ConvertConfig`] applied to each of them.
//!
//! ## Quick Start
//!
//! ```ignore
//! use imgpdf::api::convert_files;
//! use imgpdf::ConvertConfig;
//!
//! let pdf = convert_files(&["page1.jpg", "page2.png"], &ConvertConfig::default())?;
//! std::fs::write("out.pdf", pdf)?;
//! ```
//!
//! ## Page Size
//!
//! ```ignore
//! use imgpdf::geometry::{Border, GeometrySpec, SizeSpec};
//!
//! let geometry = GeometrySpec {
//!     pagesize: Some(SizeSpec::parse_page("A4")?),
//!     border: Some(Border::parse("2cm")?),
//!     ..Default::default()
//! };
//! let config = ConvertConfig::default().with_geometry(geometry);
//! ```

mod convert;

pub use convert::{convert, convert_files};
