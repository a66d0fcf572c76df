//! PDF writing module for generating PDF files from images.
//!
//! ## Architecture
//!
//! ```text
//! SourceImage[]
//!     ↓
//! [resolve_layout] (pixels + dpi + options → page and placement)
//!     ↓
//! [ImageData] (pass-through or Flate payload → Image XObject)
//!     ↓
//! [ContentStreamBuilder] (placement → `q cm Do Q`)
//!     ↓
//! [PdfWriter] (assembles Catalog, Pages, pages and Info)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use imgpdf::geometry::GeometrySpec;
//! use imgpdf::images::load_image;
//! use imgpdf::writer::{DocumentMetadata, PdfWriter};
//!
//! let mut writer = PdfWriter::new(DocumentMetadata::new().title("Scans"));
//! writer.add_image(load_image(&std::fs::read("scan.jpg")?, None)?, &GeometrySpec::default())?;
//! let bytes = writer.finish()?;
//! ```

mod content_stream;
mod image_handler;
mod metadata;
mod object_serializer;
mod pdf_writer;

pub use content_stream::{format_number, ContentStreamBuilder, ContentStreamOp};
pub use image_handler::{ColorSpace, ImageData, ImageFilter};
pub use metadata::{parse_date, pdf_date, pdf_text_string, DocumentMetadata};
pub use object_serializer::ObjectSerializer;
pub use pdf_writer::{serialize_document, PdfVersion, PdfWriter, PdfWriterConfig};
