//! PDF document writer.
//!
//! Assembles complete PDF documents with proper structure:
//! header, body, xref table, and trailer.
//!
//! Object numbering is fixed by insertion order. The Catalog is object 1 and
//! the Pages tree object 2; each page then adds its image XObject, its
//! content stream and the Page itself, in that order. The Info dictionary is
//! appended by [`PdfWriter::finish`], which consumes the writer, so it is
//! always the last object.

use std::fmt;
use std::io::Write;

use super::content_stream::ContentStreamBuilder;
use super::image_handler::ImageData;
use super::metadata::DocumentMetadata;
use super::object_serializer::ObjectSerializer;
use crate::error::Result;
use crate::geometry::{resolve_layout, GeometrySpec, Layout, ResolverDefaults};
use crate::images::SourceImage;
use crate::object::{IndirectObject, Object, ObjectRef};

/// Resource name of the image on every page.
const IMAGE_RESOURCE: &str = "Im0";

/// Header version of the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PdfVersion {
    /// PDF 1.3
    #[default]
    V1_3,
    /// PDF 1.5, needed for JPXDecode
    V1_5,
}

impl PdfVersion {
    /// Minor version number.
    pub fn minor(&self) -> u8 {
        match self {
            PdfVersion::V1_3 => 3,
            PdfVersion::V1_5 => 5,
        }
    }
}

impl fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1.{}", self.minor())
    }
}

/// Configuration for PDF generation.
#[derive(Debug, Clone, Default)]
pub struct PdfWriterConfig {
    /// Minimum PDF version; raised automatically by JPEG2000 pages
    pub version: PdfVersion,
    /// Info dictionary contents
    pub metadata: DocumentMetadata,
    /// Constants for page geometry resolution
    pub defaults: ResolverDefaults,
}

impl PdfWriterConfig {
    /// Set document metadata.
    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the minimum PDF version.
    pub fn with_version(mut self, version: PdfVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the geometry resolver constants.
    pub fn with_defaults(mut self, defaults: ResolverDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

/// PDF document writer.
///
/// Builds a complete PDF document with one image per page.
pub struct PdfWriter {
    config: PdfWriterConfig,
    /// Object table, object `n` at index `n - 1`
    objects: Vec<IndirectObject>,
    catalog: ObjectRef,
    pages: ObjectRef,
    /// Page references in input order
    kids: Vec<ObjectRef>,
    version: PdfVersion,
}

impl PdfWriter {
    /// Create a new PDF writer with the given metadata.
    pub fn new(metadata: DocumentMetadata) -> Self {
        Self::with_config(PdfWriterConfig::default().with_metadata(metadata))
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        let version = config.version;
        let mut writer = Self {
            config,
            objects: Vec::new(),
            catalog: ObjectRef::new(1),
            pages: ObjectRef::new(2),
            kids: Vec::new(),
            version,
        };
        let catalog = writer.add_object(
            Object::dict(vec![
                ("Type", Object::name("Catalog")),
                ("Pages", Object::Reference(writer.pages)),
            ]),
            None,
        );
        let pages = writer.add_object(writer.pages_dict(), None);
        debug_assert_eq!((catalog, pages), (writer.catalog, writer.pages));
        writer
    }

    /// Register an object, assigning the next object number.
    fn add_object(&mut self, value: Object, stream: Option<Vec<u8>>) -> ObjectRef {
        let id = ObjectRef::new(self.objects.len() as u32 + 1);
        self.objects.push(IndirectObject::new(id, value, stream));
        id
    }

    fn pages_dict(&self) -> Object {
        Object::dict(vec![
            ("Type", Object::name("Pages")),
            (
                "Kids",
                Object::Array(self.kids.iter().copied().map(Object::Reference).collect()),
            ),
            ("Count", Object::Integer(self.kids.len() as i64)),
        ])
    }

    /// Resolve the geometry of a source image and add it as a new page.
    ///
    /// Images without embedded resolution use the configured default DPI.
    pub fn add_image(&mut self, source: SourceImage, spec: &GeometrySpec) -> Result<ObjectRef> {
        let defaults = self.config.defaults;
        let dpi = source.dpi.unwrap_or((defaults.dpi, defaults.dpi));
        let layout = resolve_layout(source.width, source.height, dpi, spec, &defaults)?;
        let image = ImageData::from_source(source)?;
        self.add_page(image, &layout)
    }

    /// Add a page showing `image` with the given layout.
    ///
    /// Returns the reference of the new Page object.
    pub fn add_page(&mut self, image: ImageData, layout: &Layout) -> Result<ObjectRef> {
        self.version = self.version.max(image.min_version());

        let xobject_dict = image.build_xobject_dict();
        let xobject = self.add_object(xobject_dict, Some(image.data));

        let mut content = ContentStreamBuilder::new();
        content.draw_image(IMAGE_RESOURCE, &layout.image);
        let content = content.build()?;
        let contents = self.add_object(
            Object::dict(vec![("Length", Object::Integer(content.len() as i64))]),
            Some(content),
        );

        let page = self.add_object(
            Object::dict(vec![
                ("Type", Object::name("Page")),
                ("Parent", Object::Reference(self.pages)),
                (
                    "Resources",
                    Object::dict(vec![(
                        "XObject",
                        Object::dict(vec![(IMAGE_RESOURCE, Object::Reference(xobject))]),
                    )]),
                ),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(layout.page_width),
                        Object::Real(layout.page_height),
                    ]),
                ),
                ("Contents", Object::Reference(contents)),
            ]),
            None,
        );

        self.kids.push(page);
        let pages_dict = self.pages_dict();
        self.objects[self.pages.index()].value = pages_dict;

        log::info!(
            "page {}: {:.4}x{:.4} pt, image {}x{} px ({})",
            self.kids.len(),
            layout.page_width,
            layout.page_height,
            image.width,
            image.height,
            image.filter.pdf_name()
        );
        Ok(page)
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Version the document will declare.
    pub fn version(&self) -> PdfVersion {
        self.version
    }

    /// The object table in number order.
    pub fn objects(&self) -> &[IndirectObject] {
        &self.objects
    }

    /// Append the Info dictionary and build the complete PDF document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let info = self.config.metadata.to_info_dict(chrono::Utc::now());
        let info = self.add_object(info, None);
        serialize_document(self.version, &self.objects, self.catalog, info)
    }

    /// Save the PDF to a file.
    pub fn save(self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Write the PDF to any sink.
    pub fn write_to<W: Write>(self, mut sink: W) -> Result<()> {
        let bytes = self.finish()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }
}

/// Render a complete PDF file from an object table.
///
/// `objects` must be numbered `1..=n` in order. The xref entry of each object
/// is the length of the output written before it.
pub fn serialize_document(
    version: PdfVersion,
    objects: &[IndirectObject],
    root: ObjectRef,
    info: ObjectRef,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    writeln!(output, "%PDF-{}", version)?;

    let mut offsets = Vec::with_capacity(objects.len());
    for obj in objects {
        offsets.push(output.len());
        output.extend_from_slice(&obj.render());
    }

    let xref_start = output.len();
    writeln!(output, "xref")?;
    writeln!(output, "0 {}", objects.len() + 1)?;
    // object 0 heads the free list
    output.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        write!(output, "{:010} 00000 n \n", offset)?;
    }

    let trailer = Object::dict(vec![
        ("Size", Object::Integer(objects.len() as i64 + 1)),
        ("Root", Object::Reference(root)),
        ("Info", Object::Reference(info)),
    ]);
    writeln!(output, "trailer")?;
    output.extend_from_slice(&ObjectSerializer::new().serialize(&trailer));
    writeln!(output)?;
    writeln!(output, "startxref")?;
    writeln!(output, "{}", xref_start)?;
    output.extend_from_slice(b"%%EOF\n");

    log::debug!("serialized {} objects, {} bytes", objects.len(), output.len());
    Ok(output)
}
