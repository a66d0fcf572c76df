//! PDF content stream builder.
//!
//! Pages only ever paint a single image XObject, so the operator set is the
//! handful needed for that: save/restore state, a transformation matrix and
//! `Do`.

use std::io::Write;

use crate::error::Result;
use crate::geometry::Rect;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Set transformation matrix (cm)
    Transform(f64, f64, f64, f64, f64, f64),
    /// Paint an XObject (Do)
    PaintXObject(String),
}

/// Builder for PDF content streams.
#[derive(Debug, Clone, Default)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
}

impl ContentStreamBuilder {
    /// Create a new content stream builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw operation.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Save the current graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore the previous graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Apply a transformation matrix `[a b c d e f]`.
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.op(ContentStreamOp::Transform(a, b, c, d, e, f))
    }

    /// Paint an image XObject into `rect`.
    ///
    /// Image space is the unit square, so the matrix scales it to the
    /// rectangle size and moves it to the rectangle origin.
    pub fn draw_image(&mut self, resource_id: &str, rect: &Rect) -> &mut Self {
        self.save_state();
        self.transform(rect.width, 0.0, 0.0, rect.height, rect.x, rect.y);
        self.op(ContentStreamOp::PaintXObject(resource_id.to_string()));
        self.restore_state()
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operation was queued.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Build the content stream bytes, one operator per line.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                writeln!(buf)?;
            }
            self.write_op(&mut buf, op)?;
        }
        Ok(buf)
    }

    fn write_op<W: Write>(&self, w: &mut W, op: &ContentStreamOp) -> std::io::Result<()> {
        match op {
            ContentStreamOp::SaveState => write!(w, "q"),
            ContentStreamOp::RestoreState => write!(w, "Q"),
            ContentStreamOp::Transform(a, b, c, d, e, f) => write!(
                w,
                "{} {} {} {} {} {} cm",
                format_number(*a),
                format_number(*b),
                format_number(*c),
                format_number(*d),
                format_number(*e),
                format_number(*f)
            ),
            ContentStreamOp::PaintXObject(name) => write!(w, "/{} Do", name),
        }
    }
}

/// Operand formatting: exact zero as `0`, anything else with four decimals.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else {
        format!("{:.4}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_image_at_origin() {
        let mut builder = ContentStreamBuilder::new();
        builder.draw_image("Im0", &Rect::new(0.0, 0.0, 612.0, 792.5));
        let out = String::from_utf8(builder.build().unwrap()).unwrap();
        assert_eq!(out, "q\n612.0000 0 0 792.5000 0 0 cm\n/Im0 Do\nQ");
    }

    #[test]
    fn test_draw_image_with_offset() {
        let mut builder = ContentStreamBuilder::new();
        builder.draw_image("Im0", &Rect::new(10.0, 20.25, 100.0, 50.0));
        let out = String::from_utf8(builder.build().unwrap()).unwrap();
        assert!(out.contains("100.0000 0 0 50.0000 10.0000 20.2500 cm"));
        assert_eq!(builder.len(), 4);
    }

    #[test]
    fn test_empty_builder() {
        let builder = ContentStreamBuilder::new();
        assert!(builder.is_empty());
        assert!(builder.build().unwrap().is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.0), "1.0000");
        assert_eq!(format_number(0.12345), "0.1235");
    }
}
