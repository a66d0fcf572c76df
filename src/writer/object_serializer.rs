//! PDF object serialization.
//!
//! Renders the value model into the exact text form written to the file.
//! The layout is deterministic: dictionary keys are emitted in sorted order
//! and every nesting level is indented by four spaces.

use crate::object::{Dictionary, Object};

/// Spaces per dictionary nesting level.
const INDENT_WIDTH: usize = 4;

/// Serializer for PDF objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a new object serializer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize an object to bytes.
    pub fn serialize(&self, obj: &Object) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_object(&mut buf, obj, 1);
        buf
    }

    /// Serialize an object to a string (for debugging and tests).
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        String::from_utf8_lossy(&self.serialize(obj)).to_string()
    }

    fn write_object(&self, out: &mut Vec<u8>, obj: &Object, indent: usize) {
        match obj {
            Object::Dictionary(dict) => self.write_dictionary(out, dict, indent),
            Object::Array(arr) => self.write_array(out, arr, indent),
            Object::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
            Object::Real(r) => out.extend_from_slice(format!("{:.4}", r).as_bytes()),
            Object::String(s) => {
                out.push(b'(');
                out.extend_from_slice(s);
                out.push(b')');
            },
            Object::Name(n) => self.write_name(out, n),
            Object::Reference(r) => out.extend_from_slice(r.to_string().as_bytes()),
        }
    }

    /// Write a PDF name.
    ///
    /// Names start with `/` and escape irregular characters with `#xx`.
    fn write_name(&self, out: &mut Vec<u8>, name: &str) {
        out.push(b'/');
        for byte in name.bytes() {
            match byte {
                b'!'
                | b'"'
                | b'$'..=b'&'
                | b'\''..=b'.'
                | b'0'..=b'9'
                | b';'
                | b'<'
                | b'>'
                | b'?'
                | b'@'
                | b'A'..=b'Z'
                | b'^'..=b'z'
                | b'|'
                | b'~' => out.push(byte),
                _ => out.extend_from_slice(format!("#{:02X}", byte).as_bytes()),
            }
        }
    }

    /// Write a PDF array. Items share the array's indentation level.
    fn write_array(&self, out: &mut Vec<u8>, arr: &[Object], indent: usize) {
        out.extend_from_slice(b"[ ");
        for (i, obj) in arr.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }
            self.write_object(out, obj, indent);
        }
        out.extend_from_slice(b" ]");
    }

    /// Write a PDF dictionary, one entry per line.
    fn write_dictionary(&self, out: &mut Vec<u8>, dict: &Dictionary, indent: usize) {
        out.extend_from_slice(b"<<\n");
        for (i, (key, value)) in dict.iter().enumerate() {
            if i > 0 {
                out.push(b'\n');
            }
            out.extend(std::iter::repeat(b' ').take(INDENT_WIDTH * indent));
            self.write_name(out, key);
            out.push(b' ');
            self.write_object(out, value, indent + 1);
        }
        out.push(b'\n');
        out.extend(std::iter::repeat(b' ').take(INDENT_WIDTH * (indent - 1)));
        out.extend_from_slice(b">>");
    }
}
