//! PDF object types.
//!
//! The value model is a closed set of variants. Indirect objects live in an
//! arena owned by the document writer and refer to each other only through
//! [`ObjectRef`] indices.

use std::collections::BTreeMap;

use crate::writer::ObjectSerializer;

/// Dictionary keyed by PDF name (without the leading slash).
///
/// A `BTreeMap` keeps keys unique and iterates them in sorted byte order,
/// which is the order they are serialized in.
pub type Dictionary = BTreeMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Dictionary (key-value pairs)
    Dictionary(Dictionary),
    /// Array of objects
    Array(Vec<Object>),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// Literal string body, already escaped by the caller
    String(Vec<u8>),
    /// Name (rendered with a leading /)
    Name(String),
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
///
/// Generation numbers are always zero in documents we write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    /// Position of the referenced object in a 1-based arena.
    pub(crate) fn index(&self) -> usize {
        self.id as usize - 1
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} 0 R", self.id)
    }
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Dictionary(_) => "Dictionary",
            Object::Array(_) => "Array",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Reference(_) => "Reference",
        }
    }

    /// Build a Name object.
    pub fn name(s: &str) -> Object {
        Object::Name(s.to_string())
    }

    /// Build a Dictionary object from key/value pairs.
    pub fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to real number.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<ObjectRef> for Object {
    fn from(r: ObjectRef) -> Self {
        Object::Reference(r)
    }
}

/// A numbered object in the document body, optionally carrying a stream.
///
/// The object owns its value and stream exclusively. When a stream is present
/// the caller must already have set `/Length` to the stream's byte length.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    /// Object number, assigned once at registration
    pub id: ObjectRef,
    /// Object value
    pub value: Object,
    /// Raw stream bytes
    pub stream: Option<Vec<u8>>,
}

impl IndirectObject {
    /// Create a new indirect object.
    pub fn new(id: ObjectRef, value: Object, stream: Option<Vec<u8>>) -> Self {
        Self { id, value, stream }
    }

    /// Render the object definition.
    ///
    /// Format: `{id} 0 obj {value} endobj\n`, or with a stream
    /// `{id} 0 obj {value}\nstream\n{bytes}\nendstream\nendobj\n`.
    pub fn render(&self) -> Vec<u8> {
        let mut buf = format!("{} 0 obj ", self.id.id).into_bytes();
        buf.extend_from_slice(&ObjectSerializer::new().serialize(&self.value));
        match &self.stream {
            Some(data) => {
                buf.extend_from_slice(b"\nstream\n");
                buf.extend_from_slice(data);
                buf.extend_from_slice(b"\nendstream\nendobj\n");
            },
            None => buf.extend_from_slice(b" endobj\n"),
        }
        buf
    }
}
