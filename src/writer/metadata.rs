//! Document information dictionary.
//!
//! Text entries are written as PDF text strings (UTF-16BE with a byte order
//! mark) and dates as `D:YYYYMMDDHHmmSSZ`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::object::Object;

/// Metadata for a PDF document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Producing application
    pub producer: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Document keywords
    pub keywords: Vec<String>,
    /// Creation date (defaults to the time of writing)
    pub creation_date: Option<DateTime<Utc>>,
    /// Modification date (defaults to the time of writing)
    pub mod_date: Option<DateTime<Utc>>,
    /// Omit both dates so repeated runs give identical output
    pub nodate: bool,
}

impl DocumentMetadata {
    /// Create new empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set document title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set document author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set creator application.
    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }

    /// Set producing application.
    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    /// Set document subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set document keywords.
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set creation date.
    pub fn creation_date(mut self, date: DateTime<Utc>) -> Self {
        self.creation_date = Some(date);
        self
    }

    /// Set modification date.
    pub fn mod_date(mut self, date: DateTime<Utc>) -> Self {
        self.mod_date = Some(date);
        self
    }

    /// Drop both date entries.
    pub fn nodate(mut self, nodate: bool) -> Self {
        self.nodate = nodate;
        self
    }

    /// Build the Info dictionary. `now` fills in missing dates.
    pub fn to_info_dict(&self, now: DateTime<Utc>) -> Object {
        let mut entries = Vec::new();
        let texts = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
            ("Subject", &self.subject),
        ];
        for (key, value) in texts {
            if let Some(v) = value {
                entries.push((key, Object::String(pdf_text_string(v))));
            }
        }
        if !self.keywords.is_empty() {
            entries.push(("Keywords", Object::String(pdf_text_string(&self.keywords.join(",")))));
        }
        if !self.nodate {
            let created = self.creation_date.unwrap_or(now);
            let modified = self.mod_date.unwrap_or(now);
            entries.push(("CreationDate", Object::String(pdf_date(&created))));
            entries.push(("ModDate", Object::String(pdf_date(&modified))));
        }
        Object::dict(entries)
    }
}

/// Encode text as an escaped PDF text string body: `FE FF` + UTF-16BE, with
/// `\`, `(` and `)` backslash-escaped.
///
/// ```
/// use imgpdf::writer::pdf_text_string;
///
/// assert_eq!(pdf_text_string("A"), vec![0xFE, 0xFF, 0x00, b'A']);
/// assert_eq!(pdf_text_string("("), vec![0xFE, 0xFF, 0x00, b'\\', b'(']);
/// ```
pub fn pdf_text_string(text: &str) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        for byte in unit.to_be_bytes() {
            if matches!(byte, b'\\' | b'(' | b')') {
                out.push(b'\\');
            }
            out.push(byte);
        }
    }
    out
}

/// Format a date as a PDF date string body.
pub fn pdf_date(date: &DateTime<Utc>) -> Vec<u8> {
    date.format("D:%Y%m%d%H%M%SZ").to_string().into_bytes()
}

/// Parse a date given on the command line.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS` (all
/// taken as UTC) and RFC 3339 timestamps.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(s.to_string()))
}
