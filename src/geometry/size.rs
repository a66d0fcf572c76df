//! Textual page size, image size and border specifications.
//!
//! Sizes follow the `<width><unit>x<height><unit><options>` grammar, where
//! either number may be omitted (but not both). Options are drawn from
//! `! > < ^ % @`. Standard paper names such as `a4` or `letter` are accepted
//! for page sizes, optionally transposed with a `^T` suffix.

use std::str::FromStr;

use bitflags::bitflags;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    /// `<number><unit>x<number><unit><options>`
    static ref RE_SIZE: Regex =
        Regex::new(r"^([0-9]*\.?[0-9]*)([a-z]*)x([0-9]*\.?[0-9]*)([a-z]*)([^0-9a-z]*)$").unwrap();

    /// A single length with an optional unit, as used by borders.
    static ref RE_LENGTH: Regex = Regex::new(r"^([0-9]*\.?[0-9]*)([a-z]*)$").unwrap();
}

/// Points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Portrait paper sizes in points.
const PAPER_SIZES: &[(&str, f64, f64)] = &[
    ("11x17", 792.0, 1224.0),
    ("ledger", 1224.0, 792.0),
    ("legal", 612.0, 1008.0),
    ("letter", 612.0, 792.0),
    ("arche", 2592.0, 3456.0),
    ("archd", 1728.0, 2592.0),
    ("archc", 1296.0, 1728.0),
    ("archb", 864.0, 1296.0),
    ("archa", 648.0, 864.0),
    ("a0", 2380.0, 3368.0),
    ("a1", 1684.0, 2380.0),
    ("a2", 1190.0, 1684.0),
    ("a3", 842.0, 1190.0),
    ("a4", 595.0, 842.0),
    ("a5", 421.0, 595.0),
    ("a6", 297.0, 421.0),
    ("a7", 210.0, 297.0),
    ("a8", 148.0, 210.0),
    ("a9", 105.0, 148.0),
    ("a10", 74.0, 105.0),
    ("b0", 2836.0, 4008.0),
    ("b1", 2004.0, 2836.0),
    ("b2", 1418.0, 2004.0),
    ("b3", 1002.0, 1418.0),
    ("b4", 709.0, 1002.0),
    ("b5", 501.0, 709.0),
    ("c0", 2600.0, 3677.0),
    ("c1", 1837.0, 2600.0),
    ("c2", 1298.0, 1837.0),
    ("c3", 918.0, 1298.0),
    ("c4", 649.0, 918.0),
    ("c5", 459.0, 649.0),
    ("c6", 323.0, 459.0),
    ("flsa", 612.0, 936.0),
    ("flse", 612.0, 936.0),
    ("halfletter", 396.0, 612.0),
    ("tabloid", 792.0, 1224.0),
    ("statement", 396.0, 612.0),
    ("executive", 540.0, 720.0),
    ("folio", 612.0, 936.0),
    ("quarto", 610.0, 780.0),
];

/// Look up a standard paper size by (lowercase) name.
pub fn paper_size(name: &str) -> Option<(f64, f64)> {
    PAPER_SIZES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, w, h)| (w, h))
}

/// Conversion factor from a length unit to points. An empty unit means points.
fn unit_factor(unit: &str) -> Option<f64> {
    match unit {
        "" | "pt" => Some(1.0),
        "in" => Some(POINTS_PER_INCH),
        "cm" => Some(POINTS_PER_INCH / 2.54),
        "mm" => Some(POINTS_PER_INCH / 25.4),
        _ => None,
    }
}

bitflags! {
    /// Fit options attached to a size specification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FitOptions: u8 {
        /// `!`: use the dimensions exactly, ignoring aspect ratio
        const EXACT = 1 << 0;
        /// `>`: only ever make the image smaller
        const SHRINK = 1 << 1;
        /// `<`: only ever make the image larger
        const ENLARGE = 1 << 2;
        /// `^`: cover the area instead of fitting into it
        const FILL = 1 << 3;
        /// `%`: dimensions are percentages of the natural image size
        const PERCENT = 1 << 4;
        /// `@`: dimensions describe an area to scale to
        const COUNT = 1 << 5;
    }
}

impl FitOptions {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '!' => Some(FitOptions::EXACT),
            '>' => Some(FitOptions::SHRINK),
            '<' => Some(FitOptions::ENLARGE),
            '^' => Some(FitOptions::FILL),
            '%' => Some(FitOptions::PERCENT),
            '@' => Some(FitOptions::COUNT),
            _ => None,
        }
    }
}

/// One side of a size specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    /// Absolute length in points
    Points(f64),
    /// Image size derived from a resolution (image sizes only)
    Dpi(f64),
    /// Percentage of the natural image size (image sizes only)
    Percent(f64),
}

impl Dimension {
    /// Resolve against the pixel count and natural size (in points) of the image.
    pub fn to_points(self, pixels: u32, natural: f64) -> f64 {
        match self {
            Dimension::Points(p) => p,
            Dimension::Dpi(d) => POINTS_PER_INCH * pixels as f64 / d,
            Dimension::Percent(p) => natural * p / 100.0,
        }
    }

    fn value(self) -> f64 {
        match self {
            Dimension::Points(v) | Dimension::Dpi(v) | Dimension::Percent(v) => v,
        }
    }
}

/// Global fit mode, merged into the image size when one is given and into the
/// page size otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Fit inside the given dimensions, preserving aspect ratio
    #[default]
    Into,
    /// Cover the given dimensions, preserving aspect ratio
    Fill,
    /// Use the dimensions exactly
    Exact,
    /// Like `Into`, but never enlarge
    Shrink,
    /// Like `Into`, but never shrink
    Enlarge,
}

impl FitMode {
    /// The option bits this mode contributes.
    pub fn options(self) -> FitOptions {
        match self {
            FitMode::Into => FitOptions::empty(),
            FitMode::Fill => FitOptions::FILL,
            FitMode::Exact => FitOptions::EXACT,
            FitMode::Shrink => FitOptions::SHRINK,
            FitMode::Enlarge => FitOptions::ENLARGE,
        }
    }
}

impl FromStr for FitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "into" => Ok(FitMode::Into),
            "fill" => Ok(FitMode::Fill),
            "exact" => Ok(FitMode::Exact),
            "shrink" => Ok(FitMode::Shrink),
            "enlarge" => Ok(FitMode::Enlarge),
            other => Err(Error::invalid_size(
                other,
                "fit must be one of into, fill, exact, shrink, enlarge",
            )),
        }
    }
}

/// A possibly partial size specification.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSpec {
    /// Width, if given
    pub width: Option<Dimension>,
    /// Height, if given
    pub height: Option<Dimension>,
    /// Fit options
    pub options: FitOptions,
}

impl SizeSpec {
    /// Build a size from point values, validating it.
    pub fn points(width: Option<f64>, height: Option<f64>, options: FitOptions) -> Result<Self> {
        let spec = Self {
            width: width.map(Dimension::Points),
            height: height.map(Dimension::Points),
            options,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a page size: a paper name or a length pair.
    ///
    /// ```
    /// use imgpdf::geometry::{Dimension, SizeSpec};
    ///
    /// let a4 = SizeSpec::parse_page("A4").unwrap();
    /// assert_eq!(a4.width, Some(Dimension::Points(595.0)));
    /// assert_eq!(a4.height, Some(Dimension::Points(842.0)));
    ///
    /// let landscape = SizeSpec::parse_page("a4^T").unwrap();
    /// assert_eq!(landscape.width, Some(Dimension::Points(842.0)));
    /// ```
    pub fn parse_page(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let (body, transpose) = match lower.strip_suffix("^t") {
            Some(body) => (body, true),
            None => (lower.as_str(), false),
        };
        let name = body.trim_end_matches(|c| FitOptions::from_char(c).is_some());
        if let Some((w, h)) = paper_size(name) {
            let options = parse_options(s, &body[name.len()..])?;
            let (w, h) = if transpose { (h, w) } else { (w, h) };
            return Self::points(Some(w), Some(h), options);
        }
        if transpose {
            return Err(Error::invalid_size(s, "^T is only valid after a paper name"));
        }
        let spec = parse_pair(s, &lower, false)?;
        if spec.options.intersects(FitOptions::PERCENT | FitOptions::COUNT) {
            return Err(Error::invalid_size(s, "% and @ are only valid for image sizes"));
        }
        Ok(spec)
    }

    /// Parse an image size. Accepts the `dpi` unit and the `%` and `@` options.
    pub fn parse_image(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        parse_pair(s, &lower, true)
    }

    /// Check the structural invariants of the specification.
    pub fn validate(&self) -> Result<()> {
        let describe = || format!("{:?}", self);
        match (self.width, self.height) {
            (None, None) => {
                return Err(Error::invalid_size(
                    describe(),
                    "width and height cannot both be omitted",
                ))
            },
            (Some(_), Some(_)) => {},
            _ if self.options.contains(FitOptions::EXACT) => {
                return Err(Error::invalid_size(
                    describe(),
                    "exact size requires both width and height",
                ))
            },
            _ => {},
        }
        for dim in [self.width, self.height].into_iter().flatten() {
            let v = dim.value();
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::invalid_size(describe(), "dimensions must be positive"));
            }
        }
        Ok(())
    }

    /// Merge a global fit mode into this specification.
    ///
    /// Adding FILL to a one-dimensional size copies that dimension to the
    /// other side, as `^` does when parsed.
    pub fn with_fit(mut self, mode: FitMode) -> Self {
        self.options |= mode.options();
        self.fill_missing();
        self
    }

    fn fill_missing(&mut self) {
        if self.options.contains(FitOptions::FILL) {
            self.width = self.width.or(self.height);
            self.height = self.height.or(self.width);
        }
    }

    /// Both dimensions as points, if both are literal lengths.
    pub fn literal_points(&self) -> Option<(f64, f64)> {
        match (self.width, self.height) {
            (Some(Dimension::Points(w)), Some(Dimension::Points(h))) => Some((w, h)),
            _ => None,
        }
    }

    /// Width and height in points, for page sizes (which only hold lengths).
    pub(crate) fn page_points(&self) -> (Option<f64>, Option<f64>) {
        let pts = |d: Option<Dimension>| match d {
            Some(Dimension::Points(p)) => Some(p),
            _ => None,
        };
        (pts(self.width), pts(self.height))
    }

    /// The same size with width and height exchanged.
    pub fn transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            options: self.options,
        }
    }
}

fn parse_options(original: &str, chars: &str) -> Result<FitOptions> {
    chars.chars().try_fold(FitOptions::empty(), |acc, c| {
        FitOptions::from_char(c)
            .map(|opt| acc | opt)
            .ok_or_else(|| Error::invalid_size(original, format!("unknown option '{}'", c)))
    })
}

fn parse_number(original: &str, text: &str) -> Result<Option<f64>> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| Error::invalid_size(original, format!("'{}' is not a number", text)))
}

fn parse_pair(original: &str, lower: &str, image: bool) -> Result<SizeSpec> {
    let caps = RE_SIZE.captures(lower).ok_or_else(|| {
        Error::invalid_size(
            original,
            "expected <width><unit>x<height><unit><options>, either width or height may be omitted",
        )
    })?;
    let options = parse_options(original, &caps[5])?;
    let percent = options.contains(FitOptions::PERCENT);

    let dimension = |number: &str, unit: &str| -> Result<Option<Dimension>> {
        let Some(value) = parse_number(original, number)? else {
            return Ok(None);
        };
        if image && unit == "dpi" {
            return Ok(Some(Dimension::Dpi(value)));
        }
        if image && percent {
            if !unit.is_empty() {
                return Err(Error::invalid_size(original, "percentages take no unit"));
            }
            return Ok(Some(Dimension::Percent(value)));
        }
        let factor = unit_factor(unit).ok_or_else(|| Error::UnrecognizedUnit(unit.to_string()))?;
        Ok(Some(Dimension::Points(value * factor)))
    };

    let mut spec = SizeSpec {
        width: dimension(&caps[1], &caps[2])?,
        height: dimension(&caps[3], &caps[4])?,
        options,
    };
    spec.fill_missing();
    spec.validate().map_err(|e| match e {
        Error::InvalidSize { reason, .. } => Error::invalid_size(original, reason),
        other => other,
    })?;
    Ok(spec)
}

/// Minimal distance between the image and the page edges, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Border {
    /// Top margin
    pub top: f64,
    /// Right margin
    pub right: f64,
    /// Bottom margin
    pub bottom: f64,
    /// Left margin
    pub left: f64,
}

impl Border {
    /// Same margin on all four sides.
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Parse one to four colon-separated lengths in CSS margin order.
    ///
    /// ```
    /// use imgpdf::geometry::Border;
    ///
    /// let b = Border::parse("1in:2cm").unwrap();
    /// assert_eq!(b.top, 72.0);
    /// assert_eq!(b.bottom, 72.0);
    /// assert!((b.left - 56.6929).abs() < 1e-3);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let values = lower
            .split(':')
            .map(|part| parse_length(s, part))
            .collect::<Result<Vec<f64>>>()?;
        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [tb, lr] => Ok(Self {
                top: *tb,
                right: *lr,
                bottom: *tb,
                left: *lr,
            }),
            [t, lr, b] => Ok(Self {
                top: *t,
                right: *lr,
                bottom: *b,
                left: *lr,
            }),
            [t, r, b, l] => Ok(Self {
                top: *t,
                right: *r,
                bottom: *b,
                left: *l,
            }),
            _ => Err(Error::InvalidBorder(s.to_string())),
        }
    }

    /// Horizontal margins combined.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Vertical margins combined.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Border of the page rotated by a quarter turn.
    pub fn transposed(&self) -> Self {
        Self {
            top: self.left,
            right: self.bottom,
            bottom: self.right,
            left: self.top,
        }
    }
}

fn parse_length(original: &str, part: &str) -> Result<f64> {
    let caps = RE_LENGTH
        .captures(part)
        .ok_or_else(|| Error::InvalidBorder(original.to_string()))?;
    let value = parse_number(original, &caps[1])
        .ok()
        .flatten()
        .ok_or_else(|| Error::InvalidBorder(original.to_string()))?;
    let factor = unit_factor(&caps[2]).ok_or_else(|| Error::UnrecognizedUnit(caps[2].to_string()))?;
    Ok(value * factor)
}
