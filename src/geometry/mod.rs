//! Page geometry resolution.
//!
//! Turns the intrinsic pixel size of an image, its detected resolution and a
//! (possibly partial) [`GeometrySpec`] into concrete page dimensions and an
//! image placement, all in PDF points.
//!
//! Priority for the effective resolution:
//!
//! 1. a forced DPI,
//! 2. the DPI that fits the image to the requested page size,
//! 3. the DPI detected in the image (or the default).
//!
//! [`resolve_layout`] is a pure function; the fallback DPI and the warning
//! threshold are passed in through [`ResolverDefaults`].

pub mod size;

pub use size::{paper_size, Border, Dimension, FitMode, FitOptions, SizeSpec, POINTS_PER_INCH};

use crate::error::{Error, Result};

/// Resolution assumed when an image carries none.
pub const DEFAULT_DPI: f64 = 96.0;

/// Page or image dimensions below this many points trigger a warning.
pub const MIN_DIMENSION: f64 = 3.0;

/// A rectangle in PDF user space (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f64,
    /// Y coordinate of the lower-left corner
    pub y: f64,
    /// Width of rectangle
    pub width: f64,
    /// Height of rectangle
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgpdf::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    /// A rectangle of the given size centred inside this one.
    ///
    /// ```
    /// use imgpdf::geometry::Rect;
    ///
    /// let page = Rect::new(10.0, 10.0, 100.0, 200.0);
    /// let inner = page.centered(50.0, 50.0);
    /// assert_eq!(inner, Rect::new(35.0, 85.0, 50.0, 50.0));
    /// ```
    pub fn centered(&self, width: f64, height: f64) -> Rect {
        Rect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

/// Injected constants for the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverDefaults {
    /// Resolution used when none is detected
    pub dpi: f64,
    /// Warning threshold for page and image dimensions, in points
    pub min_dimension: f64,
}

impl Default for ResolverDefaults {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            min_dimension: MIN_DIMENSION,
        }
    }
}

/// Requested geometry for every page of a conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySpec {
    /// Page size
    pub pagesize: Option<SizeSpec>,
    /// Image size on the page
    pub imgsize: Option<SizeSpec>,
    /// Margins around the image
    pub border: Option<Border>,
    /// Resolution overriding the detected one
    pub dpi: Option<f64>,
    /// Rotate the page size to match the image orientation
    pub auto_orient: bool,
}

impl GeometrySpec {
    /// Merge a global fit mode into the image size if present, else the page size.
    pub fn apply_fit(&mut self, mode: FitMode) {
        if let Some(imgsize) = self.imgsize.take() {
            self.imgsize = Some(imgsize.with_fit(mode));
        } else if let Some(pagesize) = self.pagesize.take() {
            self.pagesize = Some(pagesize.with_fit(mode));
        }
    }
}

/// Resolved geometry of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Effective horizontal and vertical resolution
    pub dpi: (f64, f64),
    /// Page width in points
    pub page_width: f64,
    /// Page height in points
    pub page_height: f64,
    /// Where the image is drawn
    pub image: Rect,
}

impl Layout {
    /// The page as a rectangle anchored at the origin.
    pub fn media_box(&self) -> Rect {
        Rect::new(0.0, 0.0, self.page_width, self.page_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl Orientation {
    fn of(width: f64, height: f64) -> Self {
        if width > height {
            Orientation::Landscape
        } else if width < height {
            Orientation::Portrait
        } else {
            Orientation::Square
        }
    }

    fn differs(self, other: Orientation) -> bool {
        matches!(
            (self, other),
            (Orientation::Portrait, Orientation::Landscape)
                | (Orientation::Landscape, Orientation::Portrait)
        )
    }
}

fn sanitize_dpi(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Resolve page size, effective DPI and image placement for one image.
///
/// `detected_dpi` values that are not finite and positive fall back to
/// `defaults.dpi`.
///
/// # Examples
///
/// ```
/// use imgpdf::geometry::{resolve_layout, GeometrySpec, ResolverDefaults};
///
/// let layout = resolve_layout(960, 480, (96.0, 96.0), &GeometrySpec::default(),
///     &ResolverDefaults::default()).unwrap();
/// assert_eq!(layout.page_width, 720.0);
/// assert_eq!(layout.page_height, 360.0);
/// ```
pub fn resolve_layout(
    width: u32,
    height: u32,
    detected_dpi: (f64, f64),
    spec: &GeometrySpec,
    defaults: &ResolverDefaults,
) -> Result<Layout> {
    if width == 0 || height == 0 {
        return Err(Error::Image(format!("image has zero size ({}x{})", width, height)));
    }
    if let Some(dpi) = spec.dpi {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(Error::InvalidDpi(dpi));
        }
    }
    for size in spec.pagesize.iter().chain(spec.imgsize.iter()) {
        size.validate()?;
    }

    let (w, h) = (width as f64, height as f64);
    let detected = (
        sanitize_dpi(detected_dpi.0, defaults.dpi),
        sanitize_dpi(detected_dpi.1, defaults.dpi),
    );

    let mut border = spec.border.unwrap_or_default();
    let mut pagesize = spec.pagesize.clone();
    if spec.auto_orient {
        if let Some(page) = pagesize.as_ref().and_then(SizeSpec::literal_points) {
            let target = target_orientation(width, height, detected, spec.imgsize.as_ref());
            if Orientation::of(page.0, page.1).differs(target) {
                log::debug!("auto-orient: swapping page dimensions {}x{}", page.0, page.1);
                pagesize = pagesize.map(|p| p.transposed());
                border = border.transposed();
            }
        }
    }

    let exact_page = pagesize
        .as_ref()
        .filter(|p| p.options.contains(FitOptions::EXACT))
        .and_then(SizeSpec::literal_points);

    // 1. effective resolution
    let mut dpi = if let Some(forced) = spec.dpi {
        (forced, forced)
    } else if let Some(page) = &pagesize {
        let (pw, ph) = page_area(page, &border)?;
        let fit = match (pw, ph) {
            (Some(pw), Some(ph)) if page.options.contains(FitOptions::FILL) => {
                if w / h < pw / ph {
                    POINTS_PER_INCH * w / pw
                } else {
                    POINTS_PER_INCH * h / ph
                }
            },
            (Some(pw), Some(ph)) => {
                if w / h < pw / ph {
                    POINTS_PER_INCH * h / ph
                } else {
                    POINTS_PER_INCH * w / pw
                }
            },
            (Some(pw), None) => POINTS_PER_INCH * w / pw,
            (None, Some(ph)) => POINTS_PER_INCH * h / ph,
            (None, None) => defaults.dpi,
        };
        if page.options.contains(FitOptions::SHRINK) {
            (fit.max(detected.0), fit.max(detected.1))
        } else if page.options.contains(FitOptions::ENLARGE) {
            (fit.min(detected.0), fit.min(detected.1))
        } else {
            (fit, fit)
        }
    } else {
        detected
    };

    // 2. image size
    let natural = (POINTS_PER_INCH * w / dpi.0, POINTS_PER_INCH * h / dpi.1);
    let (img_w, img_h) = match &spec.imgsize {
        Some(imgsize) => {
            let sized = fit_image_size(width, height, natural, imgsize);
            dpi = (POINTS_PER_INCH * w / sized.0, POINTS_PER_INCH * h / sized.1);
            sized
        },
        None => natural,
    };

    // 3. page size and placement
    let layout = match exact_page {
        Some((page_w, page_h)) => {
            let area = Rect::new(
                border.left,
                border.bottom,
                page_w - border.horizontal(),
                page_h - border.vertical(),
            );
            let image = if spec.imgsize.is_some() {
                area.centered(img_w, img_h)
            } else {
                dpi = (POINTS_PER_INCH * w / area.width, POINTS_PER_INCH * h / area.height);
                area
            };
            Layout {
                dpi,
                page_width: page_w,
                page_height: page_h,
                image,
            }
        },
        None => match pagesize.as_ref().filter(|_| spec.imgsize.is_some()) {
            // an explicit image size keeps the requested page, with the image centred
            Some(page) => {
                let (pw, ph) = page.page_points();
                let page_w = pw.unwrap_or(img_w + border.horizontal());
                let page_h = ph.unwrap_or(img_h + border.vertical());
                let area = Rect::new(
                    border.left,
                    border.bottom,
                    page_w - border.horizontal(),
                    page_h - border.vertical(),
                );
                Layout {
                    dpi,
                    page_width: page_w,
                    page_height: page_h,
                    image: area.centered(img_w, img_h),
                }
            },
            None => Layout {
                dpi,
                page_width: img_w + border.horizontal(),
                page_height: img_h + border.vertical(),
                image: Rect::new(border.left, border.bottom, img_w, img_h),
            },
        },
    };

    warn_if_tiny(&layout, defaults.min_dimension);
    log::debug!(
        "{}x{} px at {:.2}x{:.2} dpi -> page {:.4}x{:.4} pt",
        width,
        height,
        layout.dpi.0,
        layout.dpi.1,
        layout.page_width,
        layout.page_height
    );
    Ok(layout)
}

/// Page dimensions minus the border.
fn page_area(page: &SizeSpec, border: &Border) -> Result<(Option<f64>, Option<f64>)> {
    let (pw, ph) = page.page_points();
    let pw = pw.map(|v| v - border.horizontal());
    let ph = ph.map(|v| v - border.vertical());
    if pw.into_iter().chain(ph).any(|v| v <= 0.0) {
        return Err(Error::invalid_size(
            format!("{:?}", page),
            "border leaves no room for the image",
        ));
    }
    Ok((pw, ph))
}

/// Orientation the page should take: that of the image size when both of its
/// dimensions are given, else that of the pixels.
fn target_orientation(
    width: u32,
    height: u32,
    dpi: (f64, f64),
    imgsize: Option<&SizeSpec>,
) -> Orientation {
    let natural = (
        POINTS_PER_INCH * width as f64 / dpi.0,
        POINTS_PER_INCH * height as f64 / dpi.1,
    );
    if let Some(SizeSpec {
        width: Some(iw),
        height: Some(ih),
        ..
    }) = imgsize
    {
        return Orientation::of(iw.to_points(width, natural.0), ih.to_points(height, natural.1));
    }
    Orientation::of(natural.0, natural.1)
}

/// Apply an image size specification to the natural image size.
fn fit_image_size(width: u32, height: u32, natural: (f64, f64), imgsize: &SizeSpec) -> (f64, f64) {
    let (nw, nh) = natural;
    let tw = imgsize.width.map(|d| d.to_points(width, nw));
    let th = imgsize.height.map(|d| d.to_points(height, nh));
    let options = imgsize.options;

    if options.contains(FitOptions::EXACT) {
        if let (Some(tw), Some(th)) = (tw, th) {
            return (tw, th);
        }
    }

    let mut factor = if options.contains(FitOptions::COUNT) {
        let area = match (tw, th) {
            (Some(a), Some(b)) => a * b,
            (Some(a), None) | (None, Some(a)) => a * a,
            (None, None) => nw * nh,
        };
        (area / (nw * nh)).sqrt()
    } else {
        let rx = tw.map(|t| t / nw);
        let ry = th.map(|t| t / nh);
        match (rx, ry) {
            (Some(rx), Some(ry)) if options.contains(FitOptions::FILL) => rx.max(ry),
            (Some(rx), Some(ry)) => rx.min(ry),
            (Some(r), None) | (None, Some(r)) => r,
            (None, None) => 1.0,
        }
    };
    if options.contains(FitOptions::SHRINK) {
        factor = factor.min(1.0);
    }
    if options.contains(FitOptions::ENLARGE) {
        factor = factor.max(1.0);
    }
    (nw * factor, nh * factor)
}

/// Warn when the page or the image is smaller than `min` points.
/// Returns whether a warning was logged.
fn warn_if_tiny(layout: &Layout, min: f64) -> bool {
    let mut warned = false;
    if layout.page_width < min || layout.page_height < min {
        log::warn!(
            "page size {:.4}x{:.4} pt is below {} pt",
            layout.page_width,
            layout.page_height,
            min
        );
        warned = true;
    }
    if layout.image.width < min || layout.image.height < min {
        log::warn!(
            "image size {:.4}x{:.4} pt is below {} pt",
            layout.image.width,
            layout.image.height,
            min
        );
        warned = true;
    }
    warned
}
