//! imgpdf - Lossless conversion of images to PDF
//!
//! Every input image becomes one page. JPEG and JPEG2000 files are embedded
//! without re-encoding.
//!
//! Usage:
//!   imgpdf scan1.jpg scan2.png -o out.pdf
//!   imgpdf --pagesize A4 --border 2cm --fit shrink *.jpg > out.pdf

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser};

use imgpdf::geometry::{Border, FitMode, GeometrySpec, SizeSpec};
use imgpdf::images::ColorMode;
use imgpdf::writer::{parse_date, DocumentMetadata};
use imgpdf::{api, ConvertConfig, Result};

/// Losslessly convert raster images to PDF.
#[derive(Parser, Debug)]
#[command(name = "imgpdf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input image files, one page each
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Force a colour space: L, RGB, CMYK, CMYK;I or 1
    #[arg(short = 'C', long)]
    colorspace: Option<ColorMode>,

    /// Omit CreationDate and ModDate for reproducible output
    #[arg(short = 'D', long, action = ArgAction::SetTrue)]
    nodate: bool,

    /// Resolution overriding the one stored in the images
    #[arg(short = 'd', long)]
    dpi: Option<f64>,

    /// Page size: paper name (A4, letter, ...) or WxH with units
    #[arg(short = 'S', long, value_parser = SizeSpec::parse_page)]
    pagesize: Option<SizeSpec>,

    /// Image size on the page: WxH with units, dpi or %
    #[arg(short = 's', long, value_parser = SizeSpec::parse_image)]
    imgsize: Option<SizeSpec>,

    /// Border around the image: one to four lengths, CSS order
    #[arg(short = 'b', long, value_parser = Border::parse)]
    border: Option<Border>,

    /// Fit mode: into, fill, exact, shrink or enlarge
    #[arg(short = 'f', long)]
    fit: Option<FitMode>,

    /// Rotate the page size to match the orientation of each image
    #[arg(short = 'a', long = "auto-orient", action = ArgAction::SetTrue)]
    auto_orient: bool,

    /// Document title
    #[arg(long)]
    title: Option<String>,

    /// Document author
    #[arg(long)]
    author: Option<String>,

    /// Creator application
    #[arg(long)]
    creator: Option<String>,

    /// Producing application
    #[arg(long)]
    producer: Option<String>,

    /// Document subject
    #[arg(long)]
    subject: Option<String>,

    /// Document keywords
    #[arg(long, num_args = 1..)]
    keywords: Vec<String>,

    /// Creation date (YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or RFC 3339)
    #[arg(long, value_parser = parse_date)]
    creationdate: Option<DateTime<Utc>>,

    /// Modification date (same formats as --creationdate)
    #[arg(long, value_parser = parse_date)]
    moddate: Option<DateTime<Utc>>,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> ConvertConfig {
        let mut geometry = GeometrySpec {
            pagesize: self.pagesize.clone(),
            imgsize: self.imgsize.clone(),
            border: self.border,
            dpi: self.dpi,
            auto_orient: self.auto_orient,
        };
        if let Some(fit) = self.fit {
            geometry.apply_fit(fit);
        }

        let mut metadata = DocumentMetadata::new()
            .producer(
                self.producer
                    .clone()
                    .unwrap_or_else(|| format!("{} {}", imgpdf::NAME, imgpdf::VERSION)),
            )
            .keywords(self.keywords.iter().cloned())
            .nodate(self.nodate);
        if let Some(title) = &self.title {
            metadata = metadata.title(title.as_str());
        }
        if let Some(author) = &self.author {
            metadata = metadata.author(author.as_str());
        }
        if let Some(creator) = &self.creator {
            metadata = metadata.creator(creator.as_str());
        }
        if let Some(subject) = &self.subject {
            metadata = metadata.subject(subject.as_str());
        }
        if let Some(date) = self.creationdate {
            metadata = metadata.creation_date(date);
        }
        if let Some(date) = self.moddate {
            metadata = metadata.mod_date(date);
        }

        let mut config = ConvertConfig::new()
            .with_geometry(geometry)
            .with_metadata(metadata);
        if let Some(colorspace) = &self.colorspace {
            config = config.with_colorspace(colorspace.clone());
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: &Args) -> Result<()> {
    let pdf = api::convert_files(&args.images, &args.config())?;
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            out.write_all(&pdf)?;
            out.flush()?;
            log::info!("wrote {} bytes to {}", pdf.len(), path.display());
        },
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(&pdf)?;
            out.flush()?;
        },
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
