// Command line front end for the MRZ reader

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use mrz_reader::{
    models::{DocType, MrzRecord, Point, ReaderConfig},
    processing::{ImageProcessor, QuadCorrector},
    utils::MrzError,
    validation::{check_digit, ExpiryValidator},
    MrzReader,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mrz-reader")]
#[command(version, about)]
struct Cli {
    /// JSON reader configuration; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ICAO 9303 check digit of a field.
    Check { value: String },

    /// Decode the MRZ in one OCR text and print it as JSON.
    Decode {
        #[arg(long, value_enum)]
        doc_type: Option<DocTypeArg>,
        text: String,
    },

    /// Feed OCR text frame by frame, one frame per input line, and print
    /// the MRZ once it is stable.
    Stream {
        #[arg(long, value_enum)]
        doc_type: Option<DocTypeArg>,
        /// Read frames from this file instead of stdin.
        input: Option<PathBuf>,
    },

    /// Correct a detected quadrilateral and write the rectified crop.
    Rectify {
        /// Sixteen comma-separated values `x0,y0,...,x7,y7` in image pixels.
        #[arg(long, value_delimiter = ',', num_args = 16)]
        keypoints: Vec<f32>,
        #[arg(long)]
        out: PathBuf,
        image: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DocTypeArg {
    IdCard,
    Passport,
}

impl From<DocTypeArg> for DocType {
    fn from(arg: DocTypeArg) -> Self {
        match arg {
            DocTypeArg::IdCard => DocType::IdCard,
            DocTypeArg::Passport => DocType::Passport,
        }
    }
}

#[derive(Serialize)]
struct DecodeReport<'a> {
    #[serde(flatten)]
    record: &'a MrzRecord,
    mrz: String,
    expired: Option<bool>,
}

fn load_config(
    path: Option<&Path>,
    doc_type: Option<DocTypeArg>,
) -> Result<ReaderConfig, MrzError> {
    let mut config = match path {
        Some(path) => {
            debug!("Loading configuration from {:?}", path);
            ReaderConfig::from_json_file(path)?
        }
        None => ReaderConfig::default(),
    };
    if let Some(doc_type) = doc_type {
        config.doc_type = doc_type.into();
    }
    Ok(config)
}

fn run_decode(config: ReaderConfig, text: &str) -> Result<(), MrzError> {
    let reader = MrzReader::new(config)?;
    let record = reader.decode_text(Some(text))?;
    let expired = ExpiryValidator::is_expired(&record, ExpiryValidator::today()).ok();
    let report = DecodeReport {
        mrz: record.mrz_string(),
        record: &record,
        expired,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_stream(config: ReaderConfig, input: Option<&Path>) -> Result<(), MrzError> {
    let reader = MrzReader::new(config)?;
    let frames: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut emitted = 0;
    for line in frames.lines() {
        let line = line?;
        if let Some(mrz) = reader.submit_text(Some(&line)) {
            println!("{}", mrz);
            emitted += 1;
        }
    }
    info!(
        "{} frames read, {} stable results",
        reader.frames_seen(),
        emitted
    );
    Ok(())
}

fn run_rectify(keypoints: &[f32], image: &Path, out: &Path) -> Result<(), MrzError> {
    let mut points = [Point::default(); 8];
    for (point, xy) in points.iter_mut().zip(keypoints.chunks_exact(2)) {
        *point = Point::new(xy[0], xy[1]);
    }
    let frame = ImageProcessor::load(image)?.to_luma8();
    let quad = QuadCorrector::correct(&points)?;
    let crop = ImageProcessor::rectify(&frame, &quad)?;
    crop.save(out)?;
    println!(
        "Wrote {}x{} crop to {}",
        crop.width(),
        crop.height(),
        out.display()
    );
    Ok(())
}

fn main() -> Result<(), MrzError> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { value } => {
            println!("{}", check_digit::compute_char(&value)?);
            Ok(())
        }
        Commands::Decode { doc_type, text } => {
            run_decode(load_config(cli.config.as_deref(), doc_type)?, &text)
        }
        Commands::Stream { doc_type, input } => {
            run_stream(load_config(cli.config.as_deref(), doc_type)?, input.as_deref())
        }
        Commands::Rectify {
            keypoints,
            out,
            image,
        } => run_rectify(&keypoints, &image, &out),
    }
}
