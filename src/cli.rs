// artist-utils/src/cli.rs
use crate::core::{
    DerivationConfig, ResizeAlgorithm, DEFAULT_MEDIUM_HEIGHT, DEFAULT_OUTPUT_DPI, DEFAULT_QUALITY,
    DEFAULT_THUMB_HEIGHT,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "artist-utils", version, about = "Derive web-size images and thumbnails, filed by title")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the medium image and thumbnail for each input
    Derive {
        /// Image files, or directories to scan for images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory that receives one folder per title
        #[arg(short, long)]
        output: PathBuf,

        /// Height of the medium image in pixels
        #[arg(long, default_value_t = DEFAULT_MEDIUM_HEIGHT)]
        medium_height: u32,

        /// Height of the thumbnail in pixels
        #[arg(long, default_value_t = DEFAULT_THUMB_HEIGHT)]
        thumb_height: u32,

        /// DPI written into the output files
        #[arg(long, default_value_t = DEFAULT_OUTPUT_DPI)]
        dpi: u32,

        /// JPEG quality (0-100)
        #[arg(short, long, default_value_t = DEFAULT_QUALITY)]
        quality: u8,

        /// Resampling filter
        #[arg(short, long, value_enum, default_value_t = Algorithm::Lanczos3)]
        algorithm: Algorithm,

        /// Descend into subdirectories of directory inputs
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show dimensions, format and DPI of an image
    Info {
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

impl Commands {
    /// Builds the derivation parameters from `derive` flags.
    pub fn derivation_config(&self) -> Option<DerivationConfig> {
        match self {
            Commands::Derive {
                medium_height,
                thumb_height,
                dpi,
                quality,
                algorithm,
                ..
            } => Some(DerivationConfig {
                medium_height: *medium_height,
                thumb_height: *thumb_height,
                output_dpi: *dpi,
                quality: *quality,
                algorithm: (*algorithm).into(),
            }),
            Commands::Info { .. } => None,
        }
    }
}
