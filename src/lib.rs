//! Batch derivation of web-size images and thumbnails.
//!
//! Each source image gets its own folder, named after the title parsed from
//! its filename, holding a medium JPEG (`<title>72.jpg`), a thumbnail JPEG
//! (`<title>_thumb.jpg`) and, for non-JPEG sources, the same two derivatives
//! in the original format. Every file that can carry it gets DPI metadata.

pub mod cli;
mod core;
mod processors;
mod utils;

use std::path::Path;

pub use crate::core::{
    validate_config, DerivationConfig, DerivationError, DerivationRecord, ImageProcessor,
    OutputFormat, PixelLayout, ResizeAlgorithm, Result, DEFAULT_MEDIUM_HEIGHT,
    DEFAULT_OUTPUT_DPI, DEFAULT_QUALITY, DEFAULT_THUMB_HEIGHT,
};
pub use crate::processors::{
    BatchOutcome, BatchProcessor, BatchSummary, Encoder, Loader, MetadataReader, ProgressCallback,
    Resizer, ERROR_PREVIEW_LIMIT,
};
pub use crate::utils::{
    calculate_aspect_ratio, capitalize_title, collect_image_paths, format_file_size,
    is_supported_format, parse_filename,
};

pub mod prelude {
    pub use crate::{
        process_image, process_multiple_images, BatchOutcome, BatchProcessor, BatchSummary,
        DerivationConfig, ImageProcessor, MetadataReader, ResizeAlgorithm,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;

/// Derives one source image. Errors are returned as soon as they happen.
pub fn process_image<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_dir: Q,
    config: &DerivationConfig,
) -> Result<DerivationRecord> {
    ImageProcessor::new(config.clone()).process(input_path, output_dir)
}

/// Derives each source in order, recording failures instead of stopping.
pub fn process_multiple_images<P: AsRef<Path>>(
    input_paths: &[P],
    output_dir: &Path,
    config: &DerivationConfig,
    progress: Option<ProgressCallback<'_>>,
) -> Vec<BatchOutcome> {
    BatchProcessor::new(config.clone()).process_files(input_paths, output_dir, progress)
}
