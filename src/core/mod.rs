// artist-utils/src/core/mod.rs
pub mod processor;

use image::{ColorType, ImageFormat};
use std::path::PathBuf;
use thiserror::Error;

pub use processor::ImageProcessor;

pub const DEFAULT_MEDIUM_HEIGHT: u32 = 900;
pub const DEFAULT_THUMB_HEIGHT: u32 = 150;
pub const DEFAULT_OUTPUT_DPI: u32 = 72;
pub const DEFAULT_QUALITY: u8 = 90;

pub(crate) const MAX_DIMENSION: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

/// Parameters shared by every image of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationConfig {
    /// Height of the web-size derivative, in pixels.
    pub medium_height: u32,
    /// Height of the thumbnail derivative, in pixels.
    pub thumb_height: u32,
    /// Dots per inch written into every output file that can carry it.
    pub output_dpi: u32,
    /// JPEG quality, 1-100. Other formats ignore it.
    pub quality: u8,
    pub algorithm: ResizeAlgorithm,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            medium_height: DEFAULT_MEDIUM_HEIGHT,
            thumb_height: DEFAULT_THUMB_HEIGHT,
            output_dpi: DEFAULT_OUTPUT_DPI,
            quality: DEFAULT_QUALITY,
            algorithm: ResizeAlgorithm::Lanczos3,
        }
    }
}

impl DerivationConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, height) in [("Medium", self.medium_height), ("Thumbnail", self.thumb_height)] {
            if height == 0 {
                return Err(DerivationError::InvalidParameter(format!(
                    "{} height must be greater than zero",
                    name
                )));
            }
            if height > MAX_DIMENSION {
                return Err(DerivationError::InvalidParameter(format!(
                    "{} height too large (max 100,000 pixels)",
                    name
                )));
            }
        }

        // JFIF stores density as a 16-bit value
        if self.output_dpi == 0 || self.output_dpi > u16::MAX as u32 {
            return Err(DerivationError::InvalidParameter(
                "DPI must be between 1 and 65535".to_string(),
            ));
        }

        if self.quality > 100 {
            return Err(DerivationError::InvalidParameter(
                "Quality must be between 0 and 100".to_string(),
            ));
        }

        Ok(())
    }
}

/// Channel layout an encoder receives after conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    L8,
    La8,
    Rgb8,
    Rgba8,
}

/// Target encoding of a derivative file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
    Bmp,
    Tiff,
    Gif,
    WebP,
}

impl OutputFormat {
    /// Resolves a lowercase extension (with or without the leading dot).
    /// JPEG resolves with the default quality; callers that care set it.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.') {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg { quality: DEFAULT_QUALITY }),
            "png" => Some(Self::Png),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg { .. } => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::Tiff => ImageFormat::Tiff,
            Self::Gif => ImageFormat::Gif,
            Self::WebP => ImageFormat::WebP,
        }
    }

    pub fn is_jpeg(&self) -> bool {
        matches!(self, Self::Jpeg { .. })
    }

    /// GIF and WebP containers have no density field.
    pub fn embeds_dpi(&self) -> bool {
        !matches!(self, Self::Gif | Self::WebP)
    }

    /// Layout the encoder for this format is fed with, given the decoded
    /// colour type. JPEG has no alpha channel, so anything that is not plain
    /// grey is flattened to RGB.
    pub fn pixel_layout(&self, color: ColorType) -> PixelLayout {
        let alpha = color.has_alpha();
        let grey = !color.has_color();

        match self {
            Self::Jpeg { .. } => {
                if grey && !alpha {
                    PixelLayout::L8
                } else {
                    PixelLayout::Rgb8
                }
            }
            Self::Png => match (grey, alpha) {
                (true, false) => PixelLayout::L8,
                (true, true) => PixelLayout::La8,
                (false, false) => PixelLayout::Rgb8,
                (false, true) => PixelLayout::Rgba8,
            },
            Self::Bmp | Self::Tiff => match (grey, alpha) {
                (true, false) => PixelLayout::L8,
                (_, true) => PixelLayout::Rgba8,
                (false, false) => PixelLayout::Rgb8,
            },
            Self::Gif => PixelLayout::Rgba8,
            Self::WebP => {
                if alpha {
                    PixelLayout::Rgba8
                } else {
                    PixelLayout::Rgb8
                }
            }
        }
    }
}

/// What one successful derivation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationRecord {
    pub folder: PathBuf,
    /// Written files, in write order.
    pub files: Vec<PathBuf>,
    pub title: String,
    pub folder_name: String,
}

#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Degenerate image: {0}")]
    DegenerateImage(String),

    #[error("Memory limit exceeded: {0}")]
    MemoryLimitExceeded(String),

    #[error("Metadata error: {0}")]
    Metadata(String),
}

pub type Result<T> = std::result::Result<T, DerivationError>;

pub fn validate_config(config: &DerivationConfig) -> Result<()> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = DerivationConfig::default();
        assert_eq!(config.medium_height, 900);
        assert_eq!(config.thumb_height, 150);
        assert_eq!(config.output_dpi, 72);
        assert_eq!(config.quality, 90);
        assert_eq!(config.algorithm, ResizeAlgorithm::Lanczos3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let zero_thumb = DerivationConfig { thumb_height: 0, ..Default::default() };
        assert!(matches!(zero_thumb.validate(), Err(DerivationError::InvalidParameter(_))));

        let huge_medium = DerivationConfig { medium_height: 200_000, ..Default::default() };
        assert!(huge_medium.validate().is_err());

        let zero_dpi = DerivationConfig { output_dpi: 0, ..Default::default() };
        assert!(zero_dpi.validate().is_err());

        let wide_dpi = DerivationConfig { output_dpi: 70_000, ..Default::default() };
        assert!(wide_dpi.validate().is_err());

        let quality = DerivationConfig { quality: 101, ..Default::default() };
        assert!(quality.validate().is_err());
    }

    #[test]
    fn extensions_resolve_to_formats() {
        assert_eq!(
            OutputFormat::from_extension(".jpeg"),
            Some(OutputFormat::Jpeg { quality: DEFAULT_QUALITY })
        );
        for ext in [".jpg", ".jpe", ".jfif"] {
            assert!(OutputFormat::from_extension(ext).unwrap().is_jpeg(), "{}", ext);
        }
        assert_eq!(OutputFormat::from_extension(".png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("tif"), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::from_extension(".tiff"), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::from_extension(".psd"), None);
        assert_eq!(OutputFormat::from_extension(""), None);
    }

    #[test]
    fn jpeg_layout_drops_alpha() {
        let jpeg = OutputFormat::Jpeg { quality: 90 };
        assert_eq!(jpeg.pixel_layout(ColorType::Rgba8), PixelLayout::Rgb8);
        assert_eq!(jpeg.pixel_layout(ColorType::Rgba16), PixelLayout::Rgb8);
        assert_eq!(jpeg.pixel_layout(ColorType::La8), PixelLayout::Rgb8);
        assert_eq!(jpeg.pixel_layout(ColorType::L8), PixelLayout::L8);
    }

    #[test]
    fn lossless_layouts_keep_alpha() {
        assert_eq!(OutputFormat::Png.pixel_layout(ColorType::Rgba8), PixelLayout::Rgba8);
        assert_eq!(OutputFormat::Png.pixel_layout(ColorType::La16), PixelLayout::La8);
        assert_eq!(OutputFormat::Tiff.pixel_layout(ColorType::La8), PixelLayout::Rgba8);
        assert_eq!(OutputFormat::Bmp.pixel_layout(ColorType::Rgb16), PixelLayout::Rgb8);
        assert_eq!(OutputFormat::Gif.pixel_layout(ColorType::L8), PixelLayout::Rgba8);
        assert_eq!(OutputFormat::WebP.pixel_layout(ColorType::Rgb8), PixelLayout::Rgb8);
    }

    #[test]
    fn only_gif_and_webp_skip_dpi() {
        assert!(OutputFormat::Jpeg { quality: 90 }.embeds_dpi());
        assert!(OutputFormat::Png.embeds_dpi());
        assert!(OutputFormat::Bmp.embeds_dpi());
        assert!(OutputFormat::Tiff.embeds_dpi());
        assert!(!OutputFormat::Gif.embeds_dpi());
        assert!(!OutputFormat::WebP.embeds_dpi());
    }
}
