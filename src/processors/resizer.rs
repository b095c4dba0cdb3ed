// artist-utils/src/processors/resizer.rs
use crate::core::{DerivationError, ResizeAlgorithm, Result, MAX_DIMENSION};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

#[derive(Debug, Clone)]
pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Scales `image` to exactly `target_height` pixels high, keeping the
    /// aspect ratio.
    pub fn resize_to_height(&self, image: &DynamicImage, target_height: u32) -> Result<DynamicImage> {
        let (orig_width, orig_height) = image.dimensions();
        let (width, height) = Self::target_dimensions(orig_width, orig_height, target_height)?;

        if width == orig_width && height == orig_height {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(image.clone());
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            orig_width,
            orig_height,
            width,
            height
        );

        Ok(image.resize_exact(width, height, self.get_filter_type()))
    }

    /// Width is `round(target_height * width / height)`, never below 1 and
    /// never above `MAX_DIMENSION`.
    pub fn target_dimensions(orig_width: u32, orig_height: u32, target_height: u32) -> Result<(u32, u32)> {
        if target_height == 0 {
            return Err(DerivationError::InvalidParameter(
                "Target height must be greater than zero".to_string(),
            ));
        }

        if orig_width == 0 || orig_height == 0 {
            return Err(DerivationError::DegenerateImage(format!(
                "Source image is {}x{}",
                orig_width, orig_height
            )));
        }

        let width = (target_height as f64 * orig_width as f64 / orig_height as f64).round();
        if width > MAX_DIMENSION as f64 {
            return Err(DerivationError::MemoryLimitExceeded(format!(
                "Resizing {}x{} to height {} needs a width of {} pixels (max {})",
                orig_width, orig_height, target_height, width, MAX_DIMENSION
            )));
        }

        Ok(((width as u32).max(1), target_height))
    }

    fn get_filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::Lanczos3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn width_follows_aspect_ratio() {
        assert_eq!(Resizer::target_dimensions(3000, 2000, 900).unwrap(), (1350, 900));
        assert_eq!(Resizer::target_dimensions(1000, 1000, 150).unwrap(), (150, 150));
        // 150 * 1001 / 700 = 214.5
        assert_eq!(Resizer::target_dimensions(1001, 700, 150).unwrap(), (215, 150));
        // 150 * 333 / 1000 = 49.95
        assert_eq!(Resizer::target_dimensions(333, 1000, 150).unwrap(), (50, 150));
    }

    #[test]
    fn very_tall_images_keep_a_column() {
        assert_eq!(Resizer::target_dimensions(1, 10_000, 150).unwrap(), (1, 150));
    }

    #[test]
    fn wide_strips_exceeding_limit_are_rejected() {
        let result = Resizer::target_dimensions(100_000, 1, 900);
        assert!(matches!(result, Err(DerivationError::MemoryLimitExceeded(_))));

        let result = Resizer::target_dimensions(100_000, 1, 100_000);
        assert!(matches!(result, Err(DerivationError::MemoryLimitExceeded(_))));

        // Exactly at the limit is still allowed
        assert_eq!(Resizer::target_dimensions(100_000, 9, 9).unwrap(), (100_000, 9));
    }

    #[test]
    fn zero_height_source_is_degenerate() {
        let result = Resizer::target_dimensions(640, 0, 150);
        assert!(matches!(result, Err(DerivationError::DegenerateImage(_))));

        let empty = DynamicImage::ImageRgb8(RgbImage::new(10, 0));
        let result = Resizer::default().resize_to_height(&empty, 150);
        assert!(matches!(result, Err(DerivationError::DegenerateImage(_))));
    }

    #[test]
    fn zero_target_is_rejected() {
        let result = Resizer::target_dimensions(640, 480, 0);
        assert!(matches!(result, Err(DerivationError::InvalidParameter(_))));
    }

    #[test]
    fn resize_produces_exact_height() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(40, 30));
        let resizer = Resizer::new(ResizeAlgorithm::Bilinear);

        let resized = resizer.resize_to_height(&image, 12).unwrap();
        assert_eq!(resized.dimensions(), (16, 12));

        let same = resizer.resize_to_height(&image, 30).unwrap();
        assert_eq!(same.dimensions(), (40, 30));
    }
}
