// artist-utils/src/processors/encoder.rs
use crate::core::{DerivationError, OutputFormat, PixelLayout, Result};
use crate::processors::metadata::{dpi_to_pixels_per_meter, PNG_PHYS};
use image::codecs::jpeg::{JpegEncoder, PixelDensity, PixelDensityUnit};
use image::{DynamicImage, GenericImageView, ImageFormat};
use img_parts::png::{Png, PngChunk};
use std::io::Cursor;
use std::path::Path;
use tiff::encoder::{colortype, Rational, TiffEncoder};
use tiff::tags::ResolutionUnit;

// BITMAPINFOHEADER and later share this layout
const BMP_X_PELS_OFFSET: usize = 38;
const BMP_Y_PELS_OFFSET: usize = 42;

/// Writes derivative files with DPI metadata embedded.
#[derive(Debug, Clone)]
pub struct Encoder {
    dpi: u32,
}

impl Encoder {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    /// Encodes `image` as `format` and writes it to `path`, creating parent
    /// directories and replacing any existing file.
    pub fn save(&self, image: &DynamicImage, path: &Path, format: OutputFormat) -> Result<()> {
        log::debug!(
            "Saving image to {} as {:?} at {} dpi",
            path.display(),
            format,
            self.dpi
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let bytes = self.encode(image, format)?;
        std::fs::write(path, &bytes)?;

        log::info!("Saved image: {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub fn encode(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        let converted = convert_layout(image, format.pixel_layout(image.color()));

        if !format.embeds_dpi() {
            log::debug!("{:?} has no density field, DPI not written", format);
        }

        match format {
            OutputFormat::Jpeg { quality } => self.encode_jpeg(&converted, quality),
            OutputFormat::Png => self.encode_png(&converted),
            OutputFormat::Bmp => self.encode_bmp(&converted),
            OutputFormat::Tiff => self.encode_tiff(&converted),
            OutputFormat::Gif | OutputFormat::WebP => encode_plain(&converted, format.image_format()),
        }
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        let density = u16::try_from(self.dpi).map_err(|_| {
            DerivationError::InvalidParameter(format!("DPI {} does not fit a JPEG header", self.dpi))
        })?;

        let mut buffer = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
            encoder.set_pixel_density(PixelDensity {
                density: (density, density),
                unit: PixelDensityUnit::Inches,
            });
            encoder.encode(
                image.as_bytes(),
                image.width(),
                image.height(),
                image.color().into(),
            )?;
        }

        Ok(buffer)
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let encoded = encode_plain(image, ImageFormat::Png)?;

        let mut png = Png::from_bytes(encoded.into())
            .map_err(|e| DerivationError::Metadata(format!("Failed to reparse PNG: {}", e)))?;

        let ppm = dpi_to_pixels_per_meter(self.dpi);
        let mut phys = Vec::with_capacity(9);
        phys.extend_from_slice(&ppm.to_be_bytes());
        phys.extend_from_slice(&ppm.to_be_bytes());
        phys.push(1); // unit: metre

        let chunks = png.chunks_mut();
        chunks.retain(|chunk| chunk.kind() != PNG_PHYS);
        // IHDR stays first, pHYs has to come before IDAT
        chunks.insert(1, PngChunk::new(PNG_PHYS, phys.into()));

        let mut buffer = Vec::new();
        png.encoder().write_to(&mut buffer)?;
        Ok(buffer)
    }

    fn encode_bmp(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = encode_plain(image, ImageFormat::Bmp)?;

        if buffer.len() < BMP_Y_PELS_OFFSET + 4 || &buffer[..2] != b"BM" {
            return Err(DerivationError::Metadata(
                "BMP encoder produced an unexpected header".to_string(),
            ));
        }

        let ppm = (dpi_to_pixels_per_meter(self.dpi) as i32).to_le_bytes();
        buffer[BMP_X_PELS_OFFSET..BMP_X_PELS_OFFSET + 4].copy_from_slice(&ppm);
        buffer[BMP_Y_PELS_OFFSET..BMP_Y_PELS_OFFSET + 4].copy_from_slice(&ppm);

        Ok(buffer)
    }

    fn encode_tiff(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let (width, height) = image.dimensions();
        let resolution = Rational { n: self.dpi, d: 1 };
        let mut cursor = Cursor::new(Vec::new());

        {
            let mut encoder = TiffEncoder::new(&mut cursor)?;
            match image {
                DynamicImage::ImageLuma8(buffer) => {
                    let mut tiff_image = encoder.new_image::<colortype::Gray8>(width, height)?;
                    tiff_image.resolution(ResolutionUnit::Inch, resolution);
                    tiff_image.write_data(buffer.as_raw())?;
                }
                DynamicImage::ImageRgba8(buffer) => {
                    let mut tiff_image = encoder.new_image::<colortype::RGBA8>(width, height)?;
                    tiff_image.resolution(ResolutionUnit::Inch, resolution);
                    tiff_image.write_data(buffer.as_raw())?;
                }
                other => {
                    let buffer = other.to_rgb8();
                    let mut tiff_image = encoder.new_image::<colortype::RGB8>(width, height)?;
                    tiff_image.resolution(ResolutionUnit::Inch, resolution);
                    tiff_image.write_data(buffer.as_raw())?;
                }
            }
        }

        Ok(cursor.into_inner())
    }
}

fn encode_plain(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, format)?;
    Ok(cursor.into_inner())
}

fn convert_layout(image: &DynamicImage, layout: PixelLayout) -> DynamicImage {
    match layout {
        PixelLayout::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        PixelLayout::La8 => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        PixelLayout::Rgb8 => DynamicImage::ImageRgb8(image.to_rgb8()),
        PixelLayout::Rgba8 => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn translucent() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([200, 40, 40, 128])))
    }

    #[test]
    fn jpeg_accepts_alpha_sources() {
        let bytes = Encoder::new(72)
            .encode(&translucent(), OutputFormat::Jpeg { quality: 90 })
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn png_keeps_alpha() {
        let bytes = Encoder::new(72).encode(&translucent(), OutputFormat::Png).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn png_carries_single_phys_chunk() {
        let bytes = Encoder::new(300).encode(&translucent(), OutputFormat::Png).unwrap();
        let png = Png::from_bytes(bytes.into()).unwrap();
        let phys: Vec<_> = png.chunks().iter().filter(|c| c.kind() == PNG_PHYS).collect();
        assert_eq!(phys.len(), 1);
        assert_eq!(png.chunks()[0].kind(), *b"IHDR");
    }

    #[test]
    fn bmp_header_holds_density() {
        let bytes = Encoder::new(72).encode(&translucent(), OutputFormat::Bmp).unwrap();
        let x = i32::from_le_bytes(bytes[38..42].try_into().unwrap());
        let y = i32::from_le_bytes(bytes[42..46].try_into().unwrap());
        assert_eq!((x, y), (2835, 2835));
    }

    #[test]
    fn out_of_range_dpi_fails_for_jpeg() {
        let result = Encoder::new(70_000).encode(&translucent(), OutputFormat::Jpeg { quality: 90 });
        assert!(matches!(result, Err(DerivationError::InvalidParameter(_))));
    }
}
