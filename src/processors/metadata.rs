// artist-utils/src/processors/metadata.rs
use crate::core::{DerivationError, Result};
use exif::{In, Reader, Tag, Value};
use image::ImageFormat;
use img_parts::jpeg::{markers, Jpeg};
use img_parts::png::Png;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub(crate) const PNG_PHYS: [u8; 4] = *b"pHYs";

const METERS_PER_INCH: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

pub(crate) fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

fn pixels_per_meter_to_dpi(ppm: u32) -> u32 {
    (ppm as f64 * METERS_PER_INCH).round() as u32
}

fn dots_per_cm_to_dpi(dpcm: f64) -> u32 {
    (dpcm * CM_PER_INCH).round() as u32
}

/// Reads back the metadata this crate writes.
#[derive(Debug, Default, Clone)]
pub struct MetadataReader;

impl MetadataReader {
    pub fn new() -> Self {
        Self
    }

    /// Horizontal and vertical DPI stored in the file, rounded to whole
    /// dots. `None` when the container has no density or only an aspect
    /// ratio.
    pub fn read_dpi(&self, path: &Path) -> Result<Option<(u32, u32)>> {
        let data = std::fs::read(path)?;
        let format = image::guess_format(&data)?;

        let dpi = match format {
            ImageFormat::Jpeg => jfif_dpi(data)?,
            ImageFormat::Png => png_dpi(data)?,
            ImageFormat::Bmp => bmp_dpi(&data),
            ImageFormat::Tiff => self.tiff_dpi(path)?,
            other => {
                log::debug!("{:?} carries no DPI field: {}", other, path.display());
                None
            }
        };

        Ok(dpi)
    }

    pub fn has_exif(&self, path: &Path) -> Result<bool> {
        let file = File::open(path)?;
        let mut bufreader = BufReader::new(&file);

        match Reader::new().read_from_container(&mut bufreader) {
            Ok(_) => {
                log::debug!("Found EXIF data in {}", path.display());
                Ok(true)
            }
            Err(exif::Error::Io(e)) => Err(e.into()),
            Err(e) => {
                log::debug!("No EXIF data in {}: {}", path.display(), e);
                Ok(false)
            }
        }
    }

    fn tiff_dpi(&self, path: &Path) -> Result<Option<(u32, u32)>> {
        let file = File::open(path)?;
        let mut bufreader = BufReader::new(&file);
        let exif = Reader::new()
            .read_from_container(&mut bufreader)
            .map_err(|e| DerivationError::Metadata(format!("TIFF tag read error: {}", e)))?;

        let rational = |tag: Tag| {
            exif.get_field(tag, In::PRIMARY).and_then(|field| match field.value {
                Value::Rational(ref values) if !values.is_empty() && values[0].denom != 0 => {
                    Some(values[0].to_f64())
                }
                _ => None,
            })
        };

        // TIFF defaults to inches when the unit tag is absent
        let unit = exif
            .get_field(Tag::ResolutionUnit, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .unwrap_or(2);

        let (x, y) = match (rational(Tag::XResolution), rational(Tag::YResolution)) {
            (Some(x), Some(y)) => (x, y),
            _ => return Ok(None),
        };

        Ok(match unit {
            2 => Some((x.round() as u32, y.round() as u32)),
            3 => Some((dots_per_cm_to_dpi(x), dots_per_cm_to_dpi(y))),
            _ => None,
        })
    }
}

fn jfif_dpi(data: Vec<u8>) -> Result<Option<(u32, u32)>> {
    let jpeg = Jpeg::from_bytes(data.into())
        .map_err(|e| DerivationError::Metadata(format!("JPEG parse error: {}", e)))?;

    let contents = match jpeg.segment_by_marker(markers::APP0) {
        Some(segment) => segment.contents(),
        None => return Ok(None),
    };

    // "JFIF\0", version (2), units (1), x density (2), y density (2)
    if contents.len() < 12 || &contents[..5] != b"JFIF\0" {
        return Ok(None);
    }

    let x = u16::from_be_bytes([contents[8], contents[9]]) as u32;
    let y = u16::from_be_bytes([contents[10], contents[11]]) as u32;

    Ok(match contents[7] {
        1 => Some((x, y)),
        2 => Some((dots_per_cm_to_dpi(x as f64), dots_per_cm_to_dpi(y as f64))),
        _ => None,
    })
}

fn png_dpi(data: Vec<u8>) -> Result<Option<(u32, u32)>> {
    let png = Png::from_bytes(data.into())
        .map_err(|e| DerivationError::Metadata(format!("PNG parse error: {}", e)))?;

    let contents = match png.chunk_by_type(PNG_PHYS) {
        Some(chunk) => chunk.contents(),
        None => return Ok(None),
    };

    if contents.len() < 9 || contents[8] != 1 {
        return Ok(None);
    }

    let x = u32::from_be_bytes([contents[0], contents[1], contents[2], contents[3]]);
    let y = u32::from_be_bytes([contents[4], contents[5], contents[6], contents[7]]);

    Ok(Some((pixels_per_meter_to_dpi(x), pixels_per_meter_to_dpi(y))))
}

fn bmp_dpi(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 46 {
        return None;
    }

    let x = i32::from_le_bytes([data[38], data[39], data[40], data[41]]);
    let y = i32::from_le_bytes([data[42], data[43], data[44], data[45]]);

    if x <= 0 || y <= 0 {
        return None;
    }

    Some((pixels_per_meter_to_dpi(x as u32), pixels_per_meter_to_dpi(y as u32)))
}
