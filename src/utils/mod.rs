// artist-utils/src/utils/mod.rs
use crate::core::{DerivationError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "jpe", "jfif", "png", "gif", "bmp", "tiff", "tif", "webp",
];

/// Splits a filename into its base title and lowercased extension.
///
/// The base title is the stem with its trailing run of ASCII digits removed
/// (`"MyArt300.jpg"` gives `("MyArt", ".jpg")`). A stem made only of digits
/// is kept whole. The extension keeps its leading dot and is empty when the
/// name has none; a name ending in a bare `.` keeps that dot in its stem.
pub fn parse_filename(filename: &str) -> (String, String) {
    let path = Path::new(filename);
    let (stem, ext) = match path.extension().filter(|e| !e.is_empty()) {
        Some(e) => (
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format!(".{}", e.to_string_lossy().to_lowercase()),
        ),
        // A trailing dot is part of the stem, not an empty extension
        None => (
            path.file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            String::new(),
        ),
    };

    let trimmed = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let base_title = if trimmed.is_empty() {
        stem.clone()
    } else {
        trimmed.to_string()
    };

    (base_title, ext)
}

/// Uppercases the first character only; the rest is left as is.
pub fn capitalize_title(title: &str) -> String {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collects supported image files under `dir`, sorted by path.
pub fn collect_image_paths(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(DerivationError::InvalidParameter(format!(
            "Input path is not a directory: {}",
            dir.display()
        )));
    }

    let walker = if recursive {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };

    let paths: Vec<PathBuf> = walker
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_supported_format(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    Ok(paths)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn calculate_aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        0.0
    } else {
        width as f32 / height as f32
    }
}

pub fn is_supported_format(path: &Path) -> bool {
    get_file_extension(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn get_file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

pub fn image_format_to_string(format: image::ImageFormat) -> String {
    match format {
        image::ImageFormat::Jpeg => "JPEG",
        image::ImageFormat::Png => "PNG",
        image::ImageFormat::Gif => "GIF",
        image::ImageFormat::WebP => "WebP",
        image::ImageFormat::Pnm => "PNM",
        image::ImageFormat::Tiff => "TIFF",
        image::ImageFormat::Tga => "TGA",
        image::ImageFormat::Bmp => "BMP",
        image::ImageFormat::Ico => "ICO",
        image::ImageFormat::Avif => "AVIF",
        image::ImageFormat::Qoi => "QOI",
        _ => "Unknown",
    }
    .to_string()
}
