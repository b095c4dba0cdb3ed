// artist-utils/src/core/processor.rs
use super::{DerivationConfig, DerivationError, DerivationRecord, OutputFormat, Result};
use crate::processors::{Encoder, Loader, Resizer};
use crate::utils::{capitalize_title, parse_filename};
use std::path::{Path, PathBuf};

const MEDIUM_SUFFIX: &str = "72";
const THUMB_SUFFIX: &str = "_thumb";

pub struct ImageProcessor {
    config: DerivationConfig,
    loader: Loader,
    resizer: Resizer,
    encoder: Encoder,
}

impl ImageProcessor {
    pub fn new(config: DerivationConfig) -> Self {
        let resizer = Resizer::new(config.algorithm);
        let encoder = Encoder::new(config.output_dpi);

        Self {
            config,
            loader: Loader::new(),
            resizer,
            encoder,
        }
    }

    /// Derives the medium image and thumbnail of one source into
    /// `output_dir/<FolderName>/`. Non-JPEG sources also get both
    /// derivatives in their own format.
    pub fn process<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_dir: Q,
    ) -> Result<DerivationRecord> {
        let input_path = input_path.as_ref();
        let output_dir = output_dir.as_ref();

        let file_name = input_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                DerivationError::InvalidParameter(format!("Invalid file name: {}", input_path.display()))
            })?;

        let (title, extension) = parse_filename(file_name);
        let mirror = self.mirror_format(&extension)?;
        let folder_name = capitalize_title(&title);

        log::debug!(
            "{} -> title {:?}, folder {:?}, extension {:?}",
            file_name,
            title,
            folder_name,
            extension
        );

        let folder = output_dir.join(&folder_name);
        std::fs::create_dir_all(&folder)?;

        let image = self.loader.load(input_path)?;

        let medium = self.resizer.resize_to_height(&image, self.config.medium_height)?;
        let thumb = self.resizer.resize_to_height(&image, self.config.thumb_height)?;

        let jpeg = OutputFormat::Jpeg {
            quality: self.config.quality,
        };
        let mut files = Vec::with_capacity(4);

        files.push(self.write(&medium, &folder, &title, MEDIUM_SUFFIX, ".jpg", jpeg)?);
        files.push(self.write(&thumb, &folder, &title, THUMB_SUFFIX, ".jpg", jpeg)?);

        if let Some(format) = mirror {
            files.push(self.write(&medium, &folder, &title, MEDIUM_SUFFIX, &extension, format)?);
            files.push(self.write(&thumb, &folder, &title, THUMB_SUFFIX, &extension, format)?);
        }

        log::info!(
            "Derived {} file(s) for {} in {}",
            files.len(),
            file_name,
            folder.display()
        );

        Ok(DerivationRecord {
            folder,
            files,
            title,
            folder_name,
        })
    }

    /// Format for the original-format copies, `None` for JPEG sources.
    fn mirror_format(&self, extension: &str) -> Result<Option<OutputFormat>> {
        match OutputFormat::from_extension(extension) {
            Some(format) if format.is_jpeg() => Ok(None),
            Some(format) => Ok(Some(format)),
            None => Err(DerivationError::UnsupportedFormat(if extension.is_empty() {
                "source file has no extension to mirror".to_string()
            } else {
                format!("cannot write {} files", extension)
            })),
        }
    }

    fn write(
        &self,
        image: &image::DynamicImage,
        folder: &Path,
        title: &str,
        suffix: &str,
        extension: &str,
        format: OutputFormat,
    ) -> Result<PathBuf> {
        let path = folder.join(format!("{}{}{}", title, suffix, extension));
        self.encoder.save(image, &path, format)?;
        Ok(path)
    }
}
