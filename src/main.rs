use anyhow::{bail, Context, Result};
use artist_utils::cli::{Cli, Commands};
use artist_utils::{
    calculate_aspect_ratio, collect_image_paths, format_file_size, validate_config,
    BatchProcessor, BatchSummary, DerivationConfig, Loader, MetadataReader,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let config = cli.command.derivation_config();

    match cli.command {
        Commands::Derive {
            inputs,
            output,
            recursive,
            ..
        } => {
            let config = config.unwrap_or_default();
            process_derive(inputs, output, recursive, config)?;
        }
        Commands::Info { input } => {
            process_info(&input)?;
        }
    }

    Ok(())
}

fn process_derive(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    recursive: bool,
    config: DerivationConfig,
) -> Result<()> {
    validate_config(&config)?;

    if output.exists() && !output.is_dir() {
        bail!("Output path exists but is not a directory: {}", output.display());
    }

    let files = expand_inputs(&inputs, recursive)?;
    if files.is_empty() {
        bail!("No image files found in the given inputs");
    }

    let processor = BatchProcessor::new(config);

    let pb = create_progress_bar(files.len())?;
    let mut on_progress = |current: usize, _total: usize, name: &str| {
        pb.set_position(current as u64 - 1);
        pb.set_message(name.to_string());
    };

    let outcomes = processor.process_files(&files, &output, Some(&mut on_progress));
    pb.finish_and_clear();

    let summary = BatchSummary::from_outcomes(&outcomes);
    if !summary.is_complete_success() {
        eprint!("{}", summary);
        bail!("{} of {} image(s) failed", summary.failed, summary.total);
    }

    println!("{} into {}", summary, output.display());
    Ok(())
}

/// Directories expand to the supported images inside them; files are
/// passed through untouched so explicit picks are never filtered.
fn expand_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let found = collect_image_paths(input, recursive)
                .with_context(|| format!("Failed to scan {}", input.display()))?;
            if found.is_empty() {
                log::warn!("No image files found in {}", input.display());
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

fn create_progress_bar(total: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn process_info(input: &Path) -> Result<()> {
    let file_size = std::fs::metadata(input)
        .with_context(|| format!("Cannot read {}", input.display()))?
        .len();

    let (width, height, format) = Loader::new().get_dimensions_and_format(input)?;
    let aspect_ratio = calculate_aspect_ratio(width, height);

    let reader = MetadataReader::new();
    let dpi = reader.read_dpi(input)?;
    let has_exif = reader.has_exif(input)?;

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(file_size));
    println!("Dimensions: {} x {} pixels", width, height);
    println!("Aspect Ratio: {:.2}:1", aspect_ratio);
    println!("Format: {}", format);
    match dpi {
        Some((x, y)) => println!("DPI: {} x {}", x, y),
        None => println!("DPI: not set"),
    }
    println!("Has EXIF metadata: {}", has_exif);

    Ok(())
}
