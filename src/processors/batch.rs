// artist-utils/src/processors/batch.rs
use crate::core::{DerivationConfig, DerivationRecord, ImageProcessor};
use std::fmt;
use std::path::{Path, PathBuf};

/// Failures listed individually in a summary; the rest are only counted.
pub const ERROR_PREVIEW_LIMIT: usize = 5;

/// Called before each item with `(current, total, file name)`, `current`
/// starting at 1.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(usize, usize, &str);

/// Result of one batch item. Errors never escape the batch; they are kept
/// here as text next to the input that caused them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    Success {
        input: PathBuf,
        record: DerivationRecord,
    },
    Failure {
        input: PathBuf,
        error: String,
    },
}

impl BatchOutcome {
    pub fn input(&self) -> &Path {
        match self {
            Self::Success { input, .. } | Self::Failure { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn record(&self) -> Option<&DerivationRecord> {
        match self {
            Self::Success { record, .. } => Some(record),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

pub struct BatchProcessor {
    processor: ImageProcessor,
}

impl BatchProcessor {
    pub fn new(config: DerivationConfig) -> Self {
        Self {
            processor: ImageProcessor::new(config),
        }
    }

    /// Derives every input in order. Always returns one outcome per input,
    /// in input order, whatever fails along the way.
    pub fn process_files<P: AsRef<Path>>(
        &self,
        inputs: &[P],
        output_dir: &Path,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Vec<BatchOutcome> {
        let total = inputs.len();
        if total == 0 {
            log::warn!("No images to process");
            return Vec::new();
        }

        log::info!("Processing {} images into {}", total, output_dir.display());

        let mut outcomes = Vec::with_capacity(total);
        for (index, input) in inputs.iter().enumerate() {
            let input = input.as_ref();

            if let Some(callback) = progress.as_mut() {
                callback(index + 1, total, &display_name(input));
            }

            let outcome = match self.processor.process(input, output_dir) {
                Ok(record) => BatchOutcome::Success {
                    input: input.to_path_buf(),
                    record,
                },
                Err(e) => {
                    log::warn!("Failed to process {}: {}", input.display(), e);
                    BatchOutcome::Failure {
                        input: input.to_path_buf(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        log::info!("Batch finished: {} succeeded, {} failed", total - failed, failed);

        outcomes
    }
}

/// Counts and a bounded error preview for presenting a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `(file name, error)` for the first failures.
    pub error_preview: Vec<(String, String)>,
    /// Failures beyond the preview.
    pub remaining_errors: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome]) -> Self {
        let failures: Vec<(String, String)> = outcomes
            .iter()
            .filter_map(|o| o.error().map(|e| (display_name(o.input()), e.to_string())))
            .collect();

        let failed = failures.len();
        let error_preview: Vec<_> = failures.into_iter().take(ERROR_PREVIEW_LIMIT).collect();

        Self {
            total: outcomes.len(),
            succeeded: outcomes.len() - failed,
            failed,
            remaining_errors: failed - error_preview.len(),
            error_preview,
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complete_success() {
            return write!(f, "Processed {} image(s) successfully", self.succeeded);
        }

        writeln!(
            f,
            "Processed {} of {} image(s); {} failed:",
            self.succeeded, self.total, self.failed
        )?;
        for (name, error) in &self.error_preview {
            writeln!(f, "  {}: {}", name, error)?;
        }
        if self.remaining_errors > 0 {
            writeln!(f, "  ... and {} more error(s)", self.remaining_errors)?;
        }
        Ok(())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(name: &str) -> BatchOutcome {
        BatchOutcome::Failure {
            input: PathBuf::from("in").join(name),
            error: format!("cannot decode {}", name),
        }
    }

    fn success(name: &str) -> BatchOutcome {
        BatchOutcome::Success {
            input: PathBuf::from("in").join(name),
            record: DerivationRecord {
                folder: PathBuf::from("out/Art"),
                files: vec![PathBuf::from("out/Art/Art72.jpg")],
                title: "Art".to_string(),
                folder_name: "Art".to_string(),
            },
        }
    }

    #[test]
    fn summary_of_clean_run() {
        let summary = BatchSummary::from_outcomes(&[success("a.jpg"), success("b.jpg")]);
        assert!(summary.is_complete_success());
        assert_eq!(summary.to_string(), "Processed 2 image(s) successfully");
    }

    #[test]
    fn summary_preview_is_bounded() {
        let mut outcomes = vec![success("ok.jpg")];
        outcomes.extend((0..8).map(|i| failure(&format!("bad{}.png", i))));

        let summary = BatchSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total, 9);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 8);
        assert_eq!(summary.error_preview.len(), ERROR_PREVIEW_LIMIT);
        assert_eq!(summary.remaining_errors, 3);
        assert_eq!(summary.error_preview[0].0, "bad0.png");

        let text = summary.to_string();
        assert!(text.starts_with("Processed 1 of 9 image(s); 8 failed:"));
        assert!(text.contains("bad4.png: cannot decode bad4.png"));
        assert!(!text.contains("bad5.png"));
        assert!(text.contains("... and 3 more error(s)"));
    }

    #[test]
    fn outcome_accessors() {
        let ok = success("a.jpg");
        assert!(ok.is_success());
        assert_eq!(ok.input(), Path::new("in/a.jpg"));
        assert!(ok.record().is_some());
        assert_eq!(ok.error(), None);

        let bad = failure("b.png");
        assert!(!bad.is_success());
        assert!(bad.record().is_none());
        assert_eq!(bad.error(), Some("cannot decode b.png"));
    }

    #[test]
    fn empty_batch_returns_nothing() {
        let batch = BatchProcessor::new(DerivationConfig::default());
        let inputs: Vec<PathBuf> = Vec::new();
        let mut calls = 0;
        let mut callback = |_: usize, _: usize, _: &str| calls += 1;

        let outcomes = batch.process_files(&inputs, Path::new("unused"), Some(&mut callback));
        assert!(outcomes.is_empty());
        assert_eq!(calls, 0);
    }
}
