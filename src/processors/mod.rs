// artist-utils/src/processors/mod.rs
mod batch;
mod encoder;
mod loader;
pub(crate) mod metadata;
mod resizer;

pub use batch::{BatchOutcome, BatchProcessor, BatchSummary, ProgressCallback, ERROR_PREVIEW_LIMIT};
pub use encoder::Encoder;
pub use loader::Loader;
pub use metadata::MetadataReader;
pub use resizer::Resizer;

