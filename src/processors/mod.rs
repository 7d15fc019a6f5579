// img-diff/src/processors/mod.rs
mod batch;
mod compressor;
mod loader;
mod normalizer;
mod resizer;
pub mod walker;

pub use batch::{exit_code, BatchProcessor, BatchReport, FileFailure, EXIT_FATAL, EXIT_FILE_FAILURES, EXIT_OK};
pub use compressor::{flatten, Compressor};
pub use loader::Loader;
pub use normalizer::Normalizer;
pub use resizer::{fitted_size, target_box, Resizer};
pub use walker::{DiscoveredFile, WalkReport, Walker};

pub mod prelude {
    pub use super::{BatchProcessor, Compressor, Loader, Normalizer, Resizer, Walker};
}
