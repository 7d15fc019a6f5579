mod cli;
pub mod core;
pub mod processors;
pub mod utils;

pub use cli::{Cli, FitArg};
pub use crate::core::config::{bootstrap, default_config_path, finalize, parse_aspect_ratio, resolve, resolve_layers};
pub use crate::core::processor::{FileStats, ImageProcessor};
pub use crate::core::{Background, Config, Fit, ImageDiffError, PartialConfig, Result};
pub use processors::walker::find;
pub use processors::{
    exit_code, BatchProcessor, BatchReport, Compressor, DiscoveredFile, FileFailure, Loader, Normalizer, Resizer,
    WalkReport, Walker, EXIT_FATAL, EXIT_FILE_FAILURES, EXIT_OK,
};
pub use utils::{absolutize, ensure_dirs, format_file_size, has_image_extension, mirror_path};

pub mod prelude {
    pub use crate::{BatchProcessor, Config, Fit, ImageProcessor, PartialConfig, Walker};
}

// Re-export commonly used types
pub use image::DynamicImage;
