// img-diff/src/core/processor.rs
use super::{Config, Result};
use crate::processors::{Compressor, Loader, Normalizer, Resizer};
use std::path::Path;

/// Decode, resize, normalize and re-encode a single file.
pub struct ImageProcessor {
    width: Option<u32>,
    height: Option<u32>,
    loader: Loader,
    resizer: Resizer,
    normalizer: Normalizer,
    compressor: Compressor,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub size_before: u64,
    pub size_after: u64,
}

impl ImageProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            width: config.width,
            height: config.height,
            loader: Loader::new(),
            resizer: Resizer::new(config.fit, config.background),
            normalizer: Normalizer::new(),
            compressor: Compressor::new(config.background),
        }
    }

    /// The output directory must already exist.
    pub fn process(&self, input_path: &Path, output_path: &Path) -> Result<FileStats> {
        let size_before = std::fs::metadata(input_path)?.len();
        let format = self.loader.detect_format(input_path)?;

        let image = self.loader.load(input_path)?;
        let image = self.resizer.resize(&image, self.width, self.height);
        let image = self.normalizer.normalize(&image);

        self.compressor.save_with_format(&image, output_path, format)?;

        let size_after = std::fs::metadata(output_path)?.len();
        Ok(FileStats {
            size_before,
            size_after,
        })
    }
}
