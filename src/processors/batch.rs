// img-diff/src/processors/batch.rs
use crate::core::processor::{FileStats, ImageProcessor};
use crate::core::{Config, ImageDiffError, Result};
use crate::processors::walker::{DiscoveredFile, Walker};
use crate::utils::{ensure_dirs, mirror_path};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub discovered: usize,
    pub processed: usize,
    pub failures: Vec<FileFailure>,
    pub walk_errors: usize,
    pub total_size_before: u64,
    pub total_size_after: u64,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub const EXIT_OK: u8 = 0;
pub const EXIT_FILE_FAILURES: u8 = 1;
pub const EXIT_FATAL: u8 = 2;

/// Process exit status for a run: any failed file gives 1, an error that
/// stopped the run before or during the walk gives 2.
pub fn exit_code<E>(outcome: &std::result::Result<BatchReport, E>) -> u8 {
    match outcome {
        Ok(report) if report.has_failures() => EXIT_FILE_FAILURES,
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_FATAL,
    }
}

pub struct BatchProcessor {
    config: Config,
    processor: ImageProcessor,
    thread_pool: rayon::ThreadPool,
    show_progress: bool,
}

impl BatchProcessor {
    /// `threads == 0` sizes the pool to the available parallelism.
    pub fn new(config: Config, threads: usize) -> Result<Self> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| ImageDiffError::ProcessingError(format!("Failed to create thread pool: {}", e)))?;

        Ok(Self {
            processor: ImageProcessor::new(&config),
            config,
            thread_pool,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Walks `input_dir` and mirrors every image found into `output_dir`.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path, recursive: bool) -> Result<BatchReport> {
        self.validate_paths(input_dir, output_dir)?;

        let walk = Walker::new(&self.config.extensions)
            .skip_dirs(&self.config.omit_dir)
            .skip_path(output_dir)
            .recursive(recursive)
            .find(input_dir)?;

        if walk.files.is_empty() {
            log::warn!("No image files found in {}", input_dir.display());
        } else {
            log::info!("Processing {} images from {}", walk.files.len(), input_dir.display());
        }

        std::fs::create_dir_all(output_dir)?;

        let mut report = self.process_files(&walk.files, input_dir, output_dir);
        report.walk_errors = walk.errors.len();
        Ok(report)
    }

    /// Processes every file independently on the worker pool and returns
    /// once all of them have finished. A failing file never stops the others.
    pub fn process_files(&self, files: &[DiscoveredFile], input_root: &Path, output_root: &Path) -> BatchReport {
        let pb = self.create_progress_bar(files.len());

        let results: Vec<(&DiscoveredFile, Result<FileStats>)> = self.thread_pool.install(|| {
            files
                .par_iter()
                .progress_with(pb.clone())
                .map(|file| (file, self.process_one(file, input_root, output_root)))
                .collect()
        });

        let mut report = BatchReport {
            discovered: files.len(),
            ..Default::default()
        };

        for (file, result) in results {
            match result {
                Ok(stats) => {
                    report.processed += 1;
                    report.total_size_before += stats.size_before;
                    report.total_size_after += stats.size_after;
                }
                Err(e) => report.failures.push(FileFailure {
                    path: file.path.clone(),
                    message: e.to_string(),
                }),
            }
        }

        pb.finish_with_message(format!(
            "Processed {} of {} images ({} failed)",
            report.processed,
            report.discovered,
            report.failures.len()
        ));

        report
    }

    fn process_one(&self, file: &DiscoveredFile, input_root: &Path, output_root: &Path) -> Result<FileStats> {
        let started = Instant::now();

        let result = mirror_path(input_root, output_root, &file.path).and_then(|output_path| {
            if output_path == file.path {
                return Err(ImageDiffError::InvalidParameter(format!(
                    "Refusing to overwrite source image {}",
                    file.path.display()
                )));
            }
            ensure_dirs(&output_path)?;
            self.processor.process(&file.path, &output_path)
        });

        match result {
            Ok(stats) => {
                log::info!("{}: {:.2?}", file.path.display(), started.elapsed());
                Ok(stats)
            }
            Err(e) => {
                log::error!("{}: {}", file.path.display(), e);
                Err(ImageDiffError::Resize {
                    path: file.path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    pub fn validate_paths(&self, input_dir: &Path, output_dir: &Path) -> Result<()> {
        if !input_dir.exists() {
            return Err(ImageDiffError::InvalidParameter(format!(
                "Input directory does not exist: {}",
                input_dir.display()
            )));
        }

        if !input_dir.is_dir() {
            return Err(ImageDiffError::InvalidParameter(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        if output_dir.exists() && !output_dir.is_dir() {
            return Err(ImageDiffError::InvalidParameter(format!(
                "Output path exists but is not a directory: {}",
                output_dir.display()
            )));
        }

        if input_dir == output_dir {
            return Err(ImageDiffError::InvalidParameter(
                "Input and output directories cannot be the same".to_string(),
            ));
        }

        Ok(())
    }
}
