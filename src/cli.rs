// img-diff/src/cli.rs
use crate::core::config::parse_aspect_ratio;
use crate::core::{Fit, PartialConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-diff",
    author,
    version,
    about = "Resize every image in a directory tree into a mirrored output tree"
)]
pub struct Cli {
    /// Input directory
    #[arg(short, long, default_value = ".")]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "out")]
    pub output: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Target width in pixels
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Target height in pixels
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Aspect ratio used to derive the missing dimension (e.g. 1.5, 4/3, 16:9)
    #[arg(short, long, value_parser = parse_aspect_ratio)]
    pub aspect_ratio: Option<f64>,

    /// Drop any configured aspect ratio for this run
    #[arg(long, conflicts_with = "aspect_ratio")]
    pub no_aspect_ratio: bool,

    /// Background colour for `contain` padding and alpha flattening
    #[arg(short, long)]
    pub background: Option<String>,

    /// Resize fit mode
    #[arg(short, long, value_enum)]
    pub fit: Option<FitArg>,

    /// Extra directory names to skip (repeatable)
    #[arg(long = "omit", value_name = "DIR")]
    pub omit: Vec<String>,

    /// Configuration file (defaults to the per-user config)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Worker threads, 0 for one per CPU
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitArg {
    Cover,
    Contain,
    Fill,
    Inside,
    Outside,
}

impl From<FitArg> for Fit {
    fn from(fit: FitArg) -> Self {
        match fit {
            FitArg::Cover => Fit::Cover,
            FitArg::Contain => Fit::Contain,
            FitArg::Fill => Fit::Fill,
            FitArg::Inside => Fit::Inside,
            FitArg::Outside => Fit::Outside,
        }
    }
}

impl Cli {
    /// The command-line configuration layer. Flags that were not given stay
    /// unset so they do not mask the persisted values.
    pub fn overrides(&self) -> PartialConfig {
        PartialConfig {
            width: self.width.map(Some),
            height: self.height.map(Some),
            aspect_ratio: if self.no_aspect_ratio {
                Some(None)
            } else {
                self.aspect_ratio.map(Some)
            },
            background: self.background.clone(),
            omit_dir: None,
            fit: self.fit.map(Fit::from),
            extensions: None,
        }
    }
}
