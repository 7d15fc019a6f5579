// img-diff/src/core/mod.rs
pub mod config;
pub mod processor;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_DIMENSION: u32 = 100_000;

/// How the source aspect ratio is reconciled with the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to cover the box, then crop the overflow.
    Cover,
    /// Scale to fit inside the box, then pad with the background.
    Contain,
    /// Stretch to the exact box.
    Fill,
    #[default]
    Inside,
    Outside,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fit::Cover => "cover",
            Fit::Contain => "contain",
            Fit::Fill => "fill",
            Fit::Inside => "inside",
            Fit::Outside => "outside",
        };
        f.write_str(name)
    }
}

/// RGBA colour used to pad `contain` resizes and to flatten alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 4]);

impl Background {
    pub const WHITE: Background = Background([255, 255, 255, 255]);

    pub fn rgba(&self) -> [u8; 4] {
        self.0
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Background {
    type Err = ImageDiffError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Background([0, 0, 0, 255])),
            "transparent" => return Ok(Background([0, 0, 0, 0])),
            _ => {}
        }

        let hex = value.strip_prefix('#').unwrap_or(value.as_str());
        let invalid = || ImageDiffError::InvalidParameter(format!("Invalid background colour: {}", s));

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        // Short forms repeat each nibble: "f" -> 0xff.
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|n| n * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let rgba = match hex.len() {
            3 => [nibble(0), nibble(1), nibble(2), Ok(255)],
            4 => [nibble(0), nibble(1), nibble(2), nibble(3)],
            6 => [byte(0), byte(2), byte(4), Ok(255)],
            8 => [byte(0), byte(2), byte(4), byte(6)],
            _ => return Err(invalid()),
        };

        let mut out = [0u8; 4];
        for (slot, channel) in out.iter_mut().zip(rgba) {
            *slot = channel.map_err(|_| invalid())?;
        }
        Ok(Background(out))
    }
}

/// One configuration layer. Every field is optional so that an unset key
/// never clobbers a lower layer when merged.
///
/// The dimension keys are tri-state: absent (`None`) leaves the lower layer
/// alone, an explicit JSON `null` (`Some(None)`) clears it, and a number
/// (`Some(Some(_))`) replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialConfig {
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub width: Option<Option<u32>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub height: Option<Option<u32>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omit_dir: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl PartialConfig {
    /// Built-in defaults, the lowest layer.
    pub fn defaults() -> Self {
        Self {
            width: Some(Some(500)),
            height: None,
            aspect_ratio: Some(Some(4.0 / 3.0)),
            background: Some("#fff".to_string()),
            omit_dir: Some(Vec::new()),
            fit: Some(Fit::Inside),
            extensions: Some(vec!["jpg".to_string(), "png".to_string()]),
        }
    }

    /// Layers `over` on top of `self`; only keys `over` actually sets win.
    pub fn merge(self, over: PartialConfig) -> PartialConfig {
        PartialConfig {
            width: over.width.or(self.width),
            height: over.height.or(self.height),
            aspect_ratio: over.aspect_ratio.or(self.aspect_ratio),
            background: over.background.or(self.background),
            omit_dir: over.omit_dir.or(self.omit_dir),
            fit: over.fit.or(self.fit),
            extensions: over.extensions.or(self.extensions),
        }
    }
}

// Only called for keys present in the input, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub aspect_ratio: Option<f64>,
    pub background: Background,
    pub omit_dir: Vec<String>,
    pub fit: Fit,
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            aspect_ratio: None,
            background: Background::WHITE,
            omit_dir: Vec::new(),
            fit: Fit::Inside,
            extensions: vec!["jpg".to_string(), "png".to_string()],
        }
    }
}

impl Config {
    /// Adds directory names to the skip set, keeping the first occurrence of each.
    pub fn with_omitted<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.omit_dir.contains(&name) {
                self.omit_dir.push(name);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            match value {
                Some(0) => {
                    return Err(ImageDiffError::InvalidParameter(format!(
                        "{} must be greater than zero",
                        name
                    )))
                }
                Some(v) if v > MAX_DIMENSION => {
                    return Err(ImageDiffError::InvalidParameter(format!(
                        "{} {} too large (max 100,000 pixels)",
                        name, v
                    )))
                }
                _ => {}
            }
        }

        if self.extensions.is_empty() {
            return Err(ImageDiffError::InvalidParameter(
                "At least one image extension must be configured".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ImageDiffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration conflict: {0}")]
    ConfigConflict(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Filesystem error at {}: {message}", path.display())]
    FileSystem { path: PathBuf, message: String },

    #[error("Failed to process {}: {message}", path.display())]
    Resize { path: PathBuf, message: String },

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

pub type Result<T> = std::result::Result<T, ImageDiffError>;
