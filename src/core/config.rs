// img-diff/src/core/config.rs
use super::{Background, Config, ImageDiffError, PartialConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "img-diff";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Per-user config location: `<config home>/img-diff/config.json`.
pub fn default_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| {
        ImageDiffError::InvalidParameter("Could not determine the user config directory".to_string())
    })?;
    Ok(base.join(APP_NAME).join(CONFIG_FILE_NAME))
}

/// First-run initialisation. Writes `defaults` to `path` when nothing is
/// there yet, creating parent directories as needed. Returns `true` when
/// the file was created by this call.
pub fn bootstrap(path: &Path, defaults: &PartialConfig) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(defaults)?;
    fs::write(path, content)?;
    log::info!("Created default configuration at {}", path.display());

    Ok(true)
}

pub fn load(path: &Path) -> Result<PartialConfig> {
    let content = fs::read_to_string(path)?;
    let partial: PartialConfig = serde_json::from_str(&content)?;
    log::debug!("Loaded configuration from {}: {:?}", path.display(), partial);
    Ok(partial)
}

/// Bootstraps the persisted file if needed, then resolves
/// defaults -> persisted -> CLI overrides into a validated [`Config`].
pub fn resolve(defaults: PartialConfig, persisted_path: &Path, cli: PartialConfig) -> Result<Config> {
    bootstrap(persisted_path, &defaults)?;
    let persisted = load(persisted_path)?;
    resolve_layers(defaults, persisted, cli)
}

pub fn resolve_layers(
    defaults: PartialConfig,
    persisted: PartialConfig,
    cli: PartialConfig,
) -> Result<Config> {
    finalize(defaults.merge(persisted).merge(cli))
}

/// Checks the aspect-ratio rules on a merged layer set and derives the
/// missing dimension. Runs once, after all layers are applied.
pub fn finalize(merged: PartialConfig) -> Result<Config> {
    let mut width = merged.width.flatten();
    let mut height = merged.height.flatten();
    let aspect_ratio = merged.aspect_ratio.flatten();

    if let Some(ratio) = aspect_ratio {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(ImageDiffError::InvalidParameter(format!(
                "Aspect ratio must be a positive number, got {}",
                ratio
            )));
        }

        match (width, height) {
            (Some(_), Some(_)) => {
                return Err(ImageDiffError::ConfigConflict(
                    "Aspect ratio cannot be defined while using both width and height".to_string(),
                ))
            }
            (Some(w), None) => height = Some((w as f64 / ratio).floor() as u32),
            (None, Some(h)) => width = Some((h as f64 * ratio).floor() as u32),
            (None, None) => {}
        }
    }

    let background = match merged.background.as_deref() {
        Some(value) => value.parse::<Background>()?,
        None => Background::default(),
    };

    let defaults = Config::default();
    let config = Config {
        width,
        height,
        aspect_ratio,
        background,
        omit_dir: merged.omit_dir.unwrap_or(defaults.omit_dir),
        fit: merged.fit.unwrap_or(defaults.fit),
        extensions: merged
            .extensions
            .map(|exts| {
                exts.into_iter()
                    .map(|e| e.trim_start_matches('.').to_lowercase())
                    .collect()
            })
            .unwrap_or(defaults.extensions),
    };

    config.validate()?;
    Ok(config)
}

/// Accepts `1.3333`, `4/3` or `4:3`.
pub fn parse_aspect_ratio(value: &str) -> Result<f64> {
    let invalid = || ImageDiffError::InvalidParameter(format!("Invalid aspect ratio: {}", value));

    let ratio = match value.split_once(|c: char| c == '/' || c == ':') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| invalid())?;
            let den: f64 = den.trim().parse().map_err(|_| invalid())?;
            if den == 0.0 {
                return Err(invalid());
            }
            num / den
        }
        None => value.trim().parse().map_err(|_| invalid())?,
    };

    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(invalid());
    }
    Ok(ratio)
}
