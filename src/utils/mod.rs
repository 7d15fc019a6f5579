// img-diff/src/utils/mod.rs
use crate::core::{ImageDiffError, Result};
use std::path::{Component, Path, PathBuf};

/// Maps `file_path` under `input_root` to the same relative position under
/// `output_root`. Prefixes are compared component-wise, so a root name that
/// reappears deeper in the path is left alone. A path outside `input_root`
/// that already lies under `output_root` is returned unchanged and a bare
/// relative path is joined directly, which makes the mapping idempotent.
pub fn mirror_path(input_root: &Path, output_root: &Path, file_path: &Path) -> Result<PathBuf> {
    let relative = match file_path.strip_prefix(input_root) {
        Ok(relative) => relative,
        Err(_) if file_path.starts_with(output_root) => return Ok(file_path.to_path_buf()),
        Err(_) if file_path.is_relative() => file_path,
        Err(_) => {
            return Err(ImageDiffError::InvalidParameter(format!(
                "{} is not inside {}",
                file_path.display(),
                input_root.display()
            )))
        }
    };

    if relative.as_os_str().is_empty() {
        return Err(ImageDiffError::InvalidParameter(format!(
            "{} has no file component below {}",
            file_path.display(),
            input_root.display()
        )));
    }

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(ImageDiffError::InvalidParameter(format!(
            "Path traversal detected in {}",
            file_path.display()
        )));
    }

    Ok(output_root.join(relative))
}

/// Creates every missing ancestor of `output_file`. Safe to call repeatedly
/// and from several threads at once.
pub fn ensure_dirs(output_file: &Path) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Case-insensitive match of the file extension against `extensions`.
pub fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    // Lexical cleanup only; symlinks are left to the filesystem.
    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
