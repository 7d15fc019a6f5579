// img-diff/src/processors/resizer.rs
use crate::core::{Background, Fit};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, Rgba, RgbaImage};

pub struct Resizer {
    fit: Fit,
    background: Background,
    filter: FilterType,
}

impl Resizer {
    pub fn new(fit: Fit, background: Background) -> Self {
        Self {
            fit,
            background,
            filter: FilterType::Lanczos3,
        }
    }

    /// Resizes into the box described by `width`/`height`. A missing side
    /// follows the source aspect ratio; with neither set the image is
    /// returned unchanged.
    pub fn resize(&self, image: &DynamicImage, width: Option<u32>, height: Option<u32>) -> DynamicImage {
        let original = image.dimensions();
        let Some(bounds) = target_box(original, width, height) else {
            log::debug!("No target dimensions, skipping resize");
            return image.clone();
        };

        log::debug!(
            "Resizing {}x{} into {}x{} ({})",
            original.0,
            original.1,
            bounds.0,
            bounds.1,
            self.fit
        );

        match self.fit {
            Fit::Fill => self.resize_exact(image, bounds),
            Fit::Cover => image.resize_to_fill(bounds.0, bounds.1, self.filter),
            Fit::Inside | Fit::Outside => {
                self.resize_exact(image, fitted_size(original, bounds, self.fit))
            }
            Fit::Contain => self.contain(image, bounds),
        }
    }

    fn resize_exact(&self, image: &DynamicImage, (width, height): (u32, u32)) -> DynamicImage {
        if (width, height) == image.dimensions() {
            return image.clone();
        }
        image.resize_exact(width, height, self.filter)
    }

    fn contain(&self, image: &DynamicImage, bounds: (u32, u32)) -> DynamicImage {
        let inner = fitted_size(image.dimensions(), bounds, Fit::Contain);
        let resized = self.resize_exact(image, inner).to_rgba8();

        let mut canvas = RgbaImage::from_pixel(bounds.0, bounds.1, Rgba(self.background.rgba()));
        let x = (bounds.0 - inner.0) / 2;
        let y = (bounds.1 - inner.1) / 2;
        imageops::overlay(&mut canvas, &resized, x as i64, y as i64);

        DynamicImage::ImageRgba8(canvas)
    }
}

/// Target box for a source of size `original`.
pub fn target_box(original: (u32, u32), width: Option<u32>, height: Option<u32>) -> Option<(u32, u32)> {
    let (orig_w, orig_h) = original;
    match (width, height) {
        (Some(w), Some(h)) => Some((w, h)),
        (Some(w), None) => {
            let h = (orig_h as f64 * w as f64 / orig_w as f64).round() as u32;
            Some((w, h.max(1)))
        }
        (None, Some(h)) => {
            let w = (orig_w as f64 * h as f64 / orig_h as f64).round() as u32;
            Some((w.max(1), h))
        }
        (None, None) => None,
    }
}

/// Size of the scaled image before any crop or padding.
pub fn fitted_size(original: (u32, u32), bounds: (u32, u32), fit: Fit) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    let ratio_w = bounds.0 as f64 / orig_w as f64;
    let ratio_h = bounds.1 as f64 / orig_h as f64;

    let ratio = match fit {
        Fit::Fill | Fit::Cover => return bounds,
        Fit::Inside | Fit::Contain => ratio_w.min(ratio_h),
        Fit::Outside => ratio_w.max(ratio_h),
    };

    let new_w = ((orig_w as f64 * ratio).round() as u32).max(1);
    let new_h = ((orig_h as f64 * ratio).round() as u32).max(1);

    // Rounding must not push an inside fit past the box.
    match fit {
        Fit::Inside | Fit::Contain => (new_w.min(bounds.0), new_h.min(bounds.1)),
        _ => (new_w, new_h),
    }
}
