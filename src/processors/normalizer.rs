// img-diff/src/processors/normalizer.rs
use image::{DynamicImage, Pixel};
use imageproc::stats::percentile;

/// Contrast stretch: the luminance between the lower and upper percentile
/// is mapped onto the full 0..=255 range on every colour channel.
pub struct Normalizer {
    lower: u8,
    upper: u8,
}

impl Normalizer {
    pub fn new() -> Self {
        Self { lower: 1, upper: 99 }
    }

    pub fn normalize(&self, image: &DynamicImage) -> DynamicImage {
        let luma = image.to_luma8();
        let low = percentile(&luma, self.lower);
        let high = percentile(&luma, self.upper);

        if high <= low {
            log::debug!("Flat histogram ({}..{}), skipping normalization", low, high);
            return image.clone();
        }

        let lut = stretch_table(low, high);
        let color = image.color();

        if color.has_alpha() {
            let mut rgba = image.to_rgba8();
            for pixel in rgba.pixels_mut() {
                pixel.apply_without_alpha(|c| lut[c as usize]);
            }
            DynamicImage::ImageRgba8(rgba)
        } else if color.has_color() {
            let mut rgb = image.to_rgb8();
            for pixel in rgb.pixels_mut() {
                pixel.apply(|c| lut[c as usize]);
            }
            DynamicImage::ImageRgb8(rgb)
        } else {
            let mut gray = luma;
            for pixel in gray.pixels_mut() {
                pixel.apply(|c| lut[c as usize]);
            }
            DynamicImage::ImageLuma8(gray)
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn stretch_table(low: u8, high: u8) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let span = (high - low) as f32;
    for (value, slot) in lut.iter_mut().enumerate() {
        let scaled = (value as f32 - low as f32) * 255.0 / span;
        *slot = scaled.round().clamp(0.0, 255.0) as u8;
    }
    lut
}
