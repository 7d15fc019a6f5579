// img-diff/src/processors/compressor.rs
use crate::core::{Background, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

pub struct Compressor {
    quality: u8,
    background: Background,
}

impl Compressor {
    pub fn new(background: Background) -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
            background,
        }
    }

    pub fn save_with_format(&self, image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
        log::debug!("Saving image to {} as {:?}", path.display(), format);

        match format {
            ImageFormat::Jpeg => self.save_jpeg(image, path),
            _ => self.save_generic(image, path, format),
        }
    }

    fn save_jpeg(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        let encoder = JpegEncoder::new_with_quality(writer, self.quality);

        // JPEG has no alpha channel.
        let rgb = if image.color().has_alpha() {
            flatten(image, self.background)
        } else {
            image.to_rgb8()
        };
        DynamicImage::ImageRgb8(rgb).write_with_encoder(encoder)?;

        Ok(())
    }

    fn save_generic(&self, image: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        image.write_to(&mut writer, format)?;
        Ok(())
    }
}

/// Composites `image` over an opaque `background`.
pub fn flatten(image: &DynamicImage, background: Background) -> RgbImage {
    let rgba = image.to_rgba8();
    let [br, bg, bb] = background.rgb();

    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |fg: u8, back: u8| ((fg as u32 * alpha + back as u32 * (255 - alpha) + 127) / 255) as u8;
        image::Rgb([blend(r, br), blend(g, bg), blend(b, bb)])
    })
}
