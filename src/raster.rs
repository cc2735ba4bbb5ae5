//! Normalized pixel buffers and the codec call that turns them into file bytes.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, GrayImage, ImageEncoder, RgbImage, RgbaImage};

use crate::error::ExportError;
use crate::pipeline::OutputFormat;

/// One image of a batch, as floating-point samples in `[0, 1]`.
///
/// Samples are interleaved row-major, `channels` per pixel: 1 (gray),
/// 3 (RGB) or 4 (RGBA). Out-of-range values are clamped on conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub data: Vec<f32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<f32>) -> Self {
        Self { width, height, channels, data }
    }

    /// A buffer with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: usize, value: f32) -> Self {
        let len = width as usize * height as usize * channels;
        Self::new(width, height, channels, vec![value; len])
    }

    /// Normalize a decoded image into `[0, 1]` samples.
    ///
    /// Gray images stay single-channel, images with alpha keep four channels,
    /// everything else becomes RGB.
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let (width, height) = (img.width(), img.height());
        let color = img.color();
        let (channels, bytes) = if color.has_alpha() {
            (4, img.to_rgba8().into_raw())
        } else if color.channel_count() == 1 {
            (1, img.to_luma8().into_raw())
        } else {
            (3, img.to_rgb8().into_raw())
        };
        let data = bytes.into_iter().map(|b| f32::from(b) / 255.0).collect();
        Self::new(width, height, channels, data)
    }

    /// Convert to an 8-bit image: `clamp(255 * v, 0, 255)`, truncated.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let expected = self.width as usize * self.height as usize * self.channels;
        if self.data.len() != expected {
            anyhow::bail!(
                "pixel buffer holds {} samples, expected {} for {}x{}x{}",
                self.data.len(),
                expected,
                self.width,
                self.height,
                self.channels
            );
        }

        let bytes: Vec<u8> = self.data.iter().map(|&v| to_u8(v)).collect();
        let img = match self.channels {
            1 => GrayImage::from_raw(self.width, self.height, bytes).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(self.width, self.height, bytes).map(DynamicImage::ImageRgb8),
            4 => RgbaImage::from_raw(self.width, self.height, bytes).map(DynamicImage::ImageRgba8),
            n => return Err(ExportError::UnsupportedChannels(n).into()),
        };
        img.context("Pixel buffer does not match its dimensions")
    }
}

/// NaN maps to 0 because float-to-int casts saturate.
fn to_u8(v: f32) -> u8 {
    (255.0 * v).clamp(0.0, 255.0) as u8
}

/// PNG compression effort (0–9) for a 1–100 quality: higher quality, less effort.
pub fn png_compression_level(quality: u8) -> u8 {
    let quality = u32::from(quality.clamp(1, 100));
    ((100 - quality) * 9 / 99) as u8
}

fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Encode an image into `format`'s container, without any metadata.
///
/// Alpha is dropped for formats that cannot store it.
pub fn encode_image(img: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    let img = flatten_for(img, format);
    let (width, height) = (img.width(), img.height());
    let color: ExtendedColorType = img.color().into();
    let mut buf = Vec::new();

    match format {
        OutputFormat::Png => {
            let level = png_compression_level(quality);
            log::debug!("PNG compression level {level}");
            PngEncoder::new_with_quality(&mut buf, png_compression(level), FilterType::Adaptive)
                .write_image(img.as_bytes(), width, height, color)
                .context("Failed to encode PNG")?;
        }
        OutputFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
                .write_image(img.as_bytes(), width, height, color)
                .context("Failed to encode JPEG")?;
        }
        OutputFormat::WebP => {
            // The available WebP encoder is lossless only.
            WebPEncoder::new_lossless(&mut buf)
                .write_image(img.as_bytes(), width, height, color)
                .context("Failed to encode WebP")?;
        }
    }

    Ok(buf)
}

/// Drop the alpha channel when the target format has none.
fn flatten_for(img: &DynamicImage, format: OutputFormat) -> DynamicImage {
    if format.supports_alpha() || !img.color().has_alpha() {
        return img.clone();
    }
    if img.color().channel_count() == 2 {
        DynamicImage::ImageLuma8(img.to_luma8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}
