//! Scaling and encoding of rendered page images.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage};

use super::settings::OutputFormat;
use crate::error::RenderError;

const JPEG_QUALITY: u8 = 85;

/// Largest size with the aspect ratio of `width`x`height` that fits inside
/// `max_width`x`max_height`. Never scales up and never goes below one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let fit = |side: u32, bound: u32| ((side as f64 * scale).round() as u32).clamp(1, bound.max(1));
    (fit(width, max_width), fit(height, max_height))
}

/// Shrink `image` to fit inside the bounding box, preserving aspect ratio.
///
/// Images that already fit are returned unchanged.
pub fn scale_to_fit(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
    resize_to_fit(image, max_width, max_height, FilterType::Triangle)
}

pub(crate) fn resize_to_fit(
    image: &RgbImage,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> RgbImage {
    let (width, height) = image.dimensions();
    let (target_width, target_height) = fit_within(width, height, max_width, max_height);
    if (target_width, target_height) == (width, height) {
        return image.clone();
    }
    imageops::resize(image, target_width, target_height, filter)
}

/// Encode `image` in `format`. `page` is only used for error reporting.
pub fn encode(image: &RgbImage, format: OutputFormat, page: usize) -> Result<Vec<u8>, RenderError> {
    let mut buffer = Vec::new();
    let (width, height) = image.dimensions();

    let result = match format {
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
        OutputFormat::Png => PngEncoder::new(&mut buffer).write_image(
            image.as_raw(),
            width,
            height,
            ExtendedColorType::Rgb8,
        ),
    };

    result.map_err(|source| RenderError::Encode {
        page,
        format: format.name(),
        source,
    })?;
    Ok(buffer)
}
