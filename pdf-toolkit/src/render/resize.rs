//! Bounding-box resize used for previews.

use image::RgbImage;
use image::imageops::FilterType;

use super::image_ops::resize_to_fit;
use crate::error::RenderError;

/// Shrinks a rendered page so it fits inside a bounding box.
pub trait ImageResizer {
    fn resize(
        &self,
        image: &RgbImage,
        max_width: u32,
        max_height: u32,
    ) -> Result<RgbImage, RenderError>;
}

/// Aspect-preserving Lanczos resize from the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBoxResizer;

impl ImageResizer for BoundingBoxResizer {
    fn resize(
        &self,
        image: &RgbImage,
        max_width: u32,
        max_height: u32,
    ) -> Result<RgbImage, RenderError> {
        Ok(resize_to_fit(image, max_width, max_height, FilterType::Lanczos3))
    }
}
