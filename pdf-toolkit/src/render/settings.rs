//! Immutable render parameters.
//!
//! Every field defaults independently. Non-positive values silently fall back
//! to the default so hosts can pass raw request values straight through.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

pub const DEFAULT_THUMBNAIL_SIZE: u32 = 512;
pub const DEFAULT_THUMBNAIL_DPI: u32 = 150;
pub const DEFAULT_PREVIEW_DPI: u32 = 300;
pub const DEFAULT_PREVIEW_MAX_SIZE: u32 = 1024;

/// Encoded image format of rendered pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
        }
    }
}

/// A `"{width}x{height}"` bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_THUMBNAIL_SIZE,
            height: DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

impl FromStr for Dimensions {
    type Err = SelectionError;

    /// Parse `"300x150"`. A blank string gives the default size; a missing `x`
    /// or an `x` at either end is malformed. Non-positive halves reset to the
    /// default size.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let malformed = |source| SelectionError::MalformedDimension {
            input: input.to_string(),
            source,
        };

        let (width, height) = match trimmed.split_once('x') {
            Some((w, h)) if !w.is_empty() && !h.is_empty() => (w.trim(), h.trim()),
            _ => return Err(malformed(None)),
        };
        let width: i64 = width.parse().map_err(|e| malformed(Some(e)))?;
        let height: i64 = height.parse().map_err(|e| malformed(Some(e)))?;

        Ok(Self {
            width: positive_or(width, DEFAULT_THUMBNAIL_SIZE),
            height: positive_or(height, DEFAULT_THUMBNAIL_SIZE),
        })
    }
}

/// Thumbnail settings: bounding box, rendering resolution and output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    width: u32,
    height: u32,
    dpi: u32,
    format: OutputFormat,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_THUMBNAIL_SIZE,
            height: DEFAULT_THUMBNAIL_SIZE,
            dpi: DEFAULT_THUMBNAIL_DPI,
            format: OutputFormat::Jpeg,
        }
    }
}

impl RenderSettings {
    pub fn new(width: i64, height: i64, dpi: i64) -> Self {
        Self::default().with_size(width, height).with_dpi(dpi)
    }

    /// Settings from a `"{width}x{height}"` string and a dpi.
    pub fn from_dimensions(dimensions: &str, dpi: i64) -> Result<Self, SelectionError> {
        let Dimensions { width, height } = dimensions.parse()?;
        Ok(Self {
            width,
            height,
            ..Self::default()
        }
        .with_dpi(dpi))
    }

    pub fn with_size(self, width: i64, height: i64) -> Self {
        Self {
            width: positive_or(width, DEFAULT_THUMBNAIL_SIZE),
            height: positive_or(height, DEFAULT_THUMBNAIL_SIZE),
            ..self
        }
    }

    pub fn with_dpi(self, dpi: i64) -> Self {
        Self {
            dpi: positive_or(dpi, DEFAULT_THUMBNAIL_DPI),
            ..self
        }
    }

    pub fn with_format(self, format: OutputFormat) -> Self {
        Self { format, ..self }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Distinguishes cache entries rendered with different parameters
    pub(crate) fn cache_variant(&self) -> String {
        format!(
            "thumb-{}x{}@{}.{}",
            self.width,
            self.height,
            self.dpi,
            self.format.extension()
        )
    }
}

/// Single-page preview settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSettings {
    dpi: u32,
    max_width: u32,
    max_height: u32,
    format: OutputFormat,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_PREVIEW_DPI,
            max_width: DEFAULT_PREVIEW_MAX_SIZE,
            max_height: DEFAULT_PREVIEW_MAX_SIZE,
            format: OutputFormat::Jpeg,
        }
    }
}

impl PreviewSettings {
    pub fn new(dpi: i64, max_width: i64, max_height: i64) -> Self {
        Self::default()
            .with_dpi(dpi)
            .with_max_size(max_width, max_height)
    }

    pub fn with_dpi(self, dpi: i64) -> Self {
        Self {
            dpi: positive_or(dpi, DEFAULT_PREVIEW_DPI),
            ..self
        }
    }

    pub fn with_max_size(self, max_width: i64, max_height: i64) -> Self {
        Self {
            max_width: positive_or(max_width, DEFAULT_PREVIEW_MAX_SIZE),
            max_height: positive_or(max_height, DEFAULT_PREVIEW_MAX_SIZE),
            ..self
        }
    }

    pub fn with_format(self, format: OutputFormat) -> Self {
        Self { format, ..self }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub(crate) fn cache_variant(&self) -> String {
        format!(
            "preview-{}x{}@{}.{}",
            self.max_width,
            self.max_height,
            self.dpi,
            self.format.extension()
        )
    }
}

fn positive_or(value: i64, default: u32) -> u32 {
    match u32::try_from(value) {
        Ok(v) if v > 0 => v,
        _ => default,
    }
}
