//! Toolkit configuration.
//!
//! Loaded once at startup from an optional `pdf-toolkit.{toml,yaml,json}` file
//! and `PDF_TOOLKIT__*` environment variables (see [`loader`]).

mod loader;

use std::path::PathBuf;

use serde::Deserialize;

use crate::cache::{CacheKeyDeriver, KeyStrategy};
use crate::render::settings::{
    DEFAULT_PREVIEW_DPI, DEFAULT_PREVIEW_MAX_SIZE, DEFAULT_THUMBNAIL_DPI, DEFAULT_THUMBNAIL_SIZE,
};
use crate::render::{OutputFormat, PreviewSettings, RenderSettings};

pub use loader::{load_config, load_config_from};

#[derive(Debug, Clone, Deserialize)]
pub struct ToolkitConfig {
    #[serde(default = "default_thumbnails")]
    pub thumbnails: ThumbnailConfig,

    #[serde(default = "default_preview")]
    pub preview: PreviewConfig,

    #[serde(default = "default_cache")]
    pub cache: CacheConfig,

    #[serde(default)]
    pub pdfium: PdfiumConfig,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            thumbnails: default_thumbnails(),
            preview: default_preview(),
            cache: default_cache(),
            pdfium: PdfiumConfig::default(),
        }
    }
}

/// Default thumbnail parameters. Non-positive values fall back to the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailConfig {
    #[serde(default = "default_thumbnail_size")]
    pub width: i64,

    #[serde(default = "default_thumbnail_size")]
    pub height: i64,

    #[serde(default = "default_thumbnail_dpi")]
    pub dpi: i64,

    #[serde(default)]
    pub format: OutputFormat,
}

impl ThumbnailConfig {
    pub fn settings(&self) -> RenderSettings {
        RenderSettings::new(self.width, self.height, self.dpi).with_format(self.format)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_dpi")]
    pub dpi: i64,

    #[serde(default = "default_preview_max_size")]
    pub max_width: i64,

    #[serde(default = "default_preview_max_size")]
    pub max_height: i64,

    #[serde(default)]
    pub format: OutputFormat,
}

impl PreviewConfig {
    pub fn settings(&self) -> PreviewSettings {
        PreviewSettings::new(self.dpi, self.max_width, self.max_height).with_format(self.format)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// When false every render is cold
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fingerprint sources without a declared digest by hashing their bytes
    #[serde(default = "default_true")]
    pub hash_content: bool,

    /// Fingerprint strategies, tried in order
    #[serde(default = "default_key_strategies")]
    pub key_strategies: Vec<KeyStrategy>,
}

impl CacheConfig {
    pub fn key_deriver(&self) -> CacheKeyDeriver {
        CacheKeyDeriver::new(self.key_strategies.clone(), self.hash_content)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfiumConfig {
    /// Directory holding the PDFium shared library. Searched before the
    /// working directory and the system library path.
    #[serde(default)]
    pub library_dir: Option<PathBuf>,
}

// ==================== Default Value Functions ====================

pub(crate) fn default_thumbnails() -> ThumbnailConfig {
    ThumbnailConfig {
        width: default_thumbnail_size(),
        height: default_thumbnail_size(),
        dpi: default_thumbnail_dpi(),
        format: OutputFormat::default(),
    }
}

pub(crate) fn default_thumbnail_size() -> i64 {
    DEFAULT_THUMBNAIL_SIZE as i64
}

pub(crate) fn default_thumbnail_dpi() -> i64 {
    DEFAULT_THUMBNAIL_DPI as i64
}

pub(crate) fn default_preview() -> PreviewConfig {
    PreviewConfig {
        dpi: default_preview_dpi(),
        max_width: default_preview_max_size(),
        max_height: default_preview_max_size(),
        format: OutputFormat::default(),
    }
}

pub(crate) fn default_preview_dpi() -> i64 {
    DEFAULT_PREVIEW_DPI as i64
}

pub(crate) fn default_preview_max_size() -> i64 {
    DEFAULT_PREVIEW_MAX_SIZE as i64
}

pub(crate) fn default_cache() -> CacheConfig {
    CacheConfig {
        enabled: true,
        hash_content: true,
        key_strategies: default_key_strategies(),
    }
}

pub(crate) fn default_key_strategies() -> Vec<KeyStrategy> {
    vec![
        KeyStrategy::ContentDigest,
        KeyStrategy::StorageKey,
        KeyStrategy::FilenameAndLength,
    ]
}

fn default_true() -> bool {
    true
}
