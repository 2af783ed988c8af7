//! Page rasterization.
//!
//! Rendering goes through the [`Rasterizer`] trait so the cache and facade can
//! be driven by any backend. [`PdfiumRasterizer`] is the production backend.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use pdfium_render::prelude::*;
use tracing::{debug, info};

use crate::error::{CodecError, RenderError, SelectionError, ToolkitError, ToolkitResult};

/// PDF points per inch
const POINTS_PER_INCH: f32 = 72.0;

/// Opens PDF bytes for rendering.
pub trait Rasterizer {
    /// Bytes that are not a readable PDF fail with [`CodecError::Decode`].
    fn open<'a>(&'a self, bytes: &'a [u8]) -> ToolkitResult<Box<dyn RasterDocument + 'a>>;
}

/// A document opened for rendering.
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    /// Rasterize the page at 0-based `index`. Callers go through
    /// [`RasterDocument::render_page`], which checks bounds first.
    fn rasterize(&self, index: usize, dpi: u32) -> Result<RgbImage, RenderError>;

    /// Render the page at 0-based `index` as an RGB image at `dpi`.
    fn render_page(&self, index: usize, dpi: u32) -> ToolkitResult<RgbImage> {
        let page_count = self.page_count();
        if index >= page_count {
            return Err(SelectionError::PageOutOfRange {
                page: index as i64 + 1,
                page_count,
                segment: format!("page index {index}"),
            }
            .into());
        }
        Ok(self.rasterize(index, dpi)?)
    }
}

/// Bind to a PDFium shared library.
///
/// Tries `library_dir` when given, then the working directory, then
/// `./vendor/pdfium/lib/`, and finally the system library path.
pub fn create_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, RenderError> {
    let mut search_dirs: Vec<PathBuf> = library_dir.map(Path::to_path_buf).into_iter().collect();
    search_dirs.push(PathBuf::from("./"));
    search_dirs.push(PathBuf::from("./vendor/pdfium/lib/"));

    let bindings = search_dirs
        .iter()
        .find_map(|dir| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)).ok()
        })
        .map(Ok)
        .unwrap_or_else(Pdfium::bind_to_system_library)
        .map_err(|e| RenderError::PdfiumUnavailable {
            message: format!(
                "failed to load PDFium; install libpdfium or set pdfium.library_dir: {:?}",
                e
            ),
        })?;

    info!(library_dir = ?library_dir, "Bound PDFium library");
    Ok(Pdfium::new(bindings))
}

/// Renders pages with PDFium.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    pub fn new(library_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Self {
            pdfium: create_pdfium(library_dir)?,
        })
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> ToolkitResult<Box<dyn RasterDocument + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(open_error)?;
        Ok(Box::new(PdfiumDocument { document }))
    }
}

/// Malformed and password-protected files are decode failures, the same as
/// on the page editing path. Anything else is a rendering failure.
fn open_error(error: PdfiumError) -> ToolkitError {
    match error {
        PdfiumError::PdfiumLibraryInternalError(
            PdfiumInternalError::FormatError
            | PdfiumInternalError::FileError
            | PdfiumInternalError::PasswordError
            | PdfiumInternalError::SecurityError,
        ) => CodecError::Decode {
            message: error.to_string(),
            source: None,
        }
        .into(),
        other => RenderError::Open {
            message: other.to_string(),
        }
        .into(),
    }
}

struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn rasterize(&self, index: usize, dpi: u32) -> Result<RgbImage, RenderError> {
        let rasterize_error = |message: String| RenderError::Rasterize {
            page: index + 1,
            message,
        };

        let pages = self.document.pages();
        let page = pages
            .get(index as u16)
            .map_err(|e| rasterize_error(e.to_string()))?;

        let pixels_per_point = dpi as f32 / POINTS_PER_INCH;
        let width = (page.width().value * pixels_per_point).ceil().max(1.0) as i32;
        let height = (page.height().value * pixels_per_point).ceil().max(1.0) as i32;

        debug!(page = index + 1, dpi, width, height, "Rasterizing page");

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| rasterize_error(e.to_string()))?;

        let image: DynamicImage = bitmap.as_image();
        Ok(image.to_rgb8())
    }
}
