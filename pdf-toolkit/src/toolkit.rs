//! Facade over page transformation and cached rendering.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info};

use crate::cache::{CacheKey, CacheKeyDeriver, CacheScope, RenderCache};
use crate::config::ToolkitConfig;
use crate::error::{RenderError, SelectionError, ToolkitResult};
use crate::render::{
    BoundingBoxResizer, ImageResizer, OutputFormat, PdfiumRasterizer, PreviewSettings,
    Rasterizer, RenderSettings, encode, scale_to_fit,
};
use crate::selection::check_bounds;
use crate::source::{PdfOutput, PdfSource, RenderedImage};
use crate::transform;

/// Name used for images of sources without a filename
const IMAGE_FALLBACK_NAME: &str = "pdf-img";

/// Entry point for hosts.
///
/// Page transformations are stateless. Renders go through a [`RenderCache`]
/// that can be shared between toolkits with [`PdfToolkit::with_cache`].
pub struct PdfToolkit {
    config: ToolkitConfig,
    keys: CacheKeyDeriver,
    cache: Arc<RenderCache>,
    rasterizer: Box<dyn Rasterizer>,
    resizer: Box<dyn ImageResizer>,
}

impl PdfToolkit {
    /// Build a toolkit rendering with PDFium.
    pub fn new(config: ToolkitConfig) -> ToolkitResult<Self> {
        let rasterizer = PdfiumRasterizer::new(config.pdfium.library_dir.as_deref())?;
        Ok(Self::with_rasterizer(config, Box::new(rasterizer)))
    }

    pub fn with_rasterizer(config: ToolkitConfig, rasterizer: Box<dyn Rasterizer>) -> Self {
        Self {
            keys: config.cache.key_deriver(),
            config,
            cache: Arc::new(RenderCache::new()),
            rasterizer,
            resizer: Box::new(BoundingBoxResizer),
        }
    }

    pub fn with_cache(mut self, cache: Arc<RenderCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_resizer(mut self, resizer: Box<dyn ImageResizer>) -> Self {
        self.resizer = resizer;
        self
    }

    pub fn cache(&self) -> &Arc<RenderCache> {
        &self.cache
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Thumbnail settings from configuration
    pub fn thumbnail_settings(&self) -> RenderSettings {
        self.config.thumbnails.settings()
    }

    /// Preview settings from configuration
    pub fn preview_settings(&self) -> PreviewSettings {
        self.config.preview.settings()
    }

    pub fn extract_pages(&self, source: &PdfSource, range: &str) -> ToolkitResult<PdfOutput> {
        transform::extract_pages(source, range)
    }

    pub fn remove_pages(&self, source: &PdfSource, range: &str) -> ToolkitResult<PdfOutput> {
        transform::remove_pages(source, range)
    }

    pub fn reorder_pages(&self, source: &PdfSource, order: &[i64]) -> ToolkitResult<PdfOutput> {
        transform::reorder_pages(source, order)
    }

    /// One thumbnail per page, in page order.
    ///
    /// Results are cached per document fingerprint and settings. A source
    /// without a fingerprint is rendered fresh on every call.
    pub fn render_thumbnails(
        &self,
        source: &PdfSource,
        settings: &RenderSettings,
    ) -> ToolkitResult<Vec<RenderedImage>> {
        let render = || self.rasterize_thumbnails(source, settings);
        match self.cache_key(source, settings.cache_variant(), CacheScope::AllPages) {
            Some(key) => Ok(self.cache.get_or_render(&key, render)?.to_vec()),
            None => render(),
        }
    }

    /// A single page (1-based) rendered at preview resolution and shrunk to fit
    /// the preview bounding box.
    pub fn render_preview(
        &self,
        source: &PdfSource,
        page_number: usize,
        settings: &PreviewSettings,
    ) -> ToolkitResult<RenderedImage> {
        if page_number == 0 {
            return Err(SelectionError::PageNumberBelowOne { page: 0 }.into());
        }

        let render = || self.rasterize_preview(source, page_number, settings);
        let scope = CacheScope::Page(page_number);
        let images = match self.cache_key(source, settings.cache_variant(), scope) {
            Some(key) => self.cache.get_or_render(&key, render)?.to_vec(),
            None => render()?,
        };
        images.into_iter().next().ok_or_else(|| {
            RenderError::Rasterize {
                page: page_number,
                message: "no preview image was produced".to_string(),
            }
            .into()
        })
    }

    fn cache_key(&self, source: &PdfSource, variant: String, scope: CacheScope) -> Option<CacheKey> {
        if !self.config.cache.enabled {
            return None;
        }
        let key = self.keys.derive(source, &variant, scope);
        if key.is_none() {
            debug!(filename = ?source.filename(), "Source has no fingerprint, rendering uncached");
        }
        key
    }

    fn rasterize_thumbnails(
        &self,
        source: &PdfSource,
        settings: &RenderSettings,
    ) -> ToolkitResult<Vec<RenderedImage>> {
        let document = self.rasterizer.open(source.bytes())?;
        let page_count = document.page_count();

        let mut images = Vec::with_capacity(page_count);
        for index in 0..page_count {
            let page = document.render_page(index, settings.dpi())?;
            let thumbnail = scale_to_fit(&page, settings.width(), settings.height());
            images.push(self.encode_page(source, index + 1, &thumbnail, settings.format())?);
        }

        info!(
            filename = ?source.filename(),
            pages = page_count,
            width = settings.width(),
            height = settings.height(),
            dpi = settings.dpi(),
            "Rendered thumbnails"
        );
        Ok(images)
    }

    fn rasterize_preview(
        &self,
        source: &PdfSource,
        page_number: usize,
        settings: &PreviewSettings,
    ) -> ToolkitResult<Vec<RenderedImage>> {
        let document = self.rasterizer.open(source.bytes())?;
        check_bounds(page_number as i64, document.page_count(), &page_number.to_string())?;

        let page = document.render_page(page_number - 1, settings.dpi())?;
        let preview = self
            .resizer
            .resize(&page, settings.max_width(), settings.max_height())?;

        info!(
            filename = ?source.filename(),
            page = page_number,
            width = preview.width(),
            height = preview.height(),
            "Rendered preview"
        );
        Ok(vec![self.encode_page(source, page_number, &preview, settings.format())?])
    }

    fn encode_page(
        &self,
        source: &PdfSource,
        page_number: usize,
        image: &RgbImage,
        format: OutputFormat,
    ) -> ToolkitResult<RenderedImage> {
        let bytes = encode(image, format, page_number)?;
        let name = source.derived_name(IMAGE_FALLBACK_NAME, &format!("-p{page_number}"));
        Ok(RenderedImage {
            page_number,
            filename: format!("{}.{}", name, format.extension()),
            mime_type: format.mime_type(),
            width: image.width(),
            height: image.height(),
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::KeyStrategy;
    use crate::error::ToolkitError;
    use crate::render::RasterDocument;
    use crate::test_support::build_pdf;
    use crate::transform::remove_pages;

    /// Renders every page as a flat 612x792-point page, counting renders.
    /// The page count is read from the PDF with lopdf.
    #[derive(Default)]
    struct FakeRasterizer {
        opened: Arc<AtomicUsize>,
        fail_open: bool,
    }

    struct FakeDocument {
        pages: usize,
    }

    impl Rasterizer for FakeRasterizer {
        fn open<'a>(&'a self, bytes: &'a [u8]) -> ToolkitResult<Box<dyn RasterDocument + 'a>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            if self.fail_open {
                return Err(RenderError::Open {
                    message: "fake failure".to_string(),
                }
                .into());
            }
            let document = crate::codec::load(bytes)?;
            Ok(Box::new(FakeDocument {
                pages: crate::codec::page_count(&document),
            }))
        }
    }

    impl RasterDocument for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn rasterize(&self, index: usize, dpi: u32) -> Result<RgbImage, RenderError> {
            let width = 612 * dpi / 72;
            let height = 792 * dpi / 72;
            let shade = (index * 40 % 255) as u8;
            Ok(RgbImage::from_pixel(width, height, image::Rgb([shade, shade, shade])))
        }
    }

    /// A toolkit over a fake rasterizer, plus the rasterizer's open counter
    fn toolkit(config: ToolkitConfig) -> (PdfToolkit, Arc<AtomicUsize>) {
        let rasterizer = FakeRasterizer::default();
        let opened = Arc::clone(&rasterizer.opened);
        (PdfToolkit::with_rasterizer(config, Box::new(rasterizer)), opened)
    }

    fn count(opened: &AtomicUsize) -> usize {
        opened.load(Ordering::SeqCst)
    }

    fn source(pages: u32) -> PdfSource {
        PdfSource::new(build_pdf(pages)).with_filename("mydoc.pdf")
    }

    #[test]
    fn test_thumbnail_per_page_within_bounds() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let images = toolkit
            .render_thumbnails(&source(3), &RenderSettings::new(100, 100, 72))
            .unwrap();

        assert_eq!(images.len(), 3);
        for (i, image) in images.iter().enumerate() {
            assert_eq!(image.page_number, i + 1);
            assert_eq!(image.filename, format!("mydoc-p{}.jpg", i + 1));
            assert_eq!(image.mime_type, "image/jpeg");
            assert_eq!((image.width, image.height), (77, 100));
            assert_eq!(&image.bytes[..2], &[0xFF, 0xD8]);
        }
    }

    #[test]
    fn test_unnamed_source_uses_fallback_image_names() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let images = toolkit
            .render_thumbnails(&PdfSource::new(build_pdf(1)), &RenderSettings::new(50, 50, 72))
            .unwrap();
        assert_eq!(images[0].filename, "pdf-img-p1.jpg");
    }

    #[test]
    fn test_png_thumbnails() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let settings = RenderSettings::new(50, 50, 72).with_format(OutputFormat::Png);
        let images = toolkit.render_thumbnails(&source(1), &settings).unwrap();
        assert_eq!(images[0].filename, "mydoc-p1.png");
        assert_eq!(images[0].mime_type, "image/png");
    }

    #[test]
    fn test_second_thumbnail_call_is_served_from_cache() {
        let (toolkit, opened) = toolkit(ToolkitConfig::default());
        let source = source(2);
        let settings = RenderSettings::new(64, 64, 72);

        let first = toolkit.render_thumbnails(&source, &settings).unwrap();
        let second = toolkit.render_thumbnails(&source, &settings).unwrap();

        assert_eq!(first, second);
        assert_eq!(count(&opened), 1);
    }

    #[test]
    fn test_different_settings_render_separately() {
        let (toolkit, opened) = toolkit(ToolkitConfig::default());
        let source = source(1);
        let small = toolkit
            .render_thumbnails(&source, &RenderSettings::new(32, 32, 72))
            .unwrap();
        let large = toolkit
            .render_thumbnails(&source, &RenderSettings::new(128, 128, 72))
            .unwrap();
        assert_eq!(count(&opened), 2);
        assert!(small[0].height < large[0].height);
    }

    #[test]
    fn test_keyless_source_is_rendered_every_time() {
        let mut config = ToolkitConfig::default();
        config.cache.hash_content = false;
        config.cache.key_strategies = vec![KeyStrategy::ContentDigest, KeyStrategy::StorageKey];
        let (toolkit, opened) = toolkit(config);

        let source = source(1);
        let settings = RenderSettings::new(32, 32, 72);
        toolkit.render_thumbnails(&source, &settings).unwrap();
        toolkit.render_thumbnails(&source, &settings).unwrap();

        assert_eq!(count(&opened), 2);
        assert!(toolkit.cache().is_empty());
    }

    #[test]
    fn test_disabled_cache_is_bypassed() {
        let mut config = ToolkitConfig::default();
        config.cache.enabled = false;
        let (toolkit, opened) = toolkit(config);

        let source = source(1).with_digest("abc");
        let settings = RenderSettings::new(32, 32, 72);
        toolkit.render_thumbnails(&source, &settings).unwrap();
        toolkit.render_thumbnails(&source, &settings).unwrap();
        assert_eq!(count(&opened), 2);
    }

    #[test]
    fn test_shared_cache_across_toolkits() {
        let cache = Arc::new(RenderCache::new());
        let (first, first_opened) = toolkit(ToolkitConfig::default());
        let first = first.with_cache(Arc::clone(&cache));
        let (second, second_opened) = toolkit(ToolkitConfig::default());
        let second = second.with_cache(Arc::clone(&cache));

        let source = source(1).with_digest("shared");
        let settings = RenderSettings::new(32, 32, 72);
        first.render_thumbnails(&source, &settings).unwrap();
        second.render_thumbnails(&source, &settings).unwrap();

        assert_eq!(count(&first_opened), 1);
        assert_eq!(count(&second_opened), 0);
    }

    #[test]
    fn test_render_failure_is_not_cached() {
        let toolkit = PdfToolkit::with_rasterizer(
            ToolkitConfig::default(),
            Box::new(FakeRasterizer {
                fail_open: true,
                ..FakeRasterizer::default()
            }),
        );
        let source = source(1).with_digest("broken");
        let settings = RenderSettings::new(32, 32, 72);

        let err = toolkit.render_thumbnails(&source, &settings).unwrap_err();
        assert_eq!(err.error_code(), "render_open_error");
        assert!(toolkit.cache().is_empty());
    }

    #[test]
    fn test_preview_fits_bounding_box() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let preview = toolkit
            .render_preview(&source(3), 2, &PreviewSettings::default())
            .unwrap();

        // 612x792 points at 300 dpi is 2550x3300, shrunk into 1024x1024
        assert_eq!((preview.width, preview.height), (791, 1024));
        assert_eq!(preview.page_number, 2);
        assert_eq!(preview.filename, "mydoc-p2.jpg");
    }

    #[test]
    fn test_preview_is_cached_per_page() {
        let (toolkit, opened) = toolkit(ToolkitConfig::default());
        let source = source(3);
        let settings = PreviewSettings::new(72, 200, 200);

        toolkit.render_preview(&source, 1, &settings).unwrap();
        toolkit.render_preview(&source, 1, &settings).unwrap();
        assert_eq!(count(&opened), 1);

        toolkit.render_preview(&source, 2, &settings).unwrap();
        assert_eq!(count(&opened), 2);

        // Thumbnails of the same document live under a different key
        toolkit
            .render_thumbnails(&source, &RenderSettings::new(200, 200, 72))
            .unwrap();
        assert_eq!(count(&opened), 3);
    }

    #[test]
    fn test_preview_page_out_of_range() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let source = source(3);

        for page in [0, 4] {
            let err = toolkit
                .render_preview(&source, page, &PreviewSettings::default())
                .unwrap_err();
            assert_eq!(err.error_code(), "page_out_of_range");
        }
        assert!(toolkit.cache().is_empty());
    }

    #[test]
    fn test_preview_page_zero_is_rejected_before_rendering() {
        let (toolkit, opened) = toolkit(ToolkitConfig::default());
        let err = toolkit
            .render_preview(&source(3), 0, &PreviewSettings::default())
            .unwrap_err();

        assert!(matches!(
            err,
            ToolkitError::Selection(SelectionError::PageNumberBelowOne { page: 0 })
        ));
        assert_eq!(err.error_code(), "page_out_of_range");
        assert_eq!(count(&opened), 0);
        assert!(toolkit.cache().is_empty());
    }

    #[test]
    fn test_unreadable_bytes_are_a_decode_error() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let source = PdfSource::new(b"not a pdf at all".to_vec()).with_filename("junk.pdf");

        let err = toolkit
            .render_thumbnails(&source, &RenderSettings::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "decode_error");

        let err = toolkit
            .render_preview(&source, 1, &PreviewSettings::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "decode_error");
        assert!(toolkit.cache().is_empty());
    }

    #[test]
    fn test_zero_page_document_has_no_thumbnails() {
        let (toolkit, _) = toolkit(ToolkitConfig::default());
        let emptied = remove_pages(&source(2), "1-2").unwrap();
        let source = PdfSource::new(emptied.bytes).with_filename("emptied.pdf");

        let images = toolkit
            .render_thumbnails(&source, &RenderSettings::new(32, 32, 72))
            .unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_transformations_delegate() {
        let (toolkit, opened) = toolkit(ToolkitConfig::default());
        let output = toolkit.extract_pages(&source(4), "2-3").unwrap();
        assert_eq!(output.filename, "mydoc-extracted.pdf");
        assert_eq!(count(&opened), 0);
    }
}
