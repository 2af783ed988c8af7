//! Page rendering: rasterization, scaling and image encoding.

pub mod image_ops;
pub mod rasterizer;
pub mod resize;
pub mod settings;

pub use image_ops::{encode, scale_to_fit};
pub use rasterizer::{PdfiumRasterizer, RasterDocument, Rasterizer, create_pdfium};
pub use resize::{BoundingBoxResizer, ImageResizer};
pub use settings::{Dimensions, OutputFormat, PreviewSettings, RenderSettings};
