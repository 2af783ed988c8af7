//! PDF page manipulation and page rendering.
//!
//! - [`transform`] extracts, removes and reorders pages, always producing a
//!   new document.
//! - [`render`] rasterizes pages into thumbnails and previews.
//! - [`cache`] keeps rendered image sets per document so repeated requests
//!   render once.
//! - [`toolkit::PdfToolkit`] ties these together behind one facade.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod render;
pub mod selection;
pub mod source;
pub mod toolkit;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use config::ToolkitConfig;
pub use error::{ToolkitError, ToolkitResult};
pub use selection::{PageOrder, PageSet, parse_page_range, validate_page_order};
pub use source::{PdfOutput, PdfSource, RenderedImage, thumbnails_to_base64_json};
pub use toolkit::PdfToolkit;
pub use transform::{extract_pages, remove_pages, reorder_pages};
