use std::num::ParseIntError;

use thiserror::Error;

/// Main toolkit error type
#[derive(Error, Debug)]
pub enum ToolkitError {
    #[error("Invalid page selection")]
    Selection(#[from] SelectionError),

    #[error("PDF codec failure")]
    Codec(#[from] CodecError),

    #[error("Rendering failed")]
    Render(#[from] RenderError),

    #[error("Source PDF has no pages")]
    EmptyDocument,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Errors raised while interpreting caller-supplied page selections and dimensions
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Malformed range segment \"{segment}\": {reason}")]
    MalformedRange {
        segment: String,
        reason: &'static str,
        #[source]
        source: Option<ParseIntError>,
    },

    #[error("Malformed dimension string: \"{input}\"")]
    MalformedDimension {
        input: String,
        #[source]
        source: Option<ParseIntError>,
    },

    #[error("Page {page} is outside 1..={page_count} in segment \"{segment}\"")]
    PageOutOfRange {
        page: i64,
        page_count: usize,
        segment: String,
    },

    #[error("Page numbers start at 1, got {page}")]
    PageNumberBelowOne { page: i64 },

    #[error("Range does not select any pages: \"{range}\"")]
    EmptyRange { range: String },

    #[error("Page order must not be empty")]
    EmptySelection,

    #[error("Duplicate page number in page order: {page}")]
    DuplicatePage { page: i64 },
}

/// Errors from reading or writing PDF structure
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Failed to decode PDF: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<lopdf::Error>,
    },

    #[error("Failed to encode PDF")]
    Encode(#[source] std::io::Error),
}

/// Rasterization and image encoding errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("PDFium library is not available: {message}")]
    PdfiumUnavailable { message: String },

    #[error("Failed to open PDF for rendering: {message}")]
    Open { message: String },

    #[error("Failed to rasterize page {page}: {message}")]
    Rasterize { page: usize, message: String },

    #[error("Failed to encode page {page} as {format}")]
    Encode {
        page: usize,
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to resize preview of page {page}: {message}")]
    Resize { page: usize, message: String },
}

impl ToolkitError {
    /// Stable machine-readable code for hosts that map errors to responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ToolkitError::Selection(SelectionError::MalformedRange { .. }) => "malformed_range",
            ToolkitError::Selection(SelectionError::MalformedDimension { .. }) => {
                "malformed_dimension"
            }
            ToolkitError::Selection(
                SelectionError::PageOutOfRange { .. } | SelectionError::PageNumberBelowOne { .. },
            ) => "page_out_of_range",
            ToolkitError::Selection(SelectionError::EmptyRange { .. }) => "empty_range",
            ToolkitError::Selection(SelectionError::EmptySelection) => "empty_selection",
            ToolkitError::Selection(SelectionError::DuplicatePage { .. }) => "duplicate_page",
            ToolkitError::Codec(CodecError::Decode { .. }) => "decode_error",
            ToolkitError::Codec(CodecError::Encode(_)) => "encode_error",
            ToolkitError::Render(RenderError::PdfiumUnavailable { .. }) => "pdfium_unavailable",
            ToolkitError::Render(RenderError::Open { .. }) => "render_open_error",
            ToolkitError::Render(RenderError::Rasterize { .. }) => "rasterize_error",
            ToolkitError::Render(RenderError::Encode { .. }) => "image_encode_error",
            ToolkitError::Render(RenderError::Resize { .. }) => "resize_error",
            ToolkitError::EmptyDocument => "empty_document",
            ToolkitError::Config { .. } => "config_error",
        }
    }

    /// True when the failure was caused by caller input rather than I/O or the environment
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            ToolkitError::Selection(_)
                | ToolkitError::EmptyDocument
                | ToolkitError::Codec(CodecError::Decode { .. })
        )
    }
}

/// Result type alias for toolkit operations
pub type ToolkitResult<T> = Result<T, ToolkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_nested_variant_names() {
        let err: ToolkitError = SelectionError::DuplicatePage { page: 4 }.into();
        assert_eq!(err.error_code(), "duplicate_page");
        assert!(err.is_caller_fault());

        let err: ToolkitError = CodecError::Encode(std::io::Error::other("disk full")).into();
        assert_eq!(err.error_code(), "encode_error");
        assert!(!err.is_caller_fault());
    }

    #[test]
    fn test_out_of_range_message_names_segment_and_bound() {
        let err = SelectionError::PageOutOfRange {
            page: 5,
            page_count: 3,
            segment: "5".to_string(),
        };
        assert_eq!(err.to_string(), "Page 5 is outside 1..=3 in segment \"5\"");
    }
}
