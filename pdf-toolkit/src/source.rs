//! Input and output values exchanged with the host.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// PDF bytes handed in by the host, with whatever descriptive metadata the
/// host's storage layer knows about them.
///
/// The toolkit only borrows a source for the duration of one operation and
/// never writes to its bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfSource {
    bytes: Vec<u8>,
    filename: Option<String>,
    digest: Option<String>,
    storage_key: Option<String>,
}

impl PdfSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            ..Self::default()
        }
    }

    /// Attach the original filename (used for output naming and as a last-resort cache key)
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Attach a strong content digest already computed by the storage layer
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Attach a storage-level content identifier (blob key)
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn filename(&self) -> Option<&str> {
        non_blank(self.filename.as_deref())
    }

    pub fn digest(&self) -> Option<&str> {
        non_blank(self.digest.as_deref())
    }

    pub fn storage_key(&self) -> Option<&str> {
        non_blank(self.storage_key.as_deref())
    }

    /// Base name for derived files: the source filename without directory or
    /// extension, or `fallback` when the source has no usable name, followed by
    /// `suffix`.
    ///
    /// `report.pdf` with suffix `-p3` gives `report-p3`; an unnamed source with
    /// fallback `pdf-img` gives `pdf-img-p3`.
    pub fn derived_name(&self, fallback: &str, suffix: &str) -> String {
        let base = self
            .filename()
            .and_then(|name| Path::new(name).file_stem())
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.trim().is_empty())
            .unwrap_or(fallback);
        format!("{base}{suffix}")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A newly built PDF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOutput {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// One encoded page image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// 1-based page number in the source document
    pub page_number: usize,
    pub filename: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    /// Standard base64 of the encoded bytes
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Serialize a thumbnail set as a JSON array of base64 strings, in page order.
pub fn thumbnails_to_base64_json(images: &[RenderedImage]) -> String {
    let encoded: Vec<String> = images.iter().map(RenderedImage::to_base64).collect();
    serde_json::Value::from(encoded).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_name_strips_directory_and_extension() {
        let source = PdfSource::default().with_filename("scans/mydoc.pdf");
        assert_eq!(source.derived_name("pdf-img", "-p3"), "mydoc-p3");
    }

    #[test]
    fn test_derived_name_falls_back_when_unnamed() {
        let source = PdfSource::default();
        assert_eq!(source.derived_name("pdf-img", "-p3"), "pdf-img-p3");

        let blank = PdfSource::default().with_filename("  ");
        assert_eq!(blank.derived_name("pdf", "-reordered"), "pdf-reordered");
    }

    #[test]
    fn test_blank_metadata_reads_as_absent() {
        let source = PdfSource::new(vec![1, 2, 3])
            .with_digest("")
            .with_storage_key(" ");
        assert_eq!(source.digest(), None);
        assert_eq!(source.storage_key(), None);
        assert_eq!(source.len(), 3);
    }

    #[test]
    fn test_base64_json_array_keeps_order() {
        let image = |page: usize, bytes: &[u8]| RenderedImage {
            page_number: page,
            filename: format!("doc-p{page}.jpg"),
            mime_type: "image/jpeg",
            width: 1,
            height: 1,
            bytes: bytes.to_vec(),
        };
        let json = thumbnails_to_base64_json(&[image(1, b"one"), image(2, b"two")]);
        let parsed: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec!["b25l".to_string(), "dHdv".to_string()]);
    }
}
