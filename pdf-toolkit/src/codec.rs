//! Loading, saving and deep-cloning PDF documents with `lopdf`.

use lopdf::Document;
use tracing::debug;

use crate::error::CodecError;

/// Decode a PDF from bytes.
///
/// Encrypted documents are reported as decode failures; decryption is not supported.
pub fn load(bytes: &[u8]) -> Result<Document, CodecError> {
    let document = Document::load_mem(bytes).map_err(|e| CodecError::Decode {
        message: e.to_string(),
        source: Some(e),
    })?;

    if document.is_encrypted() {
        return Err(CodecError::Decode {
            message: "encrypted documents are not supported".to_string(),
            source: None,
        });
    }

    debug!(
        bytes = bytes.len(),
        pages = document.get_pages().len(),
        version = %document.version,
        "Decoded PDF"
    );
    Ok(document)
}

/// Serialize a document to bytes.
pub fn save(document: &mut Document) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|e| CodecError::Encode(std::io::Error::other(e.to_string())))?;
    Ok(buffer)
}

/// Produce an independent copy of a document by serializing and re-reading it.
///
/// The copy shares no object state with the original, so it can be mutated in
/// place (page removal) while the original stays intact.
pub fn deep_clone(document: &mut Document) -> Result<Document, CodecError> {
    let bytes = save(document)?;
    load(&bytes)
}

/// Number of pages reachable from the document's page tree.
pub fn page_count(document: &Document) -> usize {
    document.get_pages().len()
}
