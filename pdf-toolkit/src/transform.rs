//! Page extraction, removal and reordering.
//!
//! All three operations produce a fresh document and never touch the
//! caller's bytes:
//! - extraction and reordering copy the selected pages into a new, empty
//!   document (see [`copy`]);
//! - removal deep-clones the source first and deletes pages from the clone,
//!   highest page number first so earlier deletions never shift the index of a
//!   page still waiting to be deleted.

mod copy;

use lopdf::Document;
use tracing::info;

use crate::codec;
use crate::error::{ToolkitError, ToolkitResult};
use crate::selection::{PageSet, parse_page_range, validate_page_order};
use crate::source::{PDF_MIME_TYPE, PdfOutput, PdfSource};

/// How an operation names the file it produces
#[derive(Debug, Clone, Copy)]
struct OutputNaming {
    fallback: &'static str,
    suffix: &'static str,
}

const EXTRACTED: OutputNaming = OutputNaming {
    fallback: "pdf-extracted-pages",
    suffix: "-extracted",
};

const PAGES_REMOVED: OutputNaming = OutputNaming {
    fallback: "pdf-after-removed-pages",
    suffix: "-pages-removed",
};

const REORDERED: OutputNaming = OutputNaming {
    fallback: "pdf",
    suffix: "-reordered",
};

/// Build a PDF containing only the pages selected by `range`, in ascending order.
pub fn extract_pages(source: &PdfSource, range: &str) -> ToolkitResult<PdfOutput> {
    let document = codec::load(source.bytes())?;
    let mut extracted = extract_from_document(&document, range)?;
    finish(source, &mut extracted, EXTRACTED)
}

/// Build a PDF containing every page except those selected by `range`.
pub fn remove_pages(source: &PdfSource, range: &str) -> ToolkitResult<PdfOutput> {
    let mut document = codec::load(source.bytes())?;
    let mut remaining = remove_from_document(&mut document, range)?;
    finish(source, &mut remaining, PAGES_REMOVED)
}

/// Build a PDF whose page `i` is source page `order[i]`.
///
/// `order` may omit pages, shrinking the result, but must not repeat any.
pub fn reorder_pages(source: &PdfSource, order: &[i64]) -> ToolkitResult<PdfOutput> {
    let document = codec::load(source.bytes())?;
    let mut reordered = reorder_document(&document, order)?;
    finish(source, &mut reordered, REORDERED)
}

/// Extraction over an already decoded document.
pub fn extract_from_document(document: &Document, range: &str) -> ToolkitResult<Document> {
    let page_count = non_empty_page_count(document)?;
    let pages = parse_page_range(range, page_count)?;
    let selected: Vec<u32> = pages.iter().collect();

    let extracted = copy::copy_pages_in_order(document, &selected)?;
    info!(
        range,
        source_pages = page_count,
        extracted = selected.len(),
        "Extracted pages"
    );
    Ok(extracted)
}

/// Removal over an already decoded document. `document` itself is left untouched.
pub fn remove_from_document(document: &mut Document, range: &str) -> ToolkitResult<Document> {
    let page_count = non_empty_page_count(document)?;
    let pages = parse_page_range(range, page_count)?;

    let mut working = codec::deep_clone(document)?;
    delete_descending(&mut working, &pages);

    info!(
        range,
        source_pages = page_count,
        removed = pages.len(),
        remaining = codec::page_count(&working),
        "Removed pages"
    );
    Ok(working)
}

/// Reordering over an already decoded document.
pub fn reorder_document(document: &Document, order: &[i64]) -> ToolkitResult<Document> {
    let page_count = non_empty_page_count(document)?;
    let order = validate_page_order(order, page_count)?;

    let reordered = copy::copy_pages_in_order(document, order.as_slice())?;
    info!(
        source_pages = page_count,
        result_pages = order.len(),
        "Reordered pages"
    );
    Ok(reordered)
}

fn delete_descending(document: &mut Document, pages: &PageSet) {
    for page in pages.iter().rev() {
        document.delete_pages(&[page]);
    }
    document.prune_objects();
}

fn non_empty_page_count(document: &Document) -> ToolkitResult<usize> {
    match codec::page_count(document) {
        0 => Err(ToolkitError::EmptyDocument),
        count => Ok(count),
    }
}

fn finish(
    source: &PdfSource,
    document: &mut Document,
    naming: OutputNaming,
) -> ToolkitResult<PdfOutput> {
    let bytes = codec::save(document)?;
    let filename = format!("{}.pdf", source.derived_name(naming.fallback, naming.suffix));
    Ok(PdfOutput {
        filename,
        mime_type: PDF_MIME_TYPE,
        bytes,
    })
}
