//! Validation of explicit page orderings.

use std::collections::HashSet;

use crate::error::SelectionError;

use super::PageOrder;
use super::range::check_bounds;

/// Validate a caller-supplied page order against a document's page count.
///
/// The order may omit pages (the result is then shorter than the source) but
/// must not repeat any: a repeat in an explicit ordering is a caller mistake.
pub fn validate_page_order(order: &[i64], page_count: usize) -> Result<PageOrder, SelectionError> {
    if order.is_empty() {
        return Err(SelectionError::EmptySelection);
    }

    let mut seen = HashSet::with_capacity(order.len());
    let mut pages = Vec::with_capacity(order.len());
    for &page in order {
        let page = check_bounds(page, page_count, &page.to_string())?;
        if !seen.insert(page) {
            return Err(SelectionError::DuplicatePage {
                page: i64::from(page),
            });
        }
        pages.push(page);
    }

    Ok(PageOrder(pages))
}
