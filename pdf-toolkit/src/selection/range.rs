//! Print-dialog style page range parsing.

use tracing::debug;

use crate::error::SelectionError;

use super::PageSet;

/// Parse a range such as `"3-6,8, 12-14"` into the set of pages it selects.
///
/// Tokens are separated by `,` and trimmed. A token is either a single page
/// number or a `start-end` pair split at its first `-`. Every page must lie in
/// `1..=page_count`. Overlapping tokens are merged silently.
pub fn parse_page_range(range: &str, page_count: usize) -> Result<PageSet, SelectionError> {
    if range.trim().is_empty() {
        return Err(SelectionError::MalformedRange {
            segment: range.to_string(),
            reason: "range must not be blank",
            source: None,
        });
    }

    let mut pages = PageSet::default();

    for part in range.split(',') {
        let token = part.trim();
        if token.is_empty() {
            return Err(SelectionError::MalformedRange {
                segment: range.to_string(),
                reason: "empty token",
                source: None,
            });
        }

        match token.split_once('-') {
            None => {
                let page = parse_number(token, token)?;
                pages.insert(check_bounds(page, page_count, token)?);
            }
            Some((start, end)) => {
                let (start, end) = (start.trim(), end.trim());
                if start.is_empty() || end.is_empty() {
                    return Err(SelectionError::MalformedRange {
                        segment: token.to_string(),
                        reason: "range needs both a start and an end page",
                        source: None,
                    });
                }

                let start = parse_number(start, token)?;
                let end = parse_number(end, token)?;
                if start > end {
                    return Err(SelectionError::MalformedRange {
                        segment: token.to_string(),
                        reason: "start page is greater than end page",
                        source: None,
                    });
                }

                let start = check_bounds(start, page_count, token)?;
                let end = check_bounds(end, page_count, token)?;
                for page in start..=end {
                    pages.insert(page);
                }
            }
        }
    }

    // Bounds checking above makes this unreachable for non-blank input
    if pages.is_empty() {
        return Err(SelectionError::EmptyRange {
            range: range.to_string(),
        });
    }

    debug!(range, selected = pages.len(), page_count, "Parsed page range");
    Ok(pages)
}

fn parse_number(text: &str, segment: &str) -> Result<i64, SelectionError> {
    text.parse::<i64>()
        .map_err(|e| SelectionError::MalformedRange {
            segment: segment.to_string(),
            reason: "invalid page number",
            source: Some(e),
        })
}

/// Validate a 1-based page number against the document's page count.
pub(crate) fn check_bounds(
    page: i64,
    page_count: usize,
    segment: &str,
) -> Result<u32, SelectionError> {
    if page < 1 || page > page_count as i64 {
        return Err(SelectionError::PageOutOfRange {
            page,
            page_count,
            segment: segment.to_string(),
        });
    }
    Ok(page as u32)
}
