//! Page selections.
//!
//! Two shapes of selection exist because the operations built on them have
//! different ordering rules:
//! - [`PageSet`] is parsed from a print-dialog style range (`"2-4,8"`) and is
//!   always ascending and duplicate-free. Extraction and removal use it.
//! - [`PageOrder`] is an explicit caller sequence. Reordering uses it and keeps
//!   the caller's order exactly.

mod order;
mod range;

use std::collections::BTreeSet;

pub use order::validate_page_order;
pub(crate) use range::check_bounds;
pub use range::parse_page_range;

/// Ascending, duplicate-free set of 1-based page numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSet(BTreeSet<u32>);

impl PageSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.0.contains(&page)
    }

    /// Pages in ascending order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Pages of a `page_count` document that are not in this set, ascending
    pub fn complement(&self, page_count: usize) -> Vec<u32> {
        (1..=page_count as u32)
            .filter(|page| !self.0.contains(page))
            .collect()
    }

    pub(crate) fn insert(&mut self, page: u32) -> bool {
        self.0.insert(page)
    }
}

/// Caller-ordered sequence of distinct 1-based page numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrder(Vec<u32>);

impl PageOrder {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}
