use std::cmp::Ordering;

use crate::natural;

use super::model::{BrowseEntry, SortMode};

/// Order a listing in place: directories first, then by `mode`.
///
/// The sort is stable, so entries that compare equal keep their listing order.
pub fn sort_listing(entries: &mut [BrowseEntry], mode: SortMode) {
    entries.sort_by(|a, b| {
        match (a.is_dir(), b.is_dir()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match mode {
            SortMode::NameAsc => natural::compare(&a.name, &b.name),
            SortMode::NameDesc => natural::compare(&b.name, &a.name),
            SortMode::DateAsc => a.meta.last_modified_ms.cmp(&b.meta.last_modified_ms),
            SortMode::DateDesc => b.meta.last_modified_ms.cmp(&a.meta.last_modified_ms),
        }
    });
}
