use std::cmp::Ordering;

use crate::entry::IndexedEntry;

/// Case-insensitive name comparison without allocating.
pub fn cmp_names(a: &str, b: &str) -> Ordering {
    let la = a.chars().flat_map(char::to_lowercase);
    let lb = b.chars().flat_map(char::to_lowercase);
    la.cmp(lb)
}

/// Directories first, then case-insensitive name order.
pub fn compare(a: &IndexedEntry, b: &IndexedEntry) -> Ordering {
    if a.is_dir() != b.is_dir() {
        return b.is_dir().cmp(&a.is_dir());
    }
    cmp_names(&a.name, &b.name)
}

/// Stable sort; names equal up to case keep their enumeration order.
pub fn sort_entries(entries: &mut [IndexedEntry]) {
    entries.sort_by(compare);
}
