//! Generic list/history page shape shared by `List` and `History` (§4.1,
//! §4.4). Kept index-agnostic per the Design Note in §9: the store is free
//! to switch from scans to secondary indexes without changing this shape.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Builds a page from a store fetch of `limit + 1` items: if more than
    /// `limit` rows came back, the extra one is dropped and `hasMore` is set.
    pub fn from_overfetch(mut items: Vec<T>, limit: usize) -> Self {
        let has_more = items.len() > limit;
        if has_more {
            items.truncate(limit);
        }
        Page { items, has_more }
    }
}
