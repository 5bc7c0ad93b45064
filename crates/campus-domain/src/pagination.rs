//! Pagination types shared by every multi-record listing.

use serde::{Deserialize, Serialize};

/// Pagination parameters shared across all list endpoints.
///
/// - `page_size`: 1–100, default 25
/// - `page_index`: zero-based, default 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page_size", rename = "page-size")]
    pub page_size: u32,
    #[serde(default, rename = "page-index")]
    pub page_index: u32,
}

fn default_page_size() -> u32 {
    25
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_index: 0,
        }
    }
}

impl PageQuery {
    /// Clamp `page_size` to the valid range 1–100.
    ///
    /// Call after deserializing from query params so the engine's
    /// `page_size > 0` precondition always holds. Any `page_index` is
    /// valid; pages past the end come back empty.
    pub fn clamped(self) -> Self {
        Self {
            page_size: self.page_size.clamp(1, 100),
            page_index: self.page_index,
        }
    }
}

/// One page of an ordered result set plus count metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_size: u32,
    pub page_index: u32,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Slice `items` down to the requested page.
    ///
    /// `total_count` is the length of the full sequence before slicing;
    /// callers that filter must filter first so the count reflects the
    /// filtered set. A page index past the end yields an empty page with
    /// the metadata intact.
    pub fn compute(items: Vec<T>, query: PageQuery) -> Self {
        let query = query.clamped();
        let total_count = items.len() as u64;
        let page_size = query.page_size as u64;
        let total_pages = total_count.div_ceil(page_size);
        let offset = query.page_index as u64 * page_size;

        let items: Vec<T> = if offset >= total_count {
            Vec::new()
        } else {
            items
                .into_iter()
                .skip(offset as usize)
                .take(query.page_size as usize)
                .collect()
        };

        Self {
            items,
            total_count,
            page_size: query.page_size,
            page_index: query.page_index,
            total_pages,
        }
    }
}
