//! Page slicing over id-ordered listings.

/// Page size used when nothing else is configured.
pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    per_page: usize,
}

impl Pagination {
    /// A zero page size is bumped to one.
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    /// Returns the `page`-th slice (1-indexed) of `items`.
    ///
    /// Pages below 1 and pages past the end come back empty, callers decide
    /// whether that is an error.
    pub fn paginate<T>(&self, items: Vec<T>, page: i64) -> Vec<T> {
        let start = page
            .checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| index.checked_mul(self.per_page));
        match start {
            Some(start) if start < items.len() => {
                items.into_iter().skip(start).take(self.per_page).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(QUESTIONS_PER_PAGE)
    }
}
