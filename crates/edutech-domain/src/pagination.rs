//! Page cursor for the identity listing endpoint.

use serde::{Deserialize, Serialize};

/// Page size used when scanning the identity listing.
pub const IDENTITY_PAGE_SIZE: u32 = 1000;

/// One page of a 1-based paged listing.
///
/// - `page`: ≥ 1
/// - `per_page`: ≥ 1, default [`IDENTITY_PAGE_SIZE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(IDENTITY_PAGE_SIZE)
    }
}

impl PageRequest {
    /// The first page with the given size (clamped to at least 1).
    pub fn first(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// The page following this one.
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }

    /// A page holding fewer entries than `per_page` is the final one.
    pub fn is_last(self, returned: usize) -> bool {
        returned < self.per_page as usize
    }
}
