//! Shared types for the repository traits.

use serde::{Deserialize, Serialize};
use surgisched_core::RoomStatus;

/// One page of a list query, echoing the pagination inputs back to the
/// caller alongside the overall match count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    #[must_use]
    pub fn empty(limit: usize, offset: usize) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit,
            offset,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Filter for room listing. Empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RoomStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

impl RoomFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_room_type(mut self, room_type: impl Into<String>) -> Self {
        self.room_type = Some(room_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_accessors() {
        let page = Page::new(vec![1, 2, 3], 10, 3, 0);
        assert_eq!(page.len(), 3);
        assert_eq!(page.total, 10);
        assert!(!page.is_empty());

        let empty: Page<i32> = Page::empty(20, 40);
        assert!(empty.is_empty());
        assert_eq!(empty.limit, 20);
        assert_eq!(empty.offset, 40);
    }

    #[test]
    fn test_room_filter_builder() {
        let filter = RoomFilter::new()
            .with_status(RoomStatus::Active)
            .with_room_type("operating-theatre");
        assert_eq!(filter.status, Some(RoomStatus::Active));
        assert_eq!(filter.room_type.as_deref(), Some("operating-theatre"));
    }
}
