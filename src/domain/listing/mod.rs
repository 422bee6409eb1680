//! Project listing derivation.
//!
//! The public projects page and the admin reorder screen both run the same
//! pipeline over a fetched collection: [`filter::filter_items`] narrows it by
//! the visitor's filter selection, then [`sort::sort_items`] orders it. Both
//! steps are pure and keep the caller's list untouched.

pub mod collation;
pub mod featured;
pub mod filter;
pub mod reorder;
pub mod sort;

pub use featured::{FeaturedDecision, FeaturedToggle, MAX_FEATURED};
pub use filter::filter_items;
pub use reorder::{ReorderOutcome, SortAssignment};
pub use sort::{sort_items, SortMode};

/// What the listing pipeline reads from an entry.
pub trait ListingItem {
    /// Filter option ids the entry is tagged with.
    fn filter_ids(&self) -> &[String];

    /// Numeric `YYYYMM` date used for chronological ordering.
    fn date_value(&self) -> i32;

    /// Difficulty rank, 1 (easiest) to 3 (hardest).
    fn difficulty_rank(&self) -> u8;

    fn title(&self) -> &str;

    fn sort_order(&self) -> Option<i32>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ListingItem;

    #[derive(Debug, Clone, PartialEq)]
    pub struct Item {
        pub id: &'static str,
        pub filters: Vec<String>,
        pub date_value: i32,
        pub difficulty: u8,
        pub title: String,
        pub sort_order: Option<i32>,
    }

    impl Item {
        pub fn new(id: &'static str) -> Self {
            Item {
                id,
                filters: Vec::new(),
                date_value: 202401,
                difficulty: 1,
                title: id.to_string(),
                sort_order: None,
            }
        }

        pub fn filters(mut self, filters: &[&str]) -> Self {
            self.filters = filters.iter().map(|f| f.to_string()).collect();
            self
        }

        pub fn dated(mut self, date_value: i32) -> Self {
            self.date_value = date_value;
            self
        }

        pub fn difficulty(mut self, rank: u8) -> Self {
            self.difficulty = rank;
            self
        }

        pub fn titled(mut self, title: &str) -> Self {
            self.title = title.to_string();
            self
        }

        pub fn ordered(mut self, sort_order: i32) -> Self {
            self.sort_order = Some(sort_order);
            self
        }
    }

    impl ListingItem for Item {
        fn filter_ids(&self) -> &[String] {
            &self.filters
        }

        fn date_value(&self) -> i32 {
            self.date_value
        }

        fn difficulty_rank(&self) -> u8 {
            self.difficulty
        }

        fn title(&self) -> &str {
            &self.title
        }

        fn sort_order(&self) -> Option<i32> {
            self.sort_order
        }
    }

    pub fn ids(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.id).collect()
    }
}
