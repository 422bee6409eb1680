use std::{cmp::{Ordering, Reverse}, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::{collation, ListingItem};

/// Orderings offered on the projects page and the admin reorder screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Manual `sortOrder`, then fetch order.
    #[default]
    None,
    DateNewest,
    DateOldest,
    DifficultyEasy,
    DifficultyHard,
    AlphabeticallyAz,
    AlphabeticallyZa,
}

impl SortMode {
    pub const ALL: [SortMode; 7] = [
        SortMode::None,
        SortMode::DateNewest,
        SortMode::DateOldest,
        SortMode::DifficultyEasy,
        SortMode::DifficultyHard,
        SortMode::AlphabeticallyAz,
        SortMode::AlphabeticallyZa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::None => "none",
            SortMode::DateNewest => "date-newest",
            SortMode::DateOldest => "date-oldest",
            SortMode::DifficultyEasy => "difficulty-easy",
            SortMode::DifficultyHard => "difficulty-hard",
            SortMode::AlphabeticallyAz => "alphabetically-az",
            SortMode::AlphabeticallyZa => "alphabetically-za",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The admin panel historically stored an empty string for "no sort".
        if s.trim().is_empty() {
            return Ok(SortMode::None);
        }
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown sort mode '{}'", s)))
    }
}

fn compare_manual(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Comparator for every mode except the alphabetical ones, which go
/// through cached collation keys in [`sort_items`].
pub fn compare<T: ListingItem>(a: &T, b: &T, mode: SortMode) -> Ordering {
    match mode {
        SortMode::None => compare_manual(a.sort_order(), b.sort_order()),
        SortMode::DateNewest => b.date_value().cmp(&a.date_value()),
        SortMode::DateOldest => a.date_value().cmp(&b.date_value()),
        SortMode::DifficultyEasy => a.difficulty_rank().cmp(&b.difficulty_rank()),
        SortMode::DifficultyHard => b.difficulty_rank().cmp(&a.difficulty_rank()),
        SortMode::AlphabeticallyAz => collation::compare(a.title(), b.title()),
        SortMode::AlphabeticallyZa => collation::compare(b.title(), a.title()),
    }
}

/// Returns a new, stably sorted list. Ties keep their input order.
pub fn sort_items<T: ListingItem + Clone>(items: &[T], mode: SortMode) -> Vec<T> {
    let mut sorted = items.to_vec();
    match mode {
        SortMode::AlphabeticallyAz => {
            sorted.sort_by_cached_key(|item| collation::collation_key(item.title()));
        }
        SortMode::AlphabeticallyZa => {
            sorted.sort_by_cached_key(|item| Reverse(collation::collation_key(item.title())));
        }
        _ => sorted.sort_by(|a, b| compare(a, b, mode)),
    }
    sorted
}
