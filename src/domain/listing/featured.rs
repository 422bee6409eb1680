/// Most entries of one kind that may sit on the homepage at once.
pub const MAX_FEATURED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturedDecision {
    Apply,
    Unchanged,
    CapReached,
}

/// Decides a featured toggle from the number of *other* featured entries.
/// Unfeaturing is always allowed.
pub fn decide_featured_toggle(featured_others: usize, currently: bool, requested: bool) -> FeaturedDecision {
    if currently == requested {
        FeaturedDecision::Unchanged
    } else if !requested {
        FeaturedDecision::Apply
    } else if featured_others >= MAX_FEATURED {
        FeaturedDecision::CapReached
    } else {
        FeaturedDecision::Apply
    }
}

/// Result of a capped featured update in a store.
#[derive(Debug, Clone, PartialEq)]
pub enum FeaturedToggle<T> {
    Updated(T),
    CapReached { featured: usize },
}
