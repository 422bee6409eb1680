pub mod collection_cache;

use std::{sync::Arc, time::Duration};

pub use collection_cache::CollectionCache;

use crate::entities::{
    achievement::Achievement,
    content::SiteContent,
    filter_category::FilterCategory,
    project::Project,
    site_settings::SiteSettings,
    testimonial::Testimonial,
};

/// Caches behind the public read endpoints. Each holds published rows only.
#[derive(Clone)]
pub struct PublicCaches {
    pub projects: Arc<CollectionCache<Vec<Project>>>,
    pub filters: Arc<CollectionCache<Vec<FilterCategory>>>,
    pub achievements: Arc<CollectionCache<Vec<Achievement>>>,
    pub testimonials: Arc<CollectionCache<Vec<Testimonial>>>,
    pub content: Arc<CollectionCache<SiteContent>>,
    pub settings: Arc<CollectionCache<SiteSettings>>,
}

impl PublicCaches {
    pub fn new(ttl: Duration) -> Self {
        PublicCaches {
            projects: Arc::new(CollectionCache::new("projects", ttl)),
            filters: Arc::new(CollectionCache::new("filters", ttl)),
            achievements: Arc::new(CollectionCache::new("achievements", ttl)),
            testimonials: Arc::new(CollectionCache::new("testimonials", ttl)),
            content: Arc::new(CollectionCache::new("content", ttl)),
            settings: Arc::new(CollectionCache::new("settings", ttl)),
        }
    }

    /// Drops expired entries; returns how many were dropped.
    pub fn evict_expired(&self) -> usize {
        [
            self.projects.evict_expired(),
            self.filters.evict_expired(),
            self.achievements.evict_expired(),
            self.testimonials.evict_expired(),
            self.content.evict_expired(),
            self.settings.evict_expired(),
        ]
        .into_iter()
        .filter(|dropped| *dropped)
        .count()
    }
}
