pub mod achievements;
pub mod auth;
pub mod content;
pub mod dashboard;
pub mod extractors;
pub mod filters;
pub mod projects;
pub mod testimonials;
