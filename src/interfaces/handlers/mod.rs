pub mod achievements;
pub mod auth;
pub mod content;
pub mod dashboard;
pub mod filters;
pub mod home;
pub mod projects;
pub mod system;
pub mod testimonials;
pub mod uploads;
