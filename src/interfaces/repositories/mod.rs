pub mod achievement;
pub mod admin;
pub mod content;
pub mod filter_category;
pub mod project;
pub mod sqlx_repo;
pub mod testimonial;
pub mod token;
