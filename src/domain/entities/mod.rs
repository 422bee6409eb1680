pub mod achievement;
pub mod admin;
pub mod asset;
pub mod content;
pub mod filter_category;
pub mod project;
pub mod site_settings;
pub mod testimonial;
pub mod token;
pub mod upload;
