pub mod entities;
pub mod listing;
pub mod password;
pub mod use_cases;
