pub mod auth;
pub mod cache;
pub mod db;
pub mod limiter;
pub mod storage;
pub mod utils;
