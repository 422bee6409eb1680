use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Header carrying the admin session token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Cache-busting query parameter; accepted everywhere and ignored.
pub const CACHE_BUST_PARAM: &str = "_t";
