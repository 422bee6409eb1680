pub mod login_limiter;
