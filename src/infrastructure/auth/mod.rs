pub mod jwt;
pub mod password;
pub mod reset_tokens;
pub mod revocation;
