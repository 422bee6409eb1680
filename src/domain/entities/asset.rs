use std::borrow::Cow;

use validator::ValidationError;

/// Top-level folders uploads are stored under.
pub const ASSET_FOLDERS: [&str; 2] = ["images", "models"];

/// Entities whose fields point at uploaded files or external links.
pub trait HasAssets {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String));
}

/// `images/<file>` or `models/<file>` with a plain file name.
pub fn is_storage_path(value: &str) -> bool {
    let Some((folder, file)) = value.split_once('/') else {
        return false;
    };
    ASSET_FOLDERS.contains(&folder)
        && !file.is_empty()
        && file.len() <= 128
        && !file.starts_with('.')
        && file.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some())
        .unwrap_or(false)
}

/// Accepts an absolute http(s) URL or a storage path.
pub fn validate_asset_ref(value: &str) -> Result<(), ValidationError> {
    if is_http_url(value) || is_storage_path(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_asset");
        err.message = Some(Cow::Borrowed("Must be an http(s) URL or an uploaded file path"));
        Err(err)
    }
}

pub fn validate_asset_refs(values: &[String]) -> Result<(), ValidationError> {
    values.iter().try_for_each(|value| validate_asset_ref(value))
}

/// Accepts an absolute http(s) URL only.
pub fn validate_link(value: &str) -> Result<(), ValidationError> {
    if is_http_url(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_url");
        err.message = Some(Cow::Borrowed("URL must start with http:// or https://"));
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_paths() {
        assert!(is_storage_path("images/6a4c0c0e-1f7e-4a55-9d0b-2f1c3e5b7a90.png"));
        assert!(is_storage_path("models/bracket.stl"));
        assert!(!is_storage_path("images/../secret.txt"));
        assert!(!is_storage_path("images/a/b.png"));
        assert!(!is_storage_path("/images/a.png"));
        assert!(!is_storage_path("docs/a.png"));
        assert!(!is_storage_path("images/.env"));
    }

    #[test]
    fn asset_refs() {
        assert!(validate_asset_ref("https://cdn.example.com/a.jpg").is_ok());
        assert!(validate_asset_ref("models/part.3mf").is_ok());
        assert!(validate_asset_ref("ftp://example.com/a.jpg").is_err());
        assert!(validate_asset_ref("javascript:alert(1)").is_err());
        assert!(validate_link("images/a.png").is_err());
    }
}
