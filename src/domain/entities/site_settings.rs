use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::AppError, listing::SortMode};

#[derive(Debug, sqlx::FromRow)]
pub struct SiteSettingsRow {
    pub web_default_sort_order: String,
    pub admin_default_sort_order: String,
    pub updated_at: DateTime<Utc>,
}

/// Default sort modes for the public listing and the admin screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default)]
    pub web_default_sort_order: SortMode,
    #[serde(default)]
    pub admin_default_sort_order: SortMode,
}

impl TryFrom<SiteSettingsRow> for SiteSettings {
    type Error = AppError;

    fn try_from(row: SiteSettingsRow) -> Result<Self, Self::Error> {
        Ok(SiteSettings {
            web_default_sort_order: row.web_default_sort_order.parse()?,
            admin_default_sort_order: row.admin_default_sort_order.parse()?,
        })
    }
}

impl SiteSettings {
    /// An explicit request wins over the stored default.
    pub fn web_sort(&self, requested: Option<SortMode>) -> SortMode {
        requested.unwrap_or(self.web_default_sort_order)
    }

    pub fn admin_sort(&self, requested: Option<SortMode>) -> SortMode {
        requested.unwrap_or(self.admin_default_sort_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_empty_string_means_manual_order() {
        let row = SiteSettingsRow {
            web_default_sort_order: "".into(),
            admin_default_sort_order: "date-newest".into(),
            updated_at: Utc::now(),
        };
        let settings = SiteSettings::try_from(row).unwrap();
        assert_eq!(settings.web_default_sort_order, SortMode::None);
        assert_eq!(settings.admin_sort(None), SortMode::DateNewest);
        assert_eq!(settings.admin_sort(Some(SortMode::AlphabeticallyAz)), SortMode::AlphabeticallyAz);
    }

    #[test]
    fn accepts_partial_payload() {
        let settings: SiteSettings = serde_json::from_str(r#"{"webDefaultSortOrder":"difficulty-hard"}"#).unwrap();
        assert_eq!(settings.web_default_sort_order, SortMode::DifficultyHard);
        assert_eq!(settings.admin_default_sort_order, SortMode::None);
    }
}
