use std::{borrow::Cow, collections::HashSet};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::content::{localized, Language};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_NAME_LENGTH: u64 = 80;
const MAX_OPTIONS: usize = 50;

static FILTER_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]{0,63}$").expect("valid filter id pattern"));

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFilterOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_cs: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct FilterCategoryRow {
    pub id: String,
    pub name: String,
    pub name_cs: Option<String>,
    pub sort_order: i32,
    pub options: Json<Vec<StoredFilterOption>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── API Models ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOption {
    pub id: String,
    pub label: String,
    pub label_cs: String,
}

impl FilterOption {
    pub fn label_in(&self, lang: Language) -> &str {
        localized(lang, &self.label, &self.label_cs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCategory {
    pub id: String,
    pub name: String,
    pub name_cs: String,
    pub sort_order: i32,
    pub options: Vec<FilterOption>,
}

impl FilterCategory {
    pub fn option_ids(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.id.as_str())
    }

    pub fn name_in(&self, lang: Language) -> &str {
        localized(lang, &self.name, &self.name_cs)
    }
}

impl From<FilterCategoryRow> for FilterCategory {
    fn from(row: FilterCategoryRow) -> Self {
        let name_cs = row.name_cs.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| row.name.clone());
        FilterCategory {
            id: row.id,
            name: row.name,
            name_cs,
            sort_order: row.sort_order,
            options: row
                .options
                .0
                .into_iter()
                .map(|option| FilterOption {
                    label_cs: option
                        .label_cs
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| option.label.clone()),
                    id: option.id,
                    label: option.label,
                })
                .collect(),
        }
    }
}

/// Answer to a category write or delete. Projects that still point at a
/// removed option are counted, not rewritten.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCategoryChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FilterCategory>,
    pub removed_option_ids: Vec<String>,
    pub orphaned_projects: i64,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptionInput {
    #[validate(custom(function = "validate_filter_id"))]
    pub id: Option<String>,

    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Label must be 1-80 characters"))]
    pub label: String,

    #[validate(length(max = MAX_NAME_LENGTH))]
    pub label_cs: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilterCategoryInput {
    #[validate(length(min = 1, max = MAX_NAME_LENGTH, message = "Name must be 1-80 characters"))]
    pub name: String,

    #[validate(length(max = MAX_NAME_LENGTH))]
    pub name_cs: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[validate(nested)]
    #[serde(default)]
    pub options: Vec<FilterOptionInput>,
}

/// A validated category ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCategoryInsert {
    pub id: String,
    pub name: String,
    pub name_cs: Option<String>,
    pub sort_order: i32,
    pub options: Vec<StoredFilterOption>,
}

impl FilterCategoryInput {
    /// Validates the payload, derives missing option ids from the English
    /// label and checks they are unique inside the category.
    pub fn into_insert(self, id: &str) -> Result<FilterCategoryInsert, ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_filter_id(id) {
            errors.add("id", e);
        }
        if self.options.len() > MAX_OPTIONS {
            errors.add("options", new_validation_error("too_many_options", "A category holds at most 50 options"));
        }

        let mut seen = HashSet::new();
        let mut options = Vec::with_capacity(self.options.len());
        for option in self.options {
            let option_id = match option.id.filter(|s| !s.trim().is_empty()) {
                Some(id) => id,
                None => slug::slugify(&option.label),
            };
            if validate_filter_id(&option_id).is_err() {
                errors.add("options", new_validation_error("option_id_invalid", "Option label does not produce a usable id"));
                continue;
            }
            if !seen.insert(option_id.clone()) {
                errors.add("options", new_validation_error("option_id_duplicate", "Option ids must be unique within a category"));
                continue;
            }
            options.push(StoredFilterOption {
                id: option_id,
                label: option.label.trim().to_string(),
                label_cs: blank_to_none(option.label_cs),
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(FilterCategoryInsert {
            id: id.to_string(),
            name: self.name.trim().to_string(),
            name_cs: blank_to_none(self.name_cs),
            sort_order: self.sort_order,
            options,
        })
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_filter_id(id: &str) -> Result<(), ValidationError> {
    if FILTER_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(new_validation_error(
            "filter_id_invalid",
            "Ids may contain letters, digits, '-' and '_' (max 64)",
        ))
    }
}

pub fn validate_filter_ids(ids: &[String]) -> Result<(), ValidationError> {
    ids.iter().try_for_each(|id| validate_filter_id(id))
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub(crate) fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: Option<&str>, label: &str) -> FilterOptionInput {
        FilterOptionInput { id: id.map(str::to_string), label: label.to_string(), label_cs: None }
    }

    fn input(options: Vec<FilterOptionInput>) -> FilterCategoryInput {
        FilterCategoryInput {
            name: "Materials".into(),
            name_cs: Some("Materiály".into()),
            sort_order: 1,
            options,
        }
    }

    #[test]
    fn missing_option_ids_are_slugified_from_label() {
        let insert = input(vec![option(None, "Carbon Fiber PETG"), option(Some("PLA"), "PLA")])
            .into_insert("materials")
            .unwrap();
        let ids: Vec<&str> = insert.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["carbon-fiber-petg", "PLA"]);
    }

    #[test]
    fn duplicate_option_ids_are_rejected() {
        let result = input(vec![option(None, "Resin"), option(Some("resin"), "Resin 2")]).into_insert("materials");
        let errors = result.unwrap_err();
        assert!(errors.field_errors().contains_key("options"));
    }

    #[test]
    fn category_id_must_be_usable() {
        let errors = input(vec![]).into_insert("bad id!").unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
    }

    #[test]
    fn czech_falls_back_to_english_on_read() {
        let row = FilterCategoryRow {
            id: "tech".into(),
            name: "Technology".into(),
            name_cs: Some(" ".into()),
            sort_order: 0,
            options: Json(vec![StoredFilterOption { id: "FDM".into(), label: "FDM".into(), label_cs: None }]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let category = FilterCategory::from(row);
        assert_eq!(category.name_in(Language::Cs), "Technology");
        assert_eq!(category.options[0].label_cs, "FDM");
    }
}
