use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        asset::{validate_asset_ref, validate_asset_refs, HasAssets},
        content::{localized, Language},
        filter_category::{blank_to_none, new_validation_error, validate_filter_ids},
    },
    errors::AppError,
    listing::ListingItem,
    utils::markdown::safe_markdown_to_html,
};

// ───── Constants ──────────────────────────────────────────────────────
const MAX_TITLE_LENGTH: u64 = 200;
const MAX_DESCRIPTION_LENGTH: u64 = 1_000;
const MAX_FULL_DESCRIPTION_LENGTH: u64 = 50_000;
const MAX_IMAGES: u64 = 30;
const MAX_TAGS: usize = 20;
const MAX_TAG_LENGTH: usize = 40;

// ───── Enumerations ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrintingTechnology {
    #[serde(rename = "FDM")]
    Fdm,
    #[serde(rename = "SLA")]
    Sla,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignSource {
    #[serde(rename = "My Design")]
    MyDesign,
    #[serde(rename = "Downloaded Model")]
    DownloadedModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn rank(&self) -> u8 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Advanced => 3,
        }
    }
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(AppError::InternalError(format!(
                        "Unexpected {} value '{}'",
                        stringify!($ty),
                        other
                    ))),
                }
            }
        }
    };
}

text_enum!(PrintingTechnology {
    Fdm => "FDM",
    Sla => "SLA",
});

text_enum!(DesignSource {
    MyDesign => "My Design",
    DownloadedModel => "Downloaded Model",
});

text_enum!(Difficulty {
    Beginner => "Beginner",
    Intermediate => "Intermediate",
    Advanced => "Advanced",
});

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub title_cs: Option<String>,
    pub description: String,
    pub description_cs: Option<String>,
    pub full_description: String,
    pub full_description_cs: Option<String>,
    pub project_category: Vec<String>,
    pub material: String,
    pub printing_technology: String,
    pub design_source: String,
    pub difficulty: String,
    pub date_label: String,
    pub date_value: i32,
    pub images: Vec<String>,
    pub thumbnail_image: Option<String>,
    pub model_url: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub sort_order: Option<i32>,
    pub filters: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── API Models ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub title_cs: String,
    pub description: String,
    pub description_cs: String,
    pub full_description: String,
    pub full_description_cs: String,
    pub project_category: Vec<String>,
    pub material: String,
    pub printing_technology: PrintingTechnology,
    pub design_source: DesignSource,
    pub difficulty: Difficulty,
    pub date: String,
    pub date_value: i32,
    pub images: Vec<String>,
    pub thumbnail_image: Option<String>,
    pub model_url: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub sort_order: Option<i32>,
    pub filters: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub full_description_html: String,
    pub full_description_cs_html: String,
}

fn or_english(czech: Option<String>, english: &str) -> String {
    czech
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| english.to_string())
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        // A thumbnail removed from the gallery is reported as unset.
        let thumbnail_image = row.thumbnail_image.filter(|thumb| row.images.contains(thumb));

        Ok(Project {
            title_cs: or_english(row.title_cs, &row.title),
            description_cs: or_english(row.description_cs, &row.description),
            full_description_cs: or_english(row.full_description_cs, &row.full_description),
            printing_technology: row.printing_technology.parse()?,
            design_source: row.design_source.parse()?,
            difficulty: row.difficulty.parse()?,
            id: row.id,
            title: row.title,
            description: row.description,
            full_description: row.full_description,
            project_category: row.project_category,
            material: row.material,
            date: row.date_label,
            date_value: row.date_value,
            images: row.images,
            thumbnail_image,
            model_url: row.model_url,
            published: row.published,
            featured: row.featured,
            sort_order: row.sort_order,
            filters: row.filters,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Project {
    pub fn title_in(&self, lang: Language) -> &str {
        localized(lang, &self.title, &self.title_cs)
    }

    pub fn into_detail(self) -> ProjectDetail {
        ProjectDetail {
            full_description_html: safe_markdown_to_html(&self.full_description),
            full_description_cs_html: safe_markdown_to_html(&self.full_description_cs),
            project: self,
        }
    }
}

impl ListingItem for Project {
    fn filter_ids(&self) -> &[String] {
        &self.filters
    }

    fn date_value(&self) -> i32 {
        self.date_value
    }

    fn difficulty_rank(&self) -> u8 {
        self.difficulty.rank()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn sort_order(&self) -> Option<i32> {
        self.sort_order
    }
}

/// A project listed in one language; alphabetical modes compare the title
/// the visitor actually sees.
#[derive(Debug, Clone)]
pub struct LocalizedProject {
    pub project: Project,
    pub lang: Language,
}

impl ListingItem for LocalizedProject {
    fn filter_ids(&self) -> &[String] {
        &self.project.filters
    }

    fn date_value(&self) -> i32 {
        self.project.date_value
    }

    fn difficulty_rank(&self) -> u8 {
        self.project.difficulty.rank()
    }

    fn title(&self) -> &str {
        self.project.title_in(self.lang)
    }

    fn sort_order(&self) -> Option<i32> {
        self.project.sort_order
    }
}

impl HasAssets for Project {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String)) {
        self.images.iter_mut().for_each(&mut *f);
        if let Some(thumb) = self.thumbnail_image.as_mut() {
            f(thumb);
        }
        if let Some(model) = self.model_url.as_mut() {
            f(model);
        }
    }
}

// ───── Input & Validation Requests ──────────────────────────────────

fn default_published() -> bool {
    true
}

/// Full-object write from the admin project form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_thumbnail_in_images"))]
pub struct ProjectInput {
    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH, message = "Title must be 1-200 characters"),
        custom(function = "validate_not_blank")
    )]
    pub title: String,

    #[validate(length(max = MAX_TITLE_LENGTH))]
    pub title_cs: Option<String>,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    #[serde(default)]
    pub description: String,

    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description_cs: Option<String>,

    #[validate(length(max = MAX_FULL_DESCRIPTION_LENGTH))]
    #[serde(default)]
    pub full_description: String,

    #[validate(length(max = MAX_FULL_DESCRIPTION_LENGTH))]
    pub full_description_cs: Option<String>,

    #[validate(custom(function = "validate_tags"))]
    #[serde(default)]
    pub project_category: Vec<String>,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub material: String,

    pub printing_technology: PrintingTechnology,
    pub design_source: DesignSource,
    pub difficulty: Difficulty,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub date: String,

    #[validate(custom(function = "validate_date_value"))]
    pub date_value: i32,

    #[validate(length(max = MAX_IMAGES, message = "Too many images"), custom(function = "validate_asset_refs"))]
    #[serde(default)]
    pub images: Vec<String>,

    #[validate(custom(function = "validate_asset_ref"))]
    pub thumbnail_image: Option<String>,

    #[validate(custom(function = "validate_asset_ref"))]
    pub model_url: Option<String>,

    #[serde(default = "default_published")]
    pub published: bool,

    pub sort_order: Option<i32>,

    #[validate(custom(function = "validate_filter_ids"))]
    #[serde(default)]
    pub filters: Vec<String>,
}

impl ProjectInput {
    /// Trims text, drops blank optionals and duplicate tags.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.title_cs = blank_to_none(self.title_cs);
        self.description_cs = blank_to_none(self.description_cs);
        self.full_description_cs = blank_to_none(self.full_description_cs);
        self.thumbnail_image = blank_to_none(self.thumbnail_image);
        self.model_url = blank_to_none(self.model_url);
        if self.date.trim().is_empty() {
            self.date = format_date_value(self.date_value);
        }
        dedup_in_place(&mut self.project_category);
        dedup_in_place(&mut self.filters);
        self
    }
}

impl HasAssets for ProjectInput {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String)) {
        self.images.iter_mut().for_each(&mut *f);
        if let Some(thumb) = self.thumbnail_image.as_mut() {
            f(thumb);
        }
        if let Some(model) = self.model_url.as_mut() {
            f(model);
        }
    }
}

fn dedup_in_place(values: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    values.retain(|value| seen.insert(value.clone()));
}

/// `202503` becomes `"03/2025"`.
pub fn format_date_value(date_value: i32) -> String {
    format!("{:02}/{}", date_value % 100, date_value / 100)
}

/// Toggle body for `/published` and `/featured` endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub value: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<Uuid>,
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(new_validation_error("blank", "Must not be blank"));
    }
    Ok(())
}

pub fn validate_date_value(value: i32) -> Result<(), ValidationError> {
    let year = value / 100;
    let month = value % 100;
    if !(1900..=2999).contains(&year) || !(1..=12).contains(&month) {
        return Err(new_validation_error("date_value_invalid", "Date must be a YYYYMM number"));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(new_validation_error("too_many_tags", "Too many categories provided"));
    }
    if tags.iter().any(|tag| tag.trim().is_empty() || tag.chars().count() > MAX_TAG_LENGTH) {
        return Err(new_validation_error("invalid_tag_length", "Category length must be within allowed range"));
    }
    Ok(())
}

fn validate_thumbnail_in_images(input: &ProjectInput) -> Result<(), ValidationError> {
    match input.thumbnail_image.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(thumb) if !input.images.iter().any(|image| image == thumb) => Err(new_validation_error(
            "thumbnail_not_in_images",
            "Thumbnail must be one of the project images",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_row(title: &str) -> ProjectRow {
        ProjectRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            title_cs: None,
            description: "Short".into(),
            description_cs: Some("".into()),
            full_description: "# Build\nPrinted in **PETG**.".into(),
            full_description_cs: None,
            project_category: vec!["functional".into()],
            material: "PETG".into(),
            printing_technology: "FDM".into(),
            design_source: "My Design".into(),
            difficulty: "Intermediate".into(),
            date_label: "03/2025".into(),
            date_value: 202503,
            images: vec!["images/a.png".into(), "images/b.png".into()],
            thumbnail_image: Some("images/b.png".into()),
            model_url: None,
            published: true,
            featured: false,
            sort_order: None,
            filters: vec!["PETG".into(), "FDM".into()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_input() -> ProjectInput {
        serde_json::from_value(serde_json::json!({
            "title": "Cable clip",
            "printingTechnology": "FDM",
            "designSource": "Downloaded Model",
            "difficulty": "Beginner",
            "dateValue": 202411,
            "images": ["https://cdn.example.com/clip.jpg", "images/clip.png"],
            "thumbnailImage": "images/clip.png",
            "filters": ["PLA"]
        }))
        .unwrap()
    }

    #[test]
    fn row_conversion_falls_back_to_english() {
        let project = Project::try_from(sample_row("Spool holder")).unwrap();
        assert_eq!(project.title_cs, "Spool holder");
        assert_eq!(project.description_cs, "Short");
        assert_eq!(project.difficulty.rank(), 2);
        assert_eq!(project.thumbnail_image.as_deref(), Some("images/b.png"));
    }

    #[test]
    fn stale_thumbnail_is_reported_unset() {
        let mut row = sample_row("Spool holder");
        row.thumbnail_image = Some("images/removed.png".into());
        let project = Project::try_from(row).unwrap();
        assert_eq!(project.thumbnail_image, None);
        assert_eq!(project.images.first().map(String::as_str), Some("images/a.png"));
    }

    #[test]
    fn unknown_stored_enum_is_an_error() {
        let mut row = sample_row("Broken");
        row.printing_technology = "SLS".into();
        assert!(Project::try_from(row).is_err());
    }

    #[test]
    fn input_defaults_and_validation() {
        let input = sample_input().normalized();
        assert!(input.published);
        assert_eq!(input.date, "11/2024");
        assert!(input.validate().is_ok());
    }

    #[test]
    fn thumbnail_must_be_among_images() {
        let mut input = sample_input();
        input.thumbnail_image = Some("images/other.png".into());
        assert!(input.validate().is_err());
    }

    #[test]
    fn date_value_must_be_yyyymm() {
        assert!(validate_date_value(202512).is_ok());
        assert!(validate_date_value(202513).is_err());
        assert!(validate_date_value(2025).is_err());
        assert!(validate_date_value(180001).is_err());
    }

    #[test]
    fn detail_renders_sanitized_markdown() {
        let mut row = sample_row("Lamp");
        row.full_description = "Hello <script>alert(1)</script> **world**".into();
        let detail = Project::try_from(row).unwrap().into_detail();
        assert!(detail.full_description_html.contains("<strong>world</strong>"));
        assert!(!detail.full_description_html.contains("<script>"));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["title"], "Lamp");
        assert_eq!(json["printingTechnology"], "FDM");
        assert_eq!(json["date"], "03/2025");
    }

    #[test]
    fn localized_title_drives_listing() {
        let mut row = sample_row("Hook");
        row.title_cs = Some("Háček".into());
        let project = Project::try_from(row).unwrap();
        let czech = LocalizedProject { project: project.clone(), lang: Language::Cs };
        assert_eq!(ListingItem::title(&czech), "Háček");
        assert_eq!(ListingItem::title(&project), "Hook");
    }
}
