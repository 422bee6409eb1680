use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    entities::{
        asset::{validate_asset_refs, validate_link, HasAssets},
        filter_category::{blank_to_none, new_validation_error},
        project::{format_date_value, validate_date_value, validate_not_blank},
    },
    errors::AppError,
};

const MAX_TITLE_LENGTH: u64 = 200;
const MAX_DESCRIPTION_LENGTH: u64 = 5_000;
const MAX_SKILLS: usize = 20;

/// Type-specific part of an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum AchievementDetails {
    Competition {
        #[serde(default)]
        placement: String,
        #[serde(default)]
        level: String,
        #[serde(default)]
        award: String,
        contest_url: Option<String>,
    },
    Certification {
        #[serde(default)]
        issuer: String,
        #[serde(default)]
        skills: Vec<String>,
        certificate_url: Option<String>,
    },
    Other {
        #[serde(default)]
        images: Vec<String>,
    },
}

impl AchievementDetails {
    pub fn kind(&self) -> &'static str {
        match self {
            AchievementDetails::Competition { .. } => "competition",
            AchievementDetails::Certification { .. } => "certification",
            AchievementDetails::Other { .. } => "other",
        }
    }

    fn validate_links(&self) -> Result<(), ValidationError> {
        match self {
            AchievementDetails::Competition { contest_url: Some(url), .. } => validate_link(url),
            AchievementDetails::Certification { certificate_url: Some(url), skills, .. } => {
                if skills.len() > MAX_SKILLS {
                    return Err(new_validation_error("too_many_skills", "Too many skills listed"));
                }
                validate_link(url)
            }
            AchievementDetails::Certification { skills, .. } if skills.len() > MAX_SKILLS => {
                Err(new_validation_error("too_many_skills", "Too many skills listed"))
            }
            AchievementDetails::Other { images } => validate_asset_refs(images),
            _ => Ok(()),
        }
    }

    fn normalize(&mut self) {
        match self {
            AchievementDetails::Competition { contest_url, .. } => *contest_url = blank_to_none(contest_url.take()),
            AchievementDetails::Certification { certificate_url, skills, .. } => {
                *certificate_url = blank_to_none(certificate_url.take());
                skills.retain(|skill| !skill.trim().is_empty());
            }
            AchievementDetails::Other { .. } => {}
        }
    }
}

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct AchievementRow {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub title_cs: Option<String>,
    pub description: String,
    pub description_cs: Option<String>,
    pub date_label: String,
    pub date_value: i32,
    pub details: Json<AchievementDetails>,
    pub published: bool,
    pub sort_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── API Models ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: Uuid,
    pub title: String,
    pub title_cs: String,
    pub description: String,
    pub description_cs: String,
    pub date: String,
    pub date_value: i32,
    #[serde(flatten)]
    pub details: AchievementDetails,
    pub published: bool,
    pub sort_order: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AchievementRow> for Achievement {
    type Error = AppError;

    fn try_from(row: AchievementRow) -> Result<Self, Self::Error> {
        let details = row.details.0;
        if details.kind() != row.kind {
            return Err(AppError::InternalError(format!(
                "Achievement {} stored as '{}' but holds '{}' details",
                row.id,
                row.kind,
                details.kind()
            )));
        }

        Ok(Achievement {
            title_cs: row.title_cs.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| row.title.clone()),
            description_cs: row
                .description_cs
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| row.description.clone()),
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date_label,
            date_value: row.date_value,
            details,
            published: row.published,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl HasAssets for Achievement {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String)) {
        if let AchievementDetails::Other { images } = &mut self.details {
            images.iter_mut().for_each(f);
        }
    }
}

/// Public ordering: manual order first, then newest.
pub fn sort_for_display(achievements: &mut [Achievement]) {
    achievements.sort_by(|a, b| {
        match (a.sort_order, b.sort_order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
        .then_with(|| b.date_value.cmp(&a.date_value))
    });
}

// ───── Input & Validation Requests ──────────────────────────────────

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_details"))]
pub struct AchievementInput {
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

    #[serde(default)]
    pub date: String,

    #[validate(custom(function = "validate_date_value"))]
    pub date_value: i32,

    #[serde(flatten)]
    pub details: AchievementDetails,

    #[serde(default = "default_published")]
    pub published: bool,

    pub sort_order: Option<i32>,
}

impl AchievementInput {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.title_cs = blank_to_none(self.title_cs);
        self.description_cs = blank_to_none(self.description_cs);
        if self.date.trim().is_empty() {
            self.date = format_date_value(self.date_value);
        }
        self.details.normalize();
        self
    }
}

impl HasAssets for AchievementInput {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String)) {
        if let AchievementDetails::Other { images } = &mut self.details {
            images.iter_mut().for_each(f);
        }
    }
}

fn validate_details(input: &AchievementInput) -> Result<(), ValidationError> {
    input.details.validate_links()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(details: AchievementDetails) -> AchievementRow {
        AchievementRow {
            id: Uuid::new_v4(),
            kind: details.kind().to_string(),
            title: "Regional robotics cup".into(),
            title_cs: None,
            description: "Team entry".into(),
            description_cs: Some("Týmová účast".into()),
            date_label: "05/2024".into(),
            date_value: 202405,
            details: Json(details),
            published: true,
            sort_order: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn serializes_flat_with_type_tag() {
        let achievement = Achievement::try_from(row(AchievementDetails::Competition {
            placement: "2nd".into(),
            level: "Regional".into(),
            award: "Silver".into(),
            contest_url: Some("https://contest.example.com".into()),
        }))
        .unwrap();

        let json = serde_json::to_value(&achievement).unwrap();
        assert_eq!(json["type"], "competition");
        assert_eq!(json["placement"], "2nd");
        assert_eq!(json["contestUrl"], "https://contest.example.com");
        assert_eq!(json["titleCs"], "Regional robotics cup");
        assert_eq!(json["descriptionCs"], "Týmová účast");
    }

    #[test]
    fn input_parses_each_kind() {
        let input: AchievementInput = serde_json::from_value(serde_json::json!({
            "title": "CAD certificate",
            "dateValue": 202310,
            "type": "certification",
            "issuer": "Autodesk",
            "skills": ["Fusion 360", " "],
            "certificateUrl": "https://cert.example.com/123"
        }))
        .unwrap();
        let input = input.normalized();
        assert!(input.validate().is_ok());
        assert_eq!(input.date, "10/2023");
        match input.details {
            AchievementDetails::Certification { ref skills, .. } => assert_eq!(skills, &vec!["Fusion 360".to_string()]),
            ref other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn rejects_non_http_links() {
        let input: AchievementInput = serde_json::from_value(serde_json::json!({
            "title": "Maker faire",
            "dateValue": 202301,
            "type": "competition",
            "contestUrl": "javascript:alert(1)"
        }))
        .unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn mismatched_kind_column_is_an_error() {
        let mut stored = row(AchievementDetails::Other { images: vec![] });
        stored.kind = "competition".into();
        assert!(Achievement::try_from(stored).is_err());
    }

    #[test]
    fn display_order_is_manual_then_newest() {
        let mut list: Vec<Achievement> = [(None, 202401), (Some(1), 202001), (None, 202405), (Some(0), 201901)]
            .into_iter()
            .map(|(order, date)| {
                let mut r = row(AchievementDetails::Other { images: vec![] });
                r.sort_order = order;
                r.date_value = date;
                Achievement::try_from(r).unwrap()
            })
            .collect();
        sort_for_display(&mut list);
        let dates: Vec<i32> = list.iter().map(|a| a.date_value).collect();
        assert_eq!(dates, vec![201901, 202001, 202405, 202401]);
    }
}
