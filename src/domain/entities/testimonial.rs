use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    content::{localized, Language},
    filter_category::blank_to_none,
    project::validate_not_blank,
};

#[derive(Debug, sqlx::FromRow)]
pub struct TestimonialRow {
    pub id: Uuid,
    pub client_name: String,
    pub client_role: Option<String>,
    pub content: String,
    pub content_cs: Option<String>,
    pub rating: i16,
    pub project_id: Option<Uuid>,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: Uuid,
    pub client_name: String,
    pub client_role: Option<String>,
    pub content: String,
    pub content_cs: String,
    pub rating: i16,
    pub project_id: Option<Uuid>,
    pub published: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TestimonialRow> for Testimonial {
    fn from(row: TestimonialRow) -> Self {
        Testimonial {
            content_cs: row
                .content_cs
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| row.content.clone()),
            id: row.id,
            client_name: row.client_name,
            client_role: row.client_role,
            content: row.content,
            rating: row.rating,
            project_id: row.project_id,
            published: row.published,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Testimonial {
    pub fn content_in(&self, lang: Language) -> &str {
        localized(lang, &self.content, &self.content_cs)
    }
}

fn default_published() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialInput {
    #[validate(
        length(min = 1, max = 120, message = "Client name must be 1-120 characters"),
        custom(function = "validate_not_blank")
    )]
    pub client_name: String,

    #[validate(length(max = 120))]
    pub client_role: Option<String>,

    #[validate(
        length(min = 1, max = 2000, message = "Content must be 1-2000 characters"),
        custom(function = "validate_not_blank")
    )]
    pub content: String,

    #[validate(length(max = 2000))]
    pub content_cs: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,

    pub project_id: Option<Uuid>,

    #[serde(default = "default_published")]
    pub published: bool,
}

impl TestimonialInput {
    pub fn normalized(mut self) -> Self {
        self.client_name = self.client_name.trim().to_string();
        self.client_role = blank_to_none(self.client_role);
        self.content = self.content.trim().to_string();
        self.content_cs = blank_to_none(self.content_cs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rating: i16) -> TestimonialInput {
        TestimonialInput {
            client_name: "Jana Nováková".into(),
            client_role: Some("  ".into()),
            content: "Great prints, fast delivery.".into(),
            content_cs: None,
            rating,
            project_id: None,
            published: true,
        }
    }

    #[test]
    fn rating_is_bounded() {
        assert!(input(1).validate().is_ok());
        assert!(input(5).validate().is_ok());
        assert!(input(0).validate().is_err());
        assert!(input(6).validate().is_err());
    }

    #[test]
    fn blank_role_is_dropped() {
        assert_eq!(input(4).normalized().client_role, None);
    }

    #[test]
    fn czech_content_falls_back() {
        let testimonial = Testimonial::from(TestimonialRow {
            id: Uuid::new_v4(),
            client_name: "Petr".into(),
            client_role: None,
            content: "Solid work".into(),
            content_cs: None,
            rating: 5,
            project_id: None,
            published: true,
            featured: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        assert_eq!(testimonial.content_in(Language::Cs), "Solid work");
        let json = serde_json::to_value(&testimonial).unwrap();
        assert_eq!(json["clientName"], "Petr");
        assert_eq!(json["contentCs"], "Solid work");
    }
}
