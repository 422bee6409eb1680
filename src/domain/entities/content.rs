use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::{
    entities::asset::HasAssets,
    errors::{AppError, FieldError},
};

// ───── Language ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Cs,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cs => "cs",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "cs" | "cz" => Ok(Language::Cs),
            other => Err(AppError::InvalidInput(format!("Unsupported language '{}'", other))),
        }
    }
}

/// Picks the Czech variant when asked for and present, English otherwise.
pub fn localized<'a>(lang: Language, english: &'a str, czech: &'a str) -> &'a str {
    match lang {
        Language::Cs if !czech.trim().is_empty() => czech,
        _ => english,
    }
}

// ───── Content keys ─────────────────────────────────────────────────

/// Every piece of editable copy on the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentKey {
    HeroTitle,
    HeroSubtitle,
    HeroCta,
    HeroImage,
    AboutTitle,
    AboutText,
    AboutImage,
    ProjectsTitle,
    ProjectsSubtitle,
    TestimonialsTitle,
    ContactTitle,
    ContactText,
    ContactEmail,
    ContactPhone,
    ContactLocation,
    SocialInstagram,
    SocialLinkedin,
    SocialGithub,
    SocialPrintables,
    SocialThingiverse,
    FooterText,
    FooterCopyright,
}

impl ContentKey {
    pub const ALL: [ContentKey; 22] = [
        ContentKey::HeroTitle,
        ContentKey::HeroSubtitle,
        ContentKey::HeroCta,
        ContentKey::HeroImage,
        ContentKey::AboutTitle,
        ContentKey::AboutText,
        ContentKey::AboutImage,
        ContentKey::ProjectsTitle,
        ContentKey::ProjectsSubtitle,
        ContentKey::TestimonialsTitle,
        ContentKey::ContactTitle,
        ContentKey::ContactText,
        ContentKey::ContactEmail,
        ContentKey::ContactPhone,
        ContentKey::ContactLocation,
        ContentKey::SocialInstagram,
        ContentKey::SocialLinkedin,
        ContentKey::SocialGithub,
        ContentKey::SocialPrintables,
        ContentKey::SocialThingiverse,
        ContentKey::FooterText,
        ContentKey::FooterCopyright,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKey::HeroTitle => "heroTitle",
            ContentKey::HeroSubtitle => "heroSubtitle",
            ContentKey::HeroCta => "heroCta",
            ContentKey::HeroImage => "heroImage",
            ContentKey::AboutTitle => "aboutTitle",
            ContentKey::AboutText => "aboutText",
            ContentKey::AboutImage => "aboutImage",
            ContentKey::ProjectsTitle => "projectsTitle",
            ContentKey::ProjectsSubtitle => "projectsSubtitle",
            ContentKey::TestimonialsTitle => "testimonialsTitle",
            ContentKey::ContactTitle => "contactTitle",
            ContentKey::ContactText => "contactText",
            ContentKey::ContactEmail => "contactEmail",
            ContentKey::ContactPhone => "contactPhone",
            ContentKey::ContactLocation => "contactLocation",
            ContentKey::SocialInstagram => "socialInstagram",
            ContentKey::SocialLinkedin => "socialLinkedin",
            ContentKey::SocialGithub => "socialGithub",
            ContentKey::SocialPrintables => "socialPrintables",
            ContentKey::SocialThingiverse => "socialThingiverse",
            ContentKey::FooterText => "footerText",
            ContentKey::FooterCopyright => "footerCopyright",
        }
    }

    /// Keys holding prose have a Czech twin stored under `<key>Cs`.
    pub fn is_localized(&self) -> bool {
        !matches!(
            self,
            ContentKey::HeroImage
                | ContentKey::AboutImage
                | ContentKey::ContactEmail
                | ContentKey::ContactPhone
                | ContentKey::SocialInstagram
                | ContentKey::SocialLinkedin
                | ContentKey::SocialGithub
                | ContentKey::SocialPrintables
                | ContentKey::SocialThingiverse
                | ContentKey::FooterCopyright
        )
    }

    /// Keys whose value is a link or an uploaded asset.
    pub fn is_asset(&self) -> bool {
        matches!(self, ContentKey::HeroImage | ContentKey::AboutImage)
    }

    /// Name of the stored field holding this key in `lang`.
    pub fn field_name(&self, lang: Language) -> String {
        match lang {
            Language::Cs if self.is_localized() => format!("{}Cs", self.as_str()),
            _ => self.as_str().to_string(),
        }
    }

    /// Maps a stored field name back to its key and language.
    pub fn from_field(field: &str) -> Option<(ContentKey, Language)> {
        if let Some(key) = ContentKey::ALL.iter().find(|k| k.as_str() == field) {
            return Some((*key, Language::En));
        }
        let base = field.strip_suffix("Cs")?;
        ContentKey::ALL
            .iter()
            .find(|k| k.is_localized() && k.as_str() == base)
            .map(|k| (*k, Language::Cs))
    }

    /// Built-in copy shown until the admin edits the field.
    pub fn default_text(&self, lang: Language) -> &'static str {
        use ContentKey::*;
        use Language::*;

        match (self, lang) {
            (HeroTitle, En) => "Designing and printing in 3D",
            (HeroTitle, Cs) => "Navrhuji a tisknu ve 3D",
            (HeroSubtitle, En) => "CAD models, functional prints and prototypes",
            (HeroSubtitle, Cs) => "CAD modely, funkční výtisky a prototypy",
            (HeroCta, En) => "View projects",
            (HeroCta, Cs) => "Zobrazit projekty",
            (AboutTitle, En) => "About me",
            (AboutTitle, Cs) => "O mně",
            (AboutText, En) => "I design parts in CAD and bring them to life on FDM and SLA printers.",
            (AboutText, Cs) => "Navrhuji díly v CAD a oživuji je na FDM a SLA tiskárnách.",
            (ProjectsTitle, En) => "Projects",
            (ProjectsTitle, Cs) => "Projekty",
            (ProjectsSubtitle, En) => "A selection of designs and prints",
            (ProjectsSubtitle, Cs) => "Výběr návrhů a výtisků",
            (TestimonialsTitle, En) => "What clients say",
            (TestimonialsTitle, Cs) => "Co říkají klienti",
            (ContactTitle, En) => "Contact",
            (ContactTitle, Cs) => "Kontakt",
            (ContactText, En) => "Have an idea for a print? Get in touch.",
            (ContactText, Cs) => "Máte nápad na výtisk? Ozvěte se.",
            (ContactLocation, En) => "Czech Republic",
            (ContactLocation, Cs) => "Česká republika",
            (FooterText, En) => "3D design and printing portfolio",
            (FooterText, Cs) => "Portfolio 3D návrhů a tisku",
            _ => "",
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───── Stored bag ───────────────────────────────────────────────────

#[derive(Debug, sqlx::FromRow)]
pub struct SiteContentRow {
    pub content: Json<BTreeMap<String, String>>,
    pub updated_at: DateTime<Utc>,
}

/// The raw content bag as the admin editor reads and writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteContent {
    pub values: BTreeMap<String, String>,
}

impl From<SiteContentRow> for SiteContent {
    fn from(row: SiteContentRow) -> Self {
        SiteContent { values: row.content.0 }
    }
}

impl SiteContent {
    /// Stored value for the language when non-blank, the default otherwise.
    pub fn resolve(&self, lang: Language, key: ContentKey) -> String {
        self.values
            .get(&key.field_name(lang))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| key.default_text(lang).to_string())
    }

    pub fn resolve_all(&self, lang: Language) -> BTreeMap<&'static str, String> {
        ContentKey::ALL
            .iter()
            .map(|key| (key.as_str(), self.resolve(lang, *key)))
            .collect()
    }

    /// Rejects fields that map to no content key and overlong values.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors: Vec<FieldError> = self
            .values
            .iter()
            .filter_map(|(field, value)| {
                if ContentKey::from_field(field).is_none() {
                    Some(FieldError { field: field.clone(), message: "Unknown content key".into() })
                } else if value.chars().count() > MAX_CONTENT_LENGTH {
                    Some(FieldError { field: field.clone(), message: "Value is too long".into() })
                } else {
                    None
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            errors.sort_by(|a, b| a.field.cmp(&b.field));
            Err(AppError::ValidationError(errors))
        }
    }
}

const MAX_CONTENT_LENGTH: usize = 5_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedContent {
    pub lang: Language,
    pub content: BTreeMap<&'static str, String>,
}

impl HasAssets for SiteContent {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String)) {
        for (field, value) in self.values.iter_mut() {
            if ContentKey::from_field(field).is_some_and(|(key, _)| key.is_asset()) {
                f(value);
            }
        }
    }
}

impl HasAssets for ResolvedContent {
    fn for_each_asset(&mut self, f: &mut dyn FnMut(&mut String)) {
        for key in ContentKey::ALL.iter().filter(|key| key.is_asset()) {
            if let Some(value) = self.content.get_mut(key.as_str()) {
                f(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(pairs: &[(&str, &str)]) -> SiteContent {
        SiteContent {
            values: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[test]
    fn stored_value_wins_over_default() {
        let content = bag(&[("heroTitle", "Custom parts"), ("heroTitleCs", "Díly na míru")]);
        assert_eq!(content.resolve(Language::En, ContentKey::HeroTitle), "Custom parts");
        assert_eq!(content.resolve(Language::Cs, ContentKey::HeroTitle), "Díly na míru");
    }

    #[test]
    fn blank_value_falls_back_to_language_default() {
        let content = bag(&[("heroTitleCs", "   ")]);
        assert_eq!(
            content.resolve(Language::Cs, ContentKey::HeroTitle),
            ContentKey::HeroTitle.default_text(Language::Cs)
        );
        assert_eq!(content.resolve(Language::En, ContentKey::AboutTitle), "About me");
    }

    #[test]
    fn non_localized_keys_share_one_field() {
        let content = bag(&[("contactEmail", "studio@example.cz")]);
        assert_eq!(ContentKey::ContactEmail.field_name(Language::Cs), "contactEmail");
        assert_eq!(content.resolve(Language::Cs, ContentKey::ContactEmail), "studio@example.cz");
    }

    #[test]
    fn field_names_round_trip() {
        for key in ContentKey::ALL {
            for lang in [Language::En, Language::Cs] {
                let (parsed, _) = ContentKey::from_field(&key.field_name(lang)).unwrap();
                assert_eq!(parsed, key);
            }
        }
        assert_eq!(ContentKey::from_field("contactEmailCs"), None);
        assert_eq!(ContentKey::from_field("aboutTextCs"), Some((ContentKey::AboutText, Language::Cs)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let content = bag(&[("heroTitle", "ok"), ("pricingTable", "nope")]);
        match content.validate() {
            Err(AppError::ValidationError(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "pricingTable");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn localized_falls_back_to_english() {
        assert_eq!(localized(Language::Cs, "Bracket", ""), "Bracket");
        assert_eq!(localized(Language::Cs, "Bracket", "Držák"), "Držák");
        assert_eq!(localized(Language::En, "Bracket", "Držák"), "Bracket");
        assert_eq!("CS".parse::<Language>().unwrap(), Language::Cs);
    }
}
