//! HTTP client for the portfolio API, used by the public site and the
//! admin panel alike.
//!
//! Every `GET` carries a `_t=<unix millis>` parameter so intermediaries never
//! serve a stale listing. Admin calls send the session token in
//! `X-Admin-Token`; a 401 on such a call drops the token and surfaces as
//! [`ClientError::SessionExpired`] so the caller can send the user back to
//! the login screen.

use std::collections::BTreeMap;

use chrono::Utc;
use derive_more::Display;
use parking_lot::RwLock;
use reqwest::{multipart, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    constants::{ADMIN_TOKEN_HEADER, CACHE_BUST_PARAM},
    entities::{
        achievement::{Achievement, AchievementInput},
        admin::{
            ChangePasswordRequest, ConfirmPasswordReset, DashboardSummary, LoginRequest, PasswordResetRequest,
            ResetTokenRequest, ResetTokenResponse, ResetTokenStatus,
        },
        content::{Language, SiteContent},
        filter_category::{FilterCategory, FilterCategoryChange, FilterCategoryInput},
        project::{Project, ProjectDetail, ProjectInput, ReorderRequest, ToggleRequest},
        site_settings::SiteSettings,
        testimonial::{Testimonial, TestimonialInput},
        token::LoginResponse,
        upload::{AssetKind, UploadResponse},
    },
    listing::{ReorderOutcome, SortMode},
};

#[derive(Debug, Display)]
pub enum ClientError {
    #[display("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[display("Session expired")]
    SessionExpired,

    #[display("Transport error: {_0}")]
    Transport(reqwest::Error),

    #[display("Could not decode response: {_0}")]
    Decode(reqwest::Error),
}

impl std::error::Error for ClientError {}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ContentBody {
    content: BTreeMap<String, String>,
}

/// Listing parameters shared by the public and admin project lists.
#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub filters: Vec<String>,
    pub sort: Option<SortMode>,
    pub lang: Option<Language>,
}

impl ProjectQuery {
    /// Follows a saved manual order: the admin list stops applying a sort
    /// formula so the new order shows as saved.
    pub fn after_reorder(&mut self, outcome: &ReorderOutcome) {
        self.sort = Some(outcome.sort_mode);
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.filters.is_empty() {
            pairs.push(("filters", self.filters.join(",")));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(lang) = self.lang {
            pairs.push(("lang", lang.as_str().to_string()));
        }
        pairs
    }
}

pub struct PortfolioClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: Option<String>,
    admin_token: RwLock<Option<String>>,
}

impl PortfolioClient {
    pub fn new(base_url: &str, anon_key: Option<String>) -> Self {
        PortfolioClient {
            http: reqwest::Client::new(),
            base_url: format!("{}/api/v1", base_url.trim_end_matches('/')),
            anon_key,
            admin_token: RwLock::new(None),
        }
    }

    pub fn with_admin_token(self, token: impl Into<String>) -> Self {
        *self.admin_token.write() = Some(token.into());
        self
    }

    pub fn admin_token(&self) -> Option<String> {
        self.admin_token.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.admin_token.read().is_some()
    }

    // ───── Plumbing ─────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str, admin: bool) -> Result<RequestBuilder, ClientError> {
        let is_get = method == Method::GET;
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));

        if let Some(key) = &self.anon_key {
            builder = builder.bearer_auth(key);
        }
        if is_get {
            builder = builder.query(&[(CACHE_BUST_PARAM, Utc::now().timestamp_millis().to_string())]);
        }
        if admin {
            let token = self.admin_token().ok_or(ClientError::SessionExpired)?;
            builder = builder.header(ADMIN_TOKEN_HEADER, token);
        }
        Ok(builder)
    }

    async fn execute(&self, builder: RequestBuilder, admin: bool) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(ClientError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if admin && status == StatusCode::UNAUTHORIZED {
            tracing::info!("admin session rejected; dropping token");
            self.admin_token.write().take();
            return Err(ClientError::SessionExpired);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
        };
        Err(ClientError::Http { status: status.as_u16(), message })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        response.json().await.map_err(ClientError::Decode)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        admin: bool,
    ) -> Result<T, ClientError> {
        let builder = self.request(Method::GET, path, admin)?.query(query);
        Self::decode(self.execute(builder, admin).await?).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B, admin: bool) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method, path, admin)?.json(body);
        Self::decode(self.execute(builder, admin).await?).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, path, true)?;
        self.execute(builder, true).await?;
        Ok(())
    }

    // ───── Public site ──────────────────────────────────────────────

    pub async fn projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, ClientError> {
        self.get("/projects", &query.pairs(), false).await
    }

    pub async fn featured_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.get("/projects/featured", &[], false).await
    }

    pub async fn project(&self, id: Uuid) -> Result<ProjectDetail, ClientError> {
        self.get(&format!("/projects/{}", id), &[], false).await
    }

    pub async fn filters(&self) -> Result<Vec<FilterCategory>, ClientError> {
        self.get("/filters", &[], false).await
    }

    pub async fn achievements(&self) -> Result<Vec<Achievement>, ClientError> {
        self.get("/achievements", &[], false).await
    }

    pub async fn achievement(&self, id: Uuid) -> Result<Achievement, ClientError> {
        self.get(&format!("/achievements/{}", id), &[], false).await
    }

    pub async fn testimonials(&self) -> Result<Vec<Testimonial>, ClientError> {
        self.get("/testimonials", &[], false).await
    }

    pub async fn featured_testimonials(&self) -> Result<Vec<Testimonial>, ClientError> {
        self.get("/testimonials/featured", &[], false).await
    }

    /// Site copy resolved for one language, keyed by content key.
    pub async fn content(&self, lang: Language) -> Result<BTreeMap<String, String>, ClientError> {
        let body: ContentBody = self
            .get("/content", &[("lang", lang.as_str().to_string())], false)
            .await?;
        Ok(body.content)
    }

    // ───── Session ──────────────────────────────────────────────────

    /// Logs in and keeps the session token for later admin calls.
    pub async fn login(&self, password: &str) -> Result<LoginResponse, ClientError> {
        let request = LoginRequest { password: password.to_string() };
        let response: LoginResponse = self.send_json(Method::POST, "/auth/login", &request, false).await?;
        *self.admin_token.write() = Some(response.token.clone());
        Ok(response)
    }

    /// Ends the session on the server. The local token is dropped either way.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = match self.request(Method::POST, "/auth/logout", true) {
            Ok(builder) => self.execute(builder, true).await.map(|_| ()),
            Err(e) => Err(e),
        };
        self.admin_token.write().take();
        result
    }

    pub async fn request_password_reset(&self, recovery_key: &str) -> Result<ResetTokenResponse, ClientError> {
        let request = PasswordResetRequest { recovery_key: recovery_key.to_string() };
        self.send_json(Method::POST, "/auth/password-reset/request", &request, false).await
    }

    pub async fn verify_password_reset(&self, reset_token: &str) -> Result<ResetTokenStatus, ClientError> {
        let request = ResetTokenRequest { reset_token: reset_token.to_string() };
        self.send_json(Method::POST, "/auth/password-reset/verify", &request, false).await
    }

    pub async fn confirm_password_reset(&self, reset_token: &str, new_password: &str) -> Result<(), ClientError> {
        let request = ConfirmPasswordReset {
            reset_token: reset_token.to_string(),
            new_password: new_password.to_string(),
        };
        let builder = self
            .request(Method::POST, "/auth/password-reset/confirm", false)?
            .json(&request);
        self.execute(builder, false).await?;
        Ok(())
    }

    /// Changes the admin password and switches to the fresh session it returns.
    pub async fn change_password(&self, current: &str, new_password: &str) -> Result<LoginResponse, ClientError> {
        let request = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new_password.to_string(),
        };
        let response: LoginResponse = self.send_json(Method::POST, "/admin/password", &request, true).await?;
        *self.admin_token.write() = Some(response.token.clone());
        Ok(response)
    }

    // ───── Admin: projects ──────────────────────────────────────────

    pub async fn admin_projects(&self, query: &ProjectQuery) -> Result<Vec<Project>, ClientError> {
        self.get("/admin/projects", &query.pairs(), true).await
    }

    pub async fn save_project(&self, id: Uuid, input: &ProjectInput) -> Result<Project, ClientError> {
        self.send_json(Method::PUT, &format!("/admin/projects/{}", id), input, true).await
    }

    pub async fn delete_project(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/admin/projects/{}", id)).await
    }

    pub async fn set_project_published(&self, id: Uuid, value: bool) -> Result<Project, ClientError> {
        let path = format!("/admin/projects/{}/published", id);
        self.send_json(Method::POST, &path, &ToggleRequest { value }, true).await
    }

    pub async fn set_project_featured(&self, id: Uuid, value: bool) -> Result<Project, ClientError> {
        let path = format!("/admin/projects/{}/featured", id);
        self.send_json(Method::POST, &path, &ToggleRequest { value }, true).await
    }

    pub async fn reorder_projects(&self, ids: &[Uuid]) -> Result<ReorderOutcome, ClientError> {
        let request = ReorderRequest { ids: ids.to_vec() };
        self.send_json(Method::POST, "/admin/projects/reorder", &request, true).await
    }

    // ───── Admin: filters ───────────────────────────────────────────

    pub async fn save_filter(&self, id: &str, input: &FilterCategoryInput) -> Result<FilterCategoryChange, ClientError> {
        let path = format!("/admin/filters/{}", urlencoding::encode(id));
        self.send_json(Method::PUT, &path, input, true).await
    }

    pub async fn delete_filter(&self, id: &str) -> Result<FilterCategoryChange, ClientError> {
        let path = format!("/admin/filters/{}", urlencoding::encode(id));
        let builder = self.request(Method::DELETE, &path, true)?;
        Self::decode(self.execute(builder, true).await?).await
    }

    // ───── Admin: achievements ──────────────────────────────────────

    pub async fn admin_achievements(&self) -> Result<Vec<Achievement>, ClientError> {
        self.get("/admin/achievements", &[], true).await
    }

    pub async fn save_achievement(&self, id: Uuid, input: &AchievementInput) -> Result<Achievement, ClientError> {
        self.send_json(Method::PUT, &format!("/admin/achievements/{}", id), input, true).await
    }

    pub async fn delete_achievement(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/admin/achievements/{}", id)).await
    }

    pub async fn set_achievement_published(&self, id: Uuid, value: bool) -> Result<Achievement, ClientError> {
        let path = format!("/admin/achievements/{}/published", id);
        self.send_json(Method::POST, &path, &ToggleRequest { value }, true).await
    }

    // ───── Admin: testimonials ──────────────────────────────────────

    pub async fn admin_testimonials(&self) -> Result<Vec<Testimonial>, ClientError> {
        self.get("/admin/testimonials", &[], true).await
    }

    pub async fn save_testimonial(&self, id: Uuid, input: &TestimonialInput) -> Result<Testimonial, ClientError> {
        self.send_json(Method::PUT, &format!("/admin/testimonials/{}", id), input, true).await
    }

    pub async fn delete_testimonial(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/admin/testimonials/{}", id)).await
    }

    pub async fn set_testimonial_published(&self, id: Uuid, value: bool) -> Result<Testimonial, ClientError> {
        let path = format!("/admin/testimonials/{}/published", id);
        self.send_json(Method::POST, &path, &ToggleRequest { value }, true).await
    }

    pub async fn set_testimonial_featured(&self, id: Uuid, value: bool) -> Result<Testimonial, ClientError> {
        let path = format!("/admin/testimonials/{}/featured", id);
        self.send_json(Method::POST, &path, &ToggleRequest { value }, true).await
    }

    // ───── Admin: content, settings, uploads ────────────────────────

    pub async fn admin_content(&self) -> Result<SiteContent, ClientError> {
        self.get("/admin/content", &[], true).await
    }

    pub async fn replace_content(&self, content: &SiteContent) -> Result<SiteContent, ClientError> {
        self.send_json(Method::PUT, "/admin/content", content, true).await
    }

    pub async fn settings(&self) -> Result<SiteSettings, ClientError> {
        self.get("/admin/settings", &[], true).await
    }

    pub async fn update_settings(&self, settings: &SiteSettings) -> Result<SiteSettings, ClientError> {
        self.send_json(Method::PUT, "/admin/settings", settings, true).await
    }

    pub async fn upload(&self, kind: AssetKind, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, ClientError> {
        let form = multipart::Form::new()
            .text("kind", kind.to_string())
            .part("file", multipart::Part::bytes(bytes).file_name(file_name.to_string()));
        let builder = self.request(Method::POST, "/admin/uploads", true)?.multipart(form);
        Self::decode(self.execute(builder, true).await?).await
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, ClientError> {
        self.get("/admin/dashboard", &[], true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_unset_values() {
        let query = ProjectQuery {
            filters: vec!["pla".into(), "fdm".into()],
            sort: Some(SortMode::DateNewest),
            lang: None,
        };
        assert_eq!(
            query.pairs(),
            vec![("filters", "pla,fdm".to_string()), ("sort", "date-newest".to_string())]
        );
        assert!(ProjectQuery::default().pairs().is_empty());
    }

    #[test]
    fn admin_request_without_token_is_expired() {
        let client = PortfolioClient::new("http://127.0.0.1:1", None);
        assert!(matches!(
            client.request(Method::GET, "/admin/dashboard", true),
            Err(ClientError::SessionExpired)
        ));
    }

    #[test]
    fn base_url_is_normalised() {
        let client = PortfolioClient::new("https://api.example.cz/", Some("anon".into()));
        assert_eq!(client.base_url, "https://api.example.cz/api/v1");
    }
}
