use std::{fmt, str::FromStr};

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    #[multipart(rename = "file", limit = "64MB")]
    pub file: TempFile,

    #[multipart(rename = "kind")]
    pub kind: Text<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Model,
}

impl AssetKind {
    pub fn folder(&self) -> &'static str {
        match self {
            AssetKind::Image => "images",
            AssetKind::Model => "models",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Image => f.write_str("image"),
            AssetKind::Model => f.write_str("model"),
        }
    }
}

impl FromStr for AssetKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "images" => Ok(AssetKind::Image),
            "model" | "models" => Ok(AssetKind::Model),
            other => Err(AppError::InvalidInput(format!("Unknown upload kind '{}'", other))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Storage path to persist on the entity.
    pub path: String,
    pub signed_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SignedFileQuery {
    pub token: String,
}
