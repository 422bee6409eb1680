use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use infer::Infer;
use tokio::fs;
use uuid::Uuid;

use crate::{
    entities::{
        asset::{is_storage_path, HasAssets},
        upload::AssetKind,
    },
    errors::{AppError, AuthError},
    repositories::token::TokenServiceRepository,
    settings::AppConfig,
};

const IMAGE_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];
const MODEL_EXTENSIONS: [&str; 7] = ["stl", "3mf", "obj", "step", "stp", "glb", "gltf"];
const FILES_ROUTE: &str = "/files/";

/// A validated file ready to be moved into storage.
#[derive(Debug)]
pub struct IncomingFile<'a> {
    pub kind: AssetKind,
    pub temp_path: &'a Path,
    pub file_name: Option<&'a str>,
    pub size: usize,
}

/// Uploads on the local filesystem, read back through signed URLs.
#[derive(Clone)]
pub struct LocalStorage<T>
where
    T: TokenServiceRepository,
{
    root: PathBuf,
    public_base_url: String,
    max_bytes: usize,
    tokens: T,
}

impl<T> LocalStorage<T>
where
    T: TokenServiceRepository,
{
    pub fn new(config: &AppConfig, tokens: T) -> Self {
        LocalStorage {
            root: config.upload_dir.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_upload_bytes(),
            tokens,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the upload and copies it to `{folder}/{uuid}.{ext}`.
    /// Returns the storage path.
    pub async fn store(&self, file: IncomingFile<'_>) -> Result<String, AppError> {
        if file.size == 0 {
            return Err(AppError::InvalidInput("Uploaded file is empty".into()));
        }
        if file.size > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} MB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }

        let extension = match file.kind {
            AssetKind::Image => image_extension(file.temp_path)?,
            AssetKind::Model => model_extension(file.file_name)?,
        };

        let folder = self.root.join(file.kind.folder());
        fs::create_dir_all(&folder).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        fs::copy(file.temp_path, folder.join(&file_name)).await?;

        let path = format!("{}/{}", file.kind.folder(), file_name);
        tracing::info!(%path, size = file.size, "upload stored");
        Ok(path)
    }

    pub fn signed_url(&self, path: &str, now: DateTime<Utc>) -> Result<(String, DateTime<Utc>), AuthError> {
        let (token, expires_at) = self.tokens.sign_file(path, now)?;
        let url = format!(
            "{}{}{}?token={}",
            self.public_base_url,
            FILES_ROUTE,
            path,
            urlencoding::encode(&token)
        );
        Ok((url, expires_at))
    }

    /// Rewrites storage paths on an outgoing entity into signed URLs.
    /// External URLs pass through.
    pub fn sign_assets<E: HasAssets + ?Sized>(&self, entity: &mut E) {
        let now = Utc::now();
        entity.for_each_asset(&mut |value: &mut String| {
            if !is_storage_path(value) {
                return;
            }
            match self.signed_url(value, now) {
                Ok((url, _)) => *value = url,
                Err(e) => tracing::warn!(path = %value, "could not sign asset: {}", e),
            }
        });
    }

    pub fn sign_all<E: HasAssets>(&self, entities: &mut [E]) {
        entities.iter_mut().for_each(|entity| self.sign_assets(entity));
    }

    /// Turns signed URLs we handed out back into storage paths before an
    /// entity is written.
    pub fn unsign_assets<E: HasAssets + ?Sized>(&self, entity: &mut E) {
        entity.for_each_asset(&mut |value: &mut String| {
            if let Some(path) = self.storage_path_of(value) {
                *value = path;
            }
        });
    }

    fn storage_path_of(&self, value: &str) -> Option<String> {
        let rest = value.strip_prefix(&self.public_base_url)?.strip_prefix(FILES_ROUTE)?;
        let path = rest.split(['?', '#']).next()?;
        is_storage_path(path).then(|| path.to_string())
    }

    /// Resolves a signed download to a file on disk.
    pub fn resolve(&self, path: &str, token: &str) -> Result<PathBuf, AppError> {
        let relative = safe_relative_path(path)?;
        let claims = self
            .tokens
            .decode_file(token)
            .map_err(|_| AppError::ForbiddenAccess)?;
        if claims.path != path {
            return Err(AppError::ForbiddenAccess);
        }
        Ok(self.root.join(relative))
    }

    pub async fn read(&self, path: &str, token: &str) -> Result<(Vec<u8>, &'static str), AppError> {
        let full_path = self.resolve(path, token)?;
        let bytes = match fs::read(&full_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound("File not found".into()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok((bytes, content_type_for(path)))
    }
}

/// Rejects anything other than a plain `folder/file` path.
fn safe_relative_path(path: &str) -> Result<&Path, AppError> {
    let candidate = Path::new(path);
    let plain = candidate
        .components()
        .all(|component| matches!(component, Component::Normal(_)));

    if !plain || !is_storage_path(path) {
        return Err(AppError::InvalidInput("Invalid file path".into()));
    }
    Ok(candidate)
}

fn image_extension(temp_path: &Path) -> Result<String, AppError> {
    let detected = Infer::new()
        .get_from_path(temp_path)?
        .filter(|kind| IMAGE_MIME_TYPES.contains(&kind.mime_type()))
        .ok_or_else(|| {
            AppError::UnsupportedMediaType("Images must be PNG, JPEG, WebP or GIF".into())
        })?;
    Ok(detected.extension().to_string())
}

fn model_extension(file_name: Option<&str>) -> Result<String, AppError> {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| MODEL_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "3D models must be one of: {}",
                MODEL_EXTENSIONS.join(", ")
            ))
        })
}

fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "stl" => "model/stl",
        "3mf" => "model/3mf",
        "obj" => "model/obj",
        "step" | "stp" => "model/step",
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        _ => "application/octet-stream",
    }
}
