use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use tracing::instrument;

use crate::{
    entities::upload::{AssetKind, SignedFileQuery, UploadForm, UploadResponse},
    errors::AppError,
    storage::local::IncomingFile,
    use_cases::extractors::AdminSession,
    AppState,
};

#[instrument(skip(_session, state, form))]
pub async fn upload_file(
    _session: AdminSession,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<impl Responder, AppError> {
    let kind: AssetKind = form.kind.as_str().parse()?;

    let path = state
        .storage
        .store(IncomingFile {
            kind,
            temp_path: form.file.file.path(),
            file_name: form.file.file_name.as_deref(),
            size: form.file.size,
        })
        .await?;

    let (signed_url, expires_at) = state.storage.signed_url(&path, Utc::now()).map_err(|e| {
        tracing::error!(%path, "failed to sign upload: {}", e);
        AppError::InternalError("Could not sign the uploaded file".into())
    })?;

    Ok(HttpResponse::Created().json(UploadResponse {
        path,
        signed_url,
        expires_at,
    }))
}

/// Serves a stored file to anyone holding a valid signed URL.
#[instrument(skip(state, query))]
pub async fn download_file(
    file_path: web::Path<String>,
    state: web::Data<AppState>,
    query: web::Query<SignedFileQuery>,
) -> Result<impl Responder, AppError> {
    let (bytes, content_type) = state.storage.read(&file_path, &query.token).await?;

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(("Cache-Control", "private, max-age=300"))
        .body(bytes))
}
