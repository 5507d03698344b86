//! Album pages: listing, upload and viewing. All of them sit behind
//! [`require_login`](crate::auth::require_login).

use axum::{
    extract::{Multipart, Query, Request, State},
    http::{StatusCode, header::LOCATION},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "image";

/// Query parameters for `/view`.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    /// Stored file name.
    #[serde(default)]
    pub id: String,
}

/// GET / - list stored images.
pub async fn list_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let images = state.photos.list().await?;
    Ok(Html(state.templates.list(&images)?))
}

/// GET /upload - render the upload form.
pub async fn upload_page(State(state): State<AppState>) -> Result<Html<String>> {
    Ok(Html(state.templates.upload()?))
}

/// POST /upload - store the `image` field and go back to the album.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ServerError::BadRequest("Upload has no file name".to_string()))?;
        let data = field.bytes().await?;

        let name = state.photos.save(&file_name, &data).await?;
        info!(name = %name, bytes = data.len(), "Photo uploaded");

        return Ok((StatusCode::FOUND, [(LOCATION, "/")]).into_response());
    }

    Err(ServerError::BadRequest(format!(
        "Missing '{}' field",
        UPLOAD_FIELD
    )))
}

/// GET /view?id=<name> - serve one stored image.
pub async fn view_handler(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
    request: Request,
) -> Result<Response> {
    let path = state.photos.path_for(&query.id).await?;

    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to serve file: {}", e)))?;

    Ok(response.into_response())
}
