use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ImageListResponse, UploadResponse},
    repo,
    services::{upload_image, UploadItem, MAX_IMAGE_BYTES},
};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    state::AppState,
};

/// Multipart field carrying the file.
const IMAGE_FIELD: &str = "image";

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/image/my-images", get(my_images))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/image/upload", post(upload))
        // room for multipart framing around a full-size image
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
}

#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut mp = mp?;
    let mut file: Option<UploadItem> = None;
    while let Some(field) = mp.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await?;
        file = Some(UploadItem { body, content_type });
        break;
    }

    let item = file.ok_or_else(|| AppError::validation("No image file provided"))?;
    let image = upload_image(&state, user.id, item).await?;

    Ok(Json(UploadResponse {
        status: "success",
        message: "Image uploaded and saved",
        url: image.image_url.clone(),
        saved_image: image,
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn my_images(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ImageListResponse>> {
    let images = repo::list_by_user(&state.db, user.id).await?;
    Ok(Json(ImageListResponse {
        status: "success",
        count: images.len(),
        images,
    }))
}
