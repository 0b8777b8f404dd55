use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CompareRequest, CompareResponse, CreateScanRequest, ScanCreatedResponse, ScanListResponse},
    repo,
    services::{compare_owned, create_scan},
};
use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    extract::{parse_id, AppJson},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/scans/my-scans", get(my_scans))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/scans", post(create))
        .route("/scans/compare-scans", post(compare))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<CreateScanRequest>,
) -> AppResult<(StatusCode, Json<ScanCreatedResponse>)> {
    let (Some(image_id), Some(scores)) = (payload.image_id.as_deref(), payload.ai_scores) else {
        return Err(AppError::validation("Image ID and AI scores are required"));
    };
    let image_id = parse_id(image_id, "image ID")?;

    let scan = create_scan(&state, user.id, image_id, &scores).await?;
    Ok((
        StatusCode::CREATED,
        Json(ScanCreatedResponse {
            status: "success",
            message: "Scan result saved successfully",
            data: scan,
        }),
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn my_scans(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<ScanListResponse>> {
    let data = repo::list_by_user_with_images(&state.db, user.id).await?;
    Ok(Json(ScanListResponse {
        status: "success",
        results: data.len(),
        data,
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn compare(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<CompareRequest>,
) -> AppResult<Json<CompareResponse>> {
    let (Some(first), Some(second)) = (payload.scan_id1.as_deref(), payload.scan_id2.as_deref())
    else {
        return Err(AppError::validation("scanId1 and scanId2 are required"));
    };

    let comparison = compare_owned(&state, user.id, first, second).await?;
    Ok(Json(CompareResponse {
        status: "success",
        message: "Comparison successful",
        comparison,
    }))
}
