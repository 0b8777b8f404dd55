use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
    extract::parse_id,
    images::repo as images_repo,
    scans::{dto::ScanCreatedResponse, repo as scans_repo, repo_types::ScanResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/ai/scan/:image_id", post(scan_image))
}

/// Score one of the caller's images and store the result.
pub async fn run_scan(st: &AppState, user_id: Uuid, image_id: Uuid) -> AppResult<ScanResult> {
    let image = images_repo::find_owned(&st.db, image_id, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Image not found or unauthorized"))?;

    let scores = st.analyzer.analyze(&image).await?;
    scores.validate().map_err(|e| anyhow::anyhow!("analyzer produced invalid scores: {}", e))?;

    let scan = scans_repo::insert_scan(&st.db, user_id, image.id, &scores).await?;
    info!(scan_id = %scan.id, %image_id, "ai scan completed");
    Ok(scan)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn scan_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(image_id): Path<String>,
) -> AppResult<(StatusCode, Json<ScanCreatedResponse>)> {
    let image_id = parse_id(&image_id, "image ID")?;
    let scan = run_scan(&state, user.id, image_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ScanCreatedResponse {
            status: "success",
            message: "AI scan completed and result saved",
            data: scan,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlx::PgPool;

    use super::*;
    use crate::{
        analysis::analyzer::FixedAnalyzer,
        auth::repo_types::User,
        config::test_config,
        images::repo::insert_image,
        scans::repo_types::AiScores,
        storage::MemoryStorage,
    };

    fn state_with(db: PgPool, scores: AiScores) -> AppState {
        AppState::from_parts(
            db,
            Arc::new(test_config()),
            Arc::new(MemoryStorage::default()),
            Arc::new(FixedAnalyzer(scores)),
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn scan_persists_analyzer_scores(db: PgPool) {
        let scores = AiScores {
            wrinkles: Some(40.0),
            acne: Some(60.0),
            dark_spots: Some(20.0),
            hydration: Some(70.0),
        };
        let state = state_with(db.clone(), scores);
        let user = User::create(&db, "Ana", "ana@example.com", "h").await.unwrap();
        let image_id = Uuid::new_v4();
        insert_image(&db, image_id, user.id, "https://cdn/x.jpg", "x.jpg").await.unwrap();

        let scan = run_scan(&state, user.id, image_id).await.unwrap();
        assert_eq!(scan.ai_scores, scores);
        assert_eq!(scan.image_id, image_id);
        assert_eq!(scan.uploaded_by, user.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "needs DATABASE_URL"]
    async fn scanning_someone_elses_image_is_not_found(db: PgPool) {
        let state = state_with(db.clone(), AiScores::default());
        let owner = User::create(&db, "A", "a@example.com", "h").await.unwrap();
        let intruder = User::create(&db, "B", "b@example.com", "h").await.unwrap();
        let image_id = Uuid::new_v4();
        insert_image(&db, image_id, owner.id, "https://cdn/x.jpg", "x.jpg").await.unwrap();

        let err = run_scan(&state, intruder.id, image_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = run_scan(&state, owner.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
