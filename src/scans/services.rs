use tracing::info;
use uuid::Uuid;

use super::{
    compare::{compare_scores, Comparison},
    repo,
    repo_types::{AiScores, ScanResult},
};
use crate::{
    error::{AppError, AppResult},
    extract::parse_id,
    images::repo as images_repo,
    state::AppState,
};

/// Persist scores for an image the user owns.
pub async fn create_scan(
    st: &AppState,
    user_id: Uuid,
    image_id: Uuid,
    scores: &AiScores,
) -> AppResult<ScanResult> {
    scores.validate().map_err(AppError::Validation)?;

    if images_repo::find_owned(&st.db, image_id, user_id).await?.is_none() {
        return Err(AppError::not_found("Image not found or unauthorized"));
    }

    let scan = repo::insert_scan(&st.db, user_id, image_id, scores).await?;
    info!(scan_id = %scan.id, %image_id, %user_id, "scan result saved");
    Ok(scan)
}

/// Compare two of the caller's scan results, in the order given.
///
/// A scan owned by someone else answers exactly like a missing one.
pub async fn compare_owned(
    st: &AppState,
    user_id: Uuid,
    first: &str,
    second: &str,
) -> AppResult<Comparison> {
    let first = parse_id(first, "scan ID")?;
    let second = parse_id(second, "scan ID")?;

    let (a, b) = tokio::try_join!(
        repo::find_owned(&st.db, first, user_id),
        repo::find_owned(&st.db, second, user_id),
    )?;
    let (Some(a), Some(b)) = (a, b) else {
        return Err(AppError::not_found("One or both scan results not found"));
    };

    Ok(compare_scores(&a.ai_scores, &b.ai_scores))
}
