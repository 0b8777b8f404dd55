use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{AiScores, PopulatedScan, ScanImageRow, ScanResult};

const SCAN_COLUMNS: &str =
    "id, uploaded_by, image_id, wrinkles, acne, dark_spots, hydration, created_at, updated_at";

pub async fn insert_scan(
    db: &PgPool,
    user_id: Uuid,
    image_id: Uuid,
    scores: &AiScores,
) -> anyhow::Result<ScanResult> {
    let scan = sqlx::query_as::<_, ScanResult>(&format!(
        r#"
        INSERT INTO scan_results (uploaded_by, image_id, wrinkles, acne, dark_spots, hydration)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {SCAN_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(image_id)
    .bind(scores.wrinkles)
    .bind(scores.acne)
    .bind(scores.dark_spots)
    .bind(scores.hydration)
    .fetch_one(db)
    .await
    .context("insert scan result")?;
    Ok(scan)
}

/// The user's scan results with their images, newest first.
pub async fn list_by_user_with_images(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<PopulatedScan>> {
    let rows = sqlx::query_as::<_, ScanImageRow>(
        r#"
        SELECT s.id, s.uploaded_by, s.image_id,
               s.wrinkles, s.acne, s.dark_spots, s.hydration,
               s.created_at, s.updated_at,
               i.image_url,
               i.uploaded_by AS image_uploaded_by,
               i.uploaded_at AS image_uploaded_at
          FROM scan_results s
          JOIN images i ON i.id = s.image_id
         WHERE s.uploaded_by = $1
         ORDER BY s.created_at DESC, s.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list scan results by user")?;

    Ok(rows.into_iter().map(PopulatedScan::from).collect())
}

/// The scan result if it exists and belongs to `user_id`.
pub async fn find_owned(
    db: &PgPool,
    scan_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<ScanResult>> {
    let scan = sqlx::query_as::<_, ScanResult>(&format!(
        "SELECT {SCAN_COLUMNS} FROM scan_results WHERE id = $1 AND uploaded_by = $2"
    ))
    .bind(scan_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find scan result")?;
    Ok(scan)
}
