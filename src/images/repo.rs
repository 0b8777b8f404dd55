use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::Image;

/// Insert the metadata row for an object that is already stored.
pub async fn insert_image(
    db: &PgPool,
    image_id: Uuid,
    user_id: Uuid,
    image_url: &str,
    storage_key: &str,
) -> anyhow::Result<Image> {
    let image = sqlx::query_as::<_, Image>(
        r#"
        INSERT INTO images (id, image_url, storage_key, uploaded_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, image_url, uploaded_by, uploaded_at
        "#,
    )
    .bind(image_id)
    .bind(image_url)
    .bind(storage_key)
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("insert image")?;

    Ok(image)
}

// ---- Queries ----

/// All images of a user, newest first.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Image>> {
    let rows = sqlx::query_as::<_, Image>(
        r#"
        SELECT id, image_url, uploaded_by, uploaded_at
          FROM images
         WHERE uploaded_by = $1
         ORDER BY uploaded_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list images by user")?;

    Ok(rows)
}

/// The image if it exists and belongs to `user_id`.
pub async fn find_owned(
    db: &PgPool,
    image_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<Image>> {
    let row = sqlx::query_as::<_, Image>(
        r#"
        SELECT id, image_url, uploaded_by, uploaded_at
          FROM images
         WHERE id = $1 AND uploaded_by = $2
        "#,
    )
    .bind(image_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find image")?;

    Ok(row)
}
