use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::{repo, repo_types::Image};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Upper bound for one uploaded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Reject anything that is not a non-empty image within the size limit.
pub fn validate_upload(item: &UploadItem) -> AppResult<()> {
    if !item.content_type.starts_with("image/") {
        return Err(AppError::validation(
            "Not an image! Please upload an image file.",
        ));
    }
    if item.body.is_empty() {
        return Err(AppError::validation("No image file provided"));
    }
    if item.body.len() > MAX_IMAGE_BYTES {
        return Err(AppError::validation("Image is larger than 5MB"));
    }
    Ok(())
}

/// Store the image externally, then record its metadata.
///
/// Nothing is written locally unless the external upload succeeded. If the
/// metadata insert fails the stored object is removed again.
pub async fn upload_image(st: &AppState, user_id: Uuid, item: UploadItem) -> AppResult<Image> {
    validate_upload(&item)?;

    let id = Uuid::new_v4();
    let ext = ext_from_mime(&item.content_type).unwrap_or("bin");
    let key = format!("skin-images/{}/{}.{}", user_id, id, ext);
    st.storage
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let url = st.storage.public_url(&key);
    match repo::insert_image(&st.db, id, user_id, &url, &key).await {
        Ok(image) => {
            info!(image_id = %image.id, %user_id, "image stored");
            Ok(image)
        }
        Err(e) => {
            if let Err(cleanup) = st.storage.delete_object(&key).await {
                warn!(error = %cleanup, key = %key, "orphaned object left behind");
            }
            Err(e.into())
        }
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
