use serde::Serialize;

use super::repo_types::Image;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub url: String,
    pub saved_image: Image,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub status: &'static str,
    pub count: usize,
    pub images: Vec<Image>,
}
