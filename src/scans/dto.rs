use serde::{Deserialize, Serialize};

use super::{
    compare::Comparison,
    repo_types::{AiScores, PopulatedScan, ScanResult},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScanRequest {
    pub image_id: Option<String>,
    pub ai_scores: Option<AiScores>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub scan_id1: Option<String>,
    pub scan_id2: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanCreatedResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: ScanResult,
}

#[derive(Debug, Serialize)]
pub struct ScanListResponse {
    pub status: &'static str,
    pub results: usize,
    pub data: Vec<PopulatedScan>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub comparison: Comparison,
}
