use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::images::repo_types::Image;

/// One of the four skin-condition scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Wrinkles,
    Acne,
    DarkSpots,
    Hydration,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Wrinkles,
        Metric::Acne,
        Metric::DarkSpots,
        Metric::Hydration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Wrinkles => "wrinkles",
            Metric::Acne => "acne",
            Metric::DarkSpots => "darkSpots",
            Metric::Hydration => "hydration",
        }
    }
}

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// Scores of one scan. A missing metric was not measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiScores {
    #[serde(default, serialize_with = "serialize_opt_score", skip_serializing_if = "Option::is_none")]
    pub wrinkles: Option<f64>,
    #[serde(default, serialize_with = "serialize_opt_score", skip_serializing_if = "Option::is_none")]
    pub acne: Option<f64>,
    #[serde(default, serialize_with = "serialize_opt_score", skip_serializing_if = "Option::is_none")]
    pub dark_spots: Option<f64>,
    #[serde(default, serialize_with = "serialize_opt_score", skip_serializing_if = "Option::is_none")]
    pub hydration: Option<f64>,
}

impl AiScores {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Wrinkles => self.wrinkles,
            Metric::Acne => self.acne,
            Metric::DarkSpots => self.dark_spots,
            Metric::Hydration => self.hydration,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Wrinkles => &mut self.wrinkles,
            Metric::Acne => &mut self.acne,
            Metric::DarkSpots => &mut self.dark_spots,
            Metric::Hydration => &mut self.hydration,
        };
        *slot = Some(value);
    }

    /// Every present score must be a finite number in [0, 100].
    pub fn validate(&self) -> Result<(), String> {
        for metric in Metric::ALL {
            if let Some(v) = self.get(metric) {
                if !v.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&v) {
                    return Err(format!(
                        "Score for {} must be between {} and {}",
                        metric.as_str(),
                        MIN_SCORE,
                        MAX_SCORE
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Whole numbers go out as JSON integers.
pub(crate) fn serialize_score<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}

fn serialize_opt_score<S: Serializer>(v: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => serialize_score(v, s),
        None => s.serialize_none(),
    }
}

/// Scan result row.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub id: Uuid,
    pub uploaded_by: Uuid,
    #[serde(rename = "image")]
    pub image_id: Uuid,
    #[sqlx(flatten)]
    pub ai_scores: AiScores,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Scan joined with its image.
#[derive(Debug, FromRow)]
pub struct ScanImageRow {
    #[sqlx(flatten)]
    pub scan: ScanResult,
    pub image_url: String,
    pub image_uploaded_by: Uuid,
    pub image_uploaded_at: OffsetDateTime,
}

/// Scan result with the image populated, as listed in the history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedScan {
    pub id: Uuid,
    pub uploaded_by: Uuid,
    pub image: Image,
    pub ai_scores: AiScores,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<ScanImageRow> for PopulatedScan {
    fn from(r: ScanImageRow) -> Self {
        Self {
            id: r.scan.id,
            uploaded_by: r.scan.uploaded_by,
            image: Image {
                id: r.scan.image_id,
                image_url: r.image_url,
                uploaded_by: r.image_uploaded_by,
                uploaded_at: r.image_uploaded_at,
            },
            ai_scores: r.scan.ai_scores,
            created_at: r.scan.created_at,
            updated_at: r.scan.updated_at,
        }
    }
}
