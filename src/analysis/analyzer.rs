use async_trait::async_trait;
use rand::Rng;

use crate::{
    images::repo_types::Image,
    scans::repo_types::{AiScores, Metric},
};

/// Turns a stored image into skin-condition scores.
#[async_trait]
pub trait SkinAnalyzer: Send + Sync {
    async fn analyze(&self, image: &Image) -> anyhow::Result<AiScores>;
}

/// Placeholder scorer: every metric is an independent integer in [0, 100].
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomAnalyzer;

pub(crate) fn random_scores<R: Rng + ?Sized>(rng: &mut R) -> AiScores {
    let mut scores = AiScores::default();
    for metric in Metric::ALL {
        scores.set(metric, f64::from(rng.gen_range(0u8..=100)));
    }
    scores
}

#[async_trait]
impl SkinAnalyzer for RandomAnalyzer {
    async fn analyze(&self, _image: &Image) -> anyhow::Result<AiScores> {
        Ok(random_scores(&mut rand::thread_rng()))
    }
}

/// Always returns the same scores.
#[cfg(test)]
pub(crate) struct FixedAnalyzer(pub AiScores);

#[cfg(test)]
#[async_trait]
impl SkinAnalyzer for FixedAnalyzer {
    async fn analyze(&self, _image: &Image) -> anyhow::Result<AiScores> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn random_scores_fill_every_metric_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let scores = random_scores(&mut rng);
            assert!(scores.validate().is_ok());
            for metric in Metric::ALL {
                let v = scores.get(metric).unwrap();
                assert_eq!(v.fract(), 0.0);
            }
        }
    }

    #[tokio::test]
    async fn random_analyzer_returns_complete_scores() {
        let image = Image {
            id: Uuid::new_v4(),
            image_url: "https://fake.local/x.jpg".into(),
            uploaded_by: Uuid::new_v4(),
            uploaded_at: OffsetDateTime::now_utc(),
        };
        let scores = RandomAnalyzer.analyze(&image).await.unwrap();
        assert!(Metric::ALL.iter().all(|m| scores.get(*m).is_some()));
    }
}
