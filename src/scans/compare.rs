//! Per-metric difference between two scan results.
//!
//! `difference` is `first - second`: a positive value means the first result
//! scored higher. Callers pick the order; timestamps are not consulted.

use std::collections::BTreeMap;

use serde::Serialize;

use super::repo_types::{serialize_score, AiScores, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    #[serde(serialize_with = "serialize_score")]
    pub before: f64,
    #[serde(serialize_with = "serialize_score")]
    pub after: f64,
    #[serde(serialize_with = "serialize_score")]
    pub difference: f64,
}

/// Metrics present in both inputs, keyed by their JSON name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Comparison(pub BTreeMap<Metric, MetricDelta>);

#[cfg(test)]
impl Comparison {
    pub fn get(&self, metric: Metric) -> Option<&MetricDelta> {
        self.0.get(&metric)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn compare_scores(first: &AiScores, second: &AiScores) -> Comparison {
    let deltas = Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let before = first.get(metric)?;
            let after = second.get(metric)?;
            Some((
                metric,
                MetricDelta {
                    before,
                    after,
                    difference: before - after,
                },
            ))
        })
        .collect();
    Comparison(deltas)
}
