use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.85;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// One model output for one frame. Replaced wholesale on every publish.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionSet {
    pub predictions: Vec<Prediction>,
    pub captured_at: Option<DateTime<Utc>>,
}

impl PredictionSet {
    pub fn new(predictions: Vec<Prediction>, captured_at: DateTime<Utc>) -> Self {
        Self {
            predictions,
            captured_at: Some(captured_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Labels strictly above `threshold`, deduplicated, in first-seen order.
    pub fn confident_labels(&self, threshold: f32) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.predictions
            .iter()
            .filter(|p| p.confidence > threshold)
            .map(|p| p.label.as_str())
            .filter(|label| seen.insert(*label))
            .collect()
    }

    pub fn top(&self) -> Option<&Prediction> {
        self.predictions
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, f32)]) -> PredictionSet {
        PredictionSet::new(
            pairs.iter().map(|(l, c)| Prediction::new(*l, *c)).collect(),
            Utc::now(),
        )
    }

    #[test]
    fn confident_labels_filters_and_dedupes() {
        let predictions = set(&[
            ("Tree", 0.91),
            ("Warrior", 0.40),
            ("Tree", 0.97),
            ("Cobra", 0.86),
        ]);
        assert_eq!(predictions.confident_labels(0.85), vec!["Tree", "Cobra"]);
    }

    #[test]
    fn threshold_is_exclusive() {
        let predictions = set(&[("Tree", 0.85)]);
        assert!(predictions.confident_labels(0.85).is_empty());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Prediction::new("x", 1.7).confidence, 1.0);
        assert_eq!(Prediction::new("x", -0.2).confidence, 0.0);
    }

    #[test]
    fn top_picks_highest_confidence() {
        let predictions = set(&[("Tree", 0.2), ("Cobra", 0.7), ("Warrior", 0.1)]);
        assert_eq!(predictions.top().map(|p| p.label.as_str()), Some("Cobra"));
        assert!(PredictionSet::default().top().is_none());
    }
}
