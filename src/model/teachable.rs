use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use image::imageops::{self, FilterType};
use log::{debug, info};
use rand::Rng;
use serde::Deserialize;

use crate::{
    camera::Frame,
    prediction::{Prediction, PredictionSet},
};

use super::{ModelLoader, PoseModel};

const DEFAULT_IMAGE_SIZE: u32 = 224;
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Subset of a Teachable Machine `metadata.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub labels: Vec<String>,
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    #[serde(default)]
    pub model_name: Option<String>,
}

fn default_image_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

/// Loads Teachable Machine image models.
///
/// Only the metadata is interpreted here: classes come from `metadata.json` (or from
/// `preset_labels` when given) and inference is served by [`SimulatedClassifier`].
pub struct TeachableMachineLoader {
    client: reqwest::Client,
    preset_labels: Vec<String>,
}

impl TeachableMachineLoader {
    pub fn new(preset_labels: Vec<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            preset_labels,
        }
    }

    async fn fetch_metadata(&self, metadata_url: &str) -> Result<ModelMetadata> {
        let response = self
            .client
            .get(metadata_url)
            .send()
            .await
            .with_context(|| format!("failed to fetch model metadata from {metadata_url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("metadata request to {metadata_url} returned {status}");
        }

        response
            .json::<ModelMetadata>()
            .await
            .context("model metadata is not valid JSON")
    }
}

#[async_trait]
impl ModelLoader for TeachableMachineLoader {
    async fn load(&self, model_url: &str, metadata_url: &str) -> Result<Box<dyn PoseModel>> {
        let metadata = if self.preset_labels.is_empty() {
            self.fetch_metadata(metadata_url).await?
        } else {
            ModelMetadata {
                labels: self.preset_labels.clone(),
                image_size: DEFAULT_IMAGE_SIZE,
                model_name: None,
            }
        };

        if metadata.labels.is_empty() {
            bail!("model at {model_url} declares no classes");
        }

        info!(
            "loaded model {} with {} classes ({}px input)",
            metadata.model_name.as_deref().unwrap_or(model_url),
            metadata.labels.len(),
            metadata.image_size
        );

        Ok(Box::new(SimulatedClassifier::new(
            metadata.labels,
            metadata.image_size,
        )))
    }
}

/// Produces a softmax over the known classes, biased towards one class picked from
/// the frame's average brightness so that a steady feed yields steady predictions.
pub struct SimulatedClassifier {
    labels: Vec<String>,
    input_size: u32,
    disposed: AtomicBool,
}

impl SimulatedClassifier {
    pub fn new(labels: Vec<String>, input_size: u32) -> Self {
        Self {
            labels,
            input_size: input_size.max(1),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    fn classify(&self, frame: &Frame) -> Vec<Prediction> {
        let input = imageops::resize(
            &frame.image,
            self.input_size,
            self.input_size,
            FilterType::Nearest,
        );

        let pixels = u64::from(input.width() * input.height()).max(1);
        let luma_sum: u64 = input
            .pixels()
            .map(|p| (u64::from(p[0]) + u64::from(p[1]) + u64::from(p[2])) / 3)
            .sum();
        let dominant = ((luma_sum / pixels) as usize) % self.labels.len();

        let mut rng = rand::thread_rng();
        let logits: Vec<f32> = (0..self.labels.len())
            .map(|i| {
                let bias: f32 = if i == dominant { 4.0 } else { 0.0 };
                bias + rng.gen_range(-0.5..0.5)
            })
            .collect();

        let max = logits.iter().copied().fold(f32::MIN, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let total: f32 = exps.iter().sum();

        self.labels
            .iter()
            .zip(exps)
            .map(|(label, e)| Prediction::new(label.clone(), e / total))
            .collect()
    }
}

#[async_trait]
impl PoseModel for SimulatedClassifier {
    async fn predict(&self, frame: &Frame) -> Result<PredictionSet> {
        if self.is_disposed() {
            bail!("model has been disposed");
        }
        let predictions = self.classify(frame);
        debug!("classified frame captured at {}", frame.captured_at);
        Ok(PredictionSet::new(predictions, Utc::now()))
    }

    fn total_classes(&self) -> usize {
        self.labels.len()
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}
