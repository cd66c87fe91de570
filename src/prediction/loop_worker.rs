use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{camera::Camera, model::PoseModel};

use super::PredictionSet;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub frame_interval: Duration,
    pub inference_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(33),
            inference_timeout: Duration::from_secs(2),
        }
    }
}

/// Samples the camera and publishes the latest model output until `cancel_token` fires.
///
/// A frame that fails to capture, fails to classify or exceeds the inference timeout is
/// dropped; the next tick retries.
pub async fn prediction_loop(
    model: Arc<dyn PoseModel>,
    camera: Arc<dyn Camera>,
    publisher: Arc<watch::Sender<PredictionSet>>,
    config: PollerConfig,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut published: u64 = 0;
    let mut skipped: u64 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let outcome = tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => break,
                    result = tokio::time::timeout(
                        config.inference_timeout,
                        classify_next_frame(model.as_ref(), camera.as_ref()),
                    ) => result,
                };

                match outcome {
                    Ok(Ok(predictions)) => {
                        if cancel_token.is_cancelled() {
                            break;
                        }
                        publisher.send_replace(predictions);
                        published += 1;
                    }
                    Ok(Err(err)) => {
                        skipped += 1;
                        log_warn!("prediction skipped: {err:#}");
                    }
                    Err(_) => {
                        skipped += 1;
                        log_warn!(
                            "inference timeout (> {}ms), frame dropped",
                            config.inference_timeout.as_millis()
                        );
                    }
                }
            }
        }
    }

    log_debug!("prediction loop stats: {published} published, {skipped} skipped");
    log_info!("prediction loop shutting down");
}

async fn classify_next_frame(model: &dyn PoseModel, camera: &dyn Camera) -> Result<PredictionSet> {
    let frame = camera.next_frame().await.context("frame capture failed")?;
    model.predict(&frame).await.context("inference failed")
}
