use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{camera::Camera, model::PoseModel};

use super::loop_worker::{prediction_loop, PollerConfig};
use super::PredictionSet;

/// Starts and stops the prediction loop and holds the channel its output is published on.
pub struct PredictionPoller {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    publisher: Arc<watch::Sender<PredictionSet>>,
    config: PollerConfig,
}

impl PredictionPoller {
    pub fn new(config: PollerConfig) -> Self {
        let (publisher, _) = watch::channel(PredictionSet::default());
        Self {
            handle: None,
            cancel_token: None,
            publisher: Arc::new(publisher),
            config,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PredictionSet> {
        self.publisher.subscribe()
    }

    pub fn latest(&self) -> PredictionSet {
        self.publisher.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start_polling(&mut self, model: Arc<dyn PoseModel>, camera: Arc<dyn Camera>) -> Result<()> {
        if self.handle.is_some() {
            bail!("prediction polling already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(prediction_loop(
            model,
            camera,
            self.publisher.clone(),
            self.config,
            cancel_token.clone(),
        ));

        info!("prediction polling started");
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancels the loop and waits for it, so nothing is published after this returns.
    pub async fn stop_polling(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("prediction loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }

    /// Non-blocking variant for drop paths.
    pub fn abort(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for PredictionPoller {
    fn drop(&mut self) {
        self.abort();
    }
}
