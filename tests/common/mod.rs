#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use image::RgbImage;

use yogascreen_lib::{
    camera::{Camera, Frame},
    model::{ModelLoader, PoseModel},
    prediction::{Prediction, PredictionSet},
    reporter::StatusReporter,
    settings::ScreenSettings,
};

#[derive(Default)]
pub struct FakeCamera {
    playing: AtomicBool,
    pub frames: AtomicUsize,
}

#[async_trait]
impl Camera for FakeCamera {
    async fn next_frame(&self) -> Result<Frame> {
        if !self.is_playing() {
            bail!("paused");
        }
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(Frame::new(RgbImage::new(4, 4)))
    }

    fn play(&self) {
        self.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

/// Counters shared between a test and the model it hands to the screen.
#[derive(Default)]
pub struct ModelProbe {
    pub predictions: AtomicUsize,
    pub disposed: AtomicUsize,
    /// Fail every n-th inference when non-zero.
    pub fail_every: AtomicUsize,
    /// Panic on exactly the n-th inference when non-zero.
    pub panic_at: AtomicUsize,
}

pub struct FakeModel {
    probe: Arc<ModelProbe>,
}

#[async_trait]
impl PoseModel for FakeModel {
    async fn predict(&self, _frame: &Frame) -> Result<PredictionSet> {
        let n = self.probe.predictions.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.probe.panic_at.load(Ordering::SeqCst) {
            panic!("inference crashed on frame {n}");
        }
        let fail_every = self.probe.fail_every.load(Ordering::SeqCst);
        if fail_every != 0 && n % fail_every == 0 {
            bail!("inference blew up on frame {n}");
        }
        Ok(PredictionSet::new(
            vec![
                Prediction::new("Tree", 0.93),
                Prediction::new("Warrior", 0.05),
                Prediction::new("Tree", 0.90),
            ],
            Utc::now(),
        ))
    }

    fn total_classes(&self) -> usize {
        2
    }

    fn dispose(&self) {
        self.probe.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeLoader {
    pub probe: Arc<ModelProbe>,
    pub fail: bool,
}

impl FakeLoader {
    pub fn working() -> Self {
        Self {
            probe: Arc::new(ModelProbe::default()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            probe: Arc::new(ModelProbe::default()),
            fail: true,
        }
    }
}

#[async_trait]
impl ModelLoader for FakeLoader {
    async fn load(&self, _model_url: &str, _metadata_url: &str) -> Result<Box<dyn PoseModel>> {
        if self.fail {
            bail!("model download failed");
        }
        Ok(Box::new(FakeModel {
            probe: self.probe.clone(),
        }))
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub calls: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("reporter lock").clone()
    }
}

#[async_trait]
impl StatusReporter for RecordingReporter {
    async fn report_completion(&self, pose_name: &str) -> Result<()> {
        self.calls
            .lock()
            .expect("reporter lock")
            .push(pose_name.to_string());
        Ok(())
    }
}

pub fn test_settings() -> ScreenSettings {
    ScreenSettings {
        frame_interval_ms: 100,
        ..ScreenSettings::default()
    }
}
