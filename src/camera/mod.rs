mod synthetic;

pub use synthetic::SyntheticCamera;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::RgbImage;

/// A single RGB frame captured from the live feed.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: Utc::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Live video source with play/pause control.
///
/// `next_frame` fails while the feed is paused or when the device yields nothing.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn next_frame(&self) -> Result<Frame>;

    fn play(&self);

    fn pause(&self);

    fn is_playing(&self) -> bool;
}
