use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use image::{Rgb, RgbImage};
use rand::Rng;

use super::{Camera, Frame};

const DEFAULT_WIDTH: u32 = 320;
const DEFAULT_HEIGHT: u32 = 240;

/// Renders a drifting gradient with sensor noise. Stands in for a webcam.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    playing: AtomicBool,
    frame_counter: AtomicU64,
}

impl SyntheticCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            playing: AtomicBool::new(false),
            frame_counter: AtomicU64::new(0),
        }
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_counter.load(Ordering::Relaxed)
    }

    fn render(&self, index: u64) -> RgbImage {
        let mut rng = rand::thread_rng();
        let shift = (index % 256) as u32;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let noise: u8 = rng.gen_range(0..16);
            let r = ((x * 255 / self.width + shift) % 256) as u8;
            let g = ((y * 255 / self.height) % 256) as u8;
            let b = (shift as u8).wrapping_add(noise);
            Rgb([r, g, b])
        })
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

#[async_trait]
impl Camera for SyntheticCamera {
    async fn next_frame(&self) -> Result<Frame> {
        if !self.is_playing() {
            bail!("camera feed is paused");
        }
        let index = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        Ok(Frame::new(self.render(index)))
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
