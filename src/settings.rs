use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::{
    prediction::{PollerConfig, DEFAULT_CONFIDENCE_THRESHOLD},
    session::DEFAULT_SESSION_SECS,
};

pub const DEFAULT_MODEL_BASE_URL: &str = "https://teachablemachine.withgoogle.com/models/uPxqNRgpF/";
pub const DEFAULT_STATUS_ENDPOINT: &str = "http://localhost:3000/api/updateStatus";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenSettings {
    pub session_secs: u32,
    pub tick_ms: u64,
    pub frame_interval_ms: u64,
    pub inference_timeout_ms: u64,
    pub confidence_threshold: f32,
    pub status_endpoint: String,
    pub report_timeout_ms: u64,
    pub model_base_url: String,
    /// Skips the metadata fetch when non-empty.
    pub labels: Vec<String>,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            session_secs: DEFAULT_SESSION_SECS,
            tick_ms: 1000,
            frame_interval_ms: 33,
            inference_timeout_ms: 2000,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            status_endpoint: DEFAULT_STATUS_ENDPOINT.into(),
            report_timeout_ms: 5000,
            model_base_url: DEFAULT_MODEL_BASE_URL.into(),
            labels: Vec::new(),
        }
    }
}

impl ScreenSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_millis(self.report_timeout_ms)
    }

    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            frame_interval: Duration::from_millis(self.frame_interval_ms.max(1)),
            inference_timeout: Duration::from_millis(self.inference_timeout_ms.max(1)),
        }
    }

    pub fn model_url(&self) -> String {
        format!("{}model.json", self.base_url_with_slash())
    }

    pub fn metadata_url(&self) -> String {
        format!("{}metadata.json", self.base_url_with_slash())
    }

    fn base_url_with_slash(&self) -> String {
        if self.model_base_url.ends_with('/') {
            self.model_base_url.clone()
        } else {
            format!("{}/", self.model_base_url)
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<ScreenSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings in {}: {err}", path.display());
                ScreenSettings::default()
            })
        } else {
            ScreenSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn settings(&self) -> ScreenSettings {
        self.data
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Applies `edit` and writes the result back to disk.
    pub fn update(&self, edit: impl FnOnce(&mut ScreenSettings)) -> Result<ScreenSettings> {
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        edit(&mut guard);
        self.persist(&guard)?;
        Ok(guard.clone())
    }

    fn persist(&self, data: &ScreenSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
