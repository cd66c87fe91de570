use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{bail, Result};
use chrono::Utc;
use log::{error, info, warn};
use serde::Serialize;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{self, Instant},
};
use uuid::Uuid;

use crate::{
    camera::Camera,
    model::PoseModel,
    prediction::{PollerConfig, PredictionPoller, PredictionSet},
    reporter::StatusReporter,
    settings::ScreenSettings,
};

use super::{SessionState, SessionStatus, TickOutcome, Transition};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub pose_name: String,
    pub session_secs: u32,
    pub tick_interval: Duration,
    pub heartbeat_every_ticks: u32,
    pub poller: PollerConfig,
}

impl ControllerConfig {
    pub fn from_settings(pose_name: impl Into<String>, settings: &ScreenSettings) -> Self {
        let debug_mode = std::env::var("YOGASCREEN_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            pose_name: pose_name.into(),
            session_secs: settings.session_secs,
            tick_interval: settings.tick_interval(),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
            poller: settings.poller_config(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub pose_name: String,
    pub state: SessionState,
    pub model_loaded: bool,
    pub camera_playing: bool,
}

impl SessionSnapshot {
    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_secs
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScreenEvent {
    SessionChanged {
        snapshot: SessionSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    Tick {
        remaining_secs: u32,
    },
    Heartbeat {
        snapshot: SessionSnapshot,
    },
    #[serde(rename_all = "camelCase")]
    SessionExpired {
        session_id: Option<String>,
        pose_name: String,
    },
}

/// Drives one screen's session: the countdown ticker, the prediction poller, the
/// camera feed and the completion report.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    /// Serializes toggles, resets, shutdown and ticks against each other.
    transition: Arc<Mutex<()>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    /// Set by shutdown; a closed controller never starts the ticker or the poller again.
    closed: Arc<AtomicBool>,
    poller: Arc<Mutex<PredictionPoller>>,
    predictions: watch::Receiver<PredictionSet>,
    events: broadcast::Sender<ScreenEvent>,
    model: Option<Arc<dyn PoseModel>>,
    camera: Arc<dyn Camera>,
    reporter: Arc<dyn StatusReporter>,
    pose_name: String,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl SessionController {
    pub fn new(
        config: ControllerConfig,
        model: Option<Arc<dyn PoseModel>>,
        camera: Arc<dyn Camera>,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        let poller = PredictionPoller::new(config.poller);
        let predictions = poller.subscribe();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(SessionState::with_duration(config.session_secs))),
            transition: Arc::new(Mutex::new(())),
            ticker: Arc::new(Mutex::new(None)),
            closed: Arc::new(AtomicBool::new(false)),
            poller: Arc::new(Mutex::new(poller)),
            predictions,
            events,
            model,
            camera,
            reporter,
            pose_name: config.pose_name,
            tick_interval: config.tick_interval,
            heartbeat_every_ticks: config.heartbeat_every_ticks.max(1),
        }
    }

    pub fn pose_name(&self) -> &str {
        &self.pose_name
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ScreenEvent> {
        self.events.subscribe()
    }

    pub fn subscribe_predictions(&self) -> watch::Receiver<PredictionSet> {
        self.predictions.clone()
    }

    pub fn latest_predictions(&self) -> PredictionSet {
        self.predictions.borrow().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn get_state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn get_snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await.clone();
        SessionSnapshot {
            pose_name: self.pose_name.clone(),
            state,
            model_loaded: self.model.is_some() && !self.is_closed(),
            camera_playing: self.camera.is_playing(),
        }
    }

    pub async fn toggle(&self) -> Result<SessionSnapshot> {
        let _transition = self.transition.lock().await;
        if self.is_closed() {
            bail!("screen for {} is unmounted", self.pose_name);
        }

        let transition = {
            let mut state = self.state.lock().await;
            state.toggle(Uuid::new_v4().to_string(), Utc::now())
        };

        match transition {
            Transition::Started | Transition::Resumed => {
                self.camera.play();
                self.start_polling().await;
                self.spawn_ticker().await;
                info!("session {:?} for {}", transition, self.pose_name);
            }
            Transition::Paused => {
                self.cancel_ticker().await;
                if let Err(e) = self.poller.lock().await.stop_polling().await {
                    error!("Failed to stop prediction polling on pause: {e:#}");
                }
                self.camera.pause();
                info!("session paused for {}", self.pose_name);
            }
            Transition::Ignored => {
                info!("toggle ignored: session already expired");
            }
        }

        let snapshot = self.get_snapshot().await;
        self.emit(ScreenEvent::SessionChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Returns the session to Idle from any state so a new one can be started.
    pub async fn reset(&self) -> Result<SessionSnapshot> {
        let _transition = self.transition.lock().await;
        if self.is_closed() {
            bail!("screen for {} is unmounted", self.pose_name);
        }

        if let Err(e) = self.halt().await {
            error!("Failed to stop prediction polling on reset: {e:#}");
        }
        self.state.lock().await.reset();
        info!("session reset for {}", self.pose_name);

        let snapshot = self.get_snapshot().await;
        self.emit(ScreenEvent::SessionChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Deregisters the ticker, stops polling and pauses the camera. Session state is kept,
    /// but the controller is closed: later toggles and resets are refused.
    pub async fn shutdown(&self) -> Result<()> {
        let _transition = self.transition.lock().await;
        self.closed.store(true, Ordering::SeqCst);
        self.halt().await
    }

    /// Best-effort teardown usable from `Drop`: aborts background tasks without waiting.
    pub fn abort_background(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Ok(mut ticker) = self.ticker.try_lock() {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
        if let Ok(mut poller) = self.poller.try_lock() {
            poller.abort();
        }
        self.camera.pause();
    }

    /// The camera is paused even when the poller fails to join.
    async fn halt(&self) -> Result<()> {
        self.cancel_ticker().await;
        let stopped = self.poller.lock().await.stop_polling().await;
        self.camera.pause();
        stopped
    }

    async fn start_polling(&self) {
        if self.is_closed() {
            return;
        }
        let Some(model) = self.model.clone() else {
            warn!("model not loaded; predictions unavailable for this session");
            return;
        };

        let mut poller = self.poller.lock().await;
        if poller.is_active() {
            return;
        }
        if let Err(err) = poller.start_polling(model, self.camera.clone()) {
            error!("Failed to start prediction polling: {err}");
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let controller = self.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            // The first tick lands one full period after (re)starting.
            let mut interval = time::interval_at(Instant::now() + tick_interval, tick_interval);
            let mut ticks: u32 = 0;
            loop {
                interval.tick().await;
                ticks = ticks.wrapping_add(1);
                if !controller.on_tick(ticks).await {
                    break;
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    /// Applies one tick. Returns false once the ticker should stop.
    async fn on_tick(&self, ticks: u32) -> bool {
        let _transition = self.transition.lock().await;
        if self.is_closed() {
            return false;
        }

        let (outcome, report_due, session_id) = {
            let mut state = self.state.lock().await;
            let outcome = state.tick();
            (outcome, state.take_expiry_report(), state.session_id.clone())
        };

        match outcome {
            TickOutcome::Ignored => false,
            TickOutcome::Counted { remaining_secs } => {
                self.emit(ScreenEvent::Tick { remaining_secs });
                if ticks % self.heartbeat_every_ticks == 0 {
                    let snapshot = self.get_snapshot().await;
                    self.emit(ScreenEvent::Heartbeat { snapshot });
                }
                true
            }
            TickOutcome::Expired => {
                self.emit(ScreenEvent::Tick { remaining_secs: 0 });

                if let Err(e) = self.poller.lock().await.stop_polling().await {
                    error!("Failed to stop prediction polling on expiry: {e}");
                }
                self.camera.pause();

                let snapshot = self.get_snapshot().await;
                self.emit(ScreenEvent::SessionChanged { snapshot });

                if report_due {
                    info!("session {:?} complete for {}", session_id, self.pose_name);
                    self.emit(ScreenEvent::SessionExpired {
                        session_id,
                        pose_name: self.pose_name.clone(),
                    });
                    self.dispatch_report();
                }
                false
            }
        }
    }

    fn dispatch_report(&self) {
        let reporter = self.reporter.clone();
        let pose_name = self.pose_name.clone();
        tokio::spawn(async move {
            if let Err(e) = reporter.report_completion(&pose_name).await {
                error!("Failed to update yoga pose status for {pose_name}: {e:#}");
            }
        });
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn emit(&self, event: ScreenEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
