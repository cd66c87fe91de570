pub mod camera;
pub mod charts;
pub mod cli;
pub mod display;
pub mod model;
pub mod prediction;
pub mod reporter;
pub mod screen;
pub mod session;
pub mod settings;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use camera::{Camera, SyntheticCamera};
use cli::Cli;
use model::TeachableMachineLoader;
use reporter::{HttpStatusReporter, StatusReporter};
use screen::YogaScreen;
use session::{
    commands::{
        get_chart_series, get_confident_labels, get_session_state, reset_session, toggle_session,
        ScreenCommand,
    },
    ScreenEvent, SessionController,
};
use settings::SettingsStore;

pub fn run() -> Result<()> {
    utils::init_logging();

    info!("yogascreen starting up...");

    let cli = Cli::parse_args();

    // Timer callbacks and frame polling interleave on one thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(run_screen(cli))
}

async fn run_screen(cli: Cli) -> Result<()> {
    let store = SettingsStore::new(cli.settings.clone())?;
    let mut settings = store.settings();
    if let Some(endpoint) = &cli.endpoint {
        settings.status_endpoint = endpoint.clone();
    }
    if !cli.labels.is_empty() {
        settings.labels = cli.labels.clone();
    }
    if cli.save_settings {
        let effective = settings.clone();
        settings = store.update(|s| *s = effective)?;
        info!("settings saved to {}", store.path().display());
    }

    let loader = TeachableMachineLoader::new(settings.labels.clone());
    let camera: Arc<dyn Camera> = Arc::new(SyntheticCamera::default());
    let reporter: Arc<dyn StatusReporter> = Arc::new(HttpStatusReporter::new(
        settings.status_endpoint.clone(),
        settings.report_timeout(),
    ));

    let mut screen = YogaScreen::mount(settings, cli.pose.clone(), &loader, camera, reporter).await;
    let threshold = screen.settings().confidence_threshold;

    let renderer = spawn_renderer(screen.controller().clone(), threshold);
    print_status(&screen).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.parse::<ScreenCommand>() {
            Ok(ScreenCommand::Toggle) => {
                if let Err(e) = toggle_session(&screen).await {
                    error!("toggle failed: {e}");
                }
            }
            Ok(ScreenCommand::Status) => print_status(&screen).await,
            Ok(ScreenCommand::Charts) => {
                for series in get_chart_series() {
                    println!("{}", charts::render_series(&series));
                }
            }
            Ok(ScreenCommand::Reset) => {
                if let Err(e) = reset_session(&screen).await {
                    error!("reset failed: {e}");
                }
            }
            Ok(ScreenCommand::Back) => break,
            Err(message) => warn!("{message}"),
        }
    }

    renderer.abort();
    screen.unmount().await
}

async fn print_status(screen: &YogaScreen) {
    match get_session_state(screen).await {
        Ok(snapshot) => {
            let labels = get_confident_labels(screen);
            println!("{}", display::render_panel(&snapshot, &labels));
        }
        Err(e) => error!("failed to read session state: {e}"),
    }
}

fn spawn_renderer(controller: SessionController, threshold: f32) -> JoinHandle<()> {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ScreenEvent::SessionChanged { .. }) | Ok(ScreenEvent::Tick { .. }) => {
                    let snapshot = controller.get_snapshot().await;
                    let labels = display::label_container(&controller.latest_predictions(), threshold);
                    println!("{}", display::render_panel(&snapshot, &labels));
                }
                Ok(ScreenEvent::SessionExpired { pose_name, .. }) => {
                    println!("Session complete: {pose_name}");
                }
                Ok(ScreenEvent::Heartbeat { snapshot }) => {
                    log::debug!("heartbeat: {} remaining", snapshot.remaining_secs());
                }
                Err(RecvError::Lagged(missed)) => {
                    log::debug!("renderer skipped {missed} events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
