mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeCamera, FakeLoader};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yogascreen_lib::{
    reporter::HttpStatusReporter, screen::YogaScreen, session::SessionStatus,
    settings::ScreenSettings,
};

fn fast_settings(endpoint: String) -> ScreenSettings {
    ScreenSettings {
        session_secs: 3,
        tick_ms: 20,
        frame_interval_ms: 10,
        status_endpoint: endpoint,
        report_timeout_ms: 2_000,
        ..ScreenSettings::default()
    }
}

async fn run_to_expiry(server: &MockServer, pose: &str) -> YogaScreen {
    let settings = fast_settings(format!("{}/api/updateStatus", server.uri()));
    let reporter = Arc::new(HttpStatusReporter::new(
        settings.status_endpoint.clone(),
        settings.report_timeout(),
    ));
    let loader = FakeLoader::working();
    let screen = YogaScreen::mount(
        settings,
        pose,
        &loader,
        Arc::new(FakeCamera::default()),
        reporter,
    )
    .await;

    screen.controller().toggle().await.expect("start");
    tokio::time::sleep(Duration::from_millis(500)).await;
    screen
}

#[tokio::test]
async fn expired_session_posts_pose_name_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/updateStatus"))
        .and(body_json(serde_json::json!({ "poseName": "Warrior" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut screen = run_to_expiry(&server, "Warrior").await;
    assert_eq!(
        screen.controller().get_state().await.status,
        SessionStatus::Expired
    );

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);

    screen.unmount().await.expect("unmount");
}

#[tokio::test]
async fn failed_report_does_not_disturb_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut screen = run_to_expiry(&server, "Cobra").await;
    let state = screen.controller().get_state().await;
    assert_eq!(state.status, SessionStatus::Expired);
    assert_eq!(state.remaining_secs, 0);

    let snapshot = screen.controller().reset().await.expect("reset after failure");
    assert_eq!(snapshot.status(), SessionStatus::Idle);

    screen.unmount().await.expect("unmount");
}
