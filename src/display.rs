//! Text rendering of the screen: countdown, confident labels, the temperature chart and the
//! toggle caption.

use std::fmt::Write;

use crate::{
    charts,
    prediction::PredictionSet,
    session::{SessionSnapshot, SessionStatus},
};

/// `m:ss`, e.g. `125 -> "2:05"`.
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub fn toggle_caption(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Idle | SessionStatus::Paused => "Start",
        SessionStatus::Running => "Pause/Resume",
        SessionStatus::Expired => "Done",
    }
}

pub fn label_container(predictions: &PredictionSet, threshold: f32) -> Vec<String> {
    predictions
        .confident_labels(threshold)
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// `labels` is the label container, see [`label_container`].
pub fn render_panel(snapshot: &SessionSnapshot, labels: &[String]) -> String {
    let mut out = String::new();
    let state = &snapshot.state;

    let _ = writeln!(out, "== {} ==", snapshot.pose_name);
    if !snapshot.model_loaded {
        let _ = writeln!(out, "(model unavailable)");
    }
    for label in labels {
        let _ = writeln!(out, "  {label}");
    }
    let _ = writeln!(out, "Remaining Time: {}", format_time(state.remaining_secs));
    if state.status == SessionStatus::Paused {
        let _ = writeln!(out, "Paused at: {}", format_time(state.paused_at_secs));
    }
    let _ = writeln!(out, "{}", charts::render_inline(&charts::temperature_series()));
    let _ = write!(out, "[{}]", toggle_caption(state.status));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Prediction;
    use crate::session::SessionState;
    use chrono::Utc;

    fn snapshot(state: SessionState) -> SessionSnapshot {
        SessionSnapshot {
            pose_name: "Tree".into(),
            state,
            model_loaded: true,
            camera_playing: false,
        }
    }

    #[test]
    fn formats_minutes_and_padded_seconds() {
        assert_eq!(format_time(120), "2:00");
        assert_eq!(format_time(125), "2:05");
        assert_eq!(format_time(59), "0:59");
        assert_eq!(format_time(0), "0:00");
    }

    #[test]
    fn caption_follows_status() {
        assert_eq!(toggle_caption(SessionStatus::Idle), "Start");
        assert_eq!(toggle_caption(SessionStatus::Paused), "Start");
        assert_eq!(toggle_caption(SessionStatus::Running), "Pause/Resume");
        assert_eq!(toggle_caption(SessionStatus::Expired), "Done");
    }

    #[test]
    fn paused_panel_shows_pause_point() {
        let mut state = SessionState::new();
        state.toggle("s".into(), Utc::now());
        for _ in 0..45 {
            state.tick();
        }
        state.toggle("s".into(), Utc::now());

        let predictions = PredictionSet::new(
            vec![
                Prediction::new("Tree", 0.95),
                Prediction::new("Tree", 0.99),
                Prediction::new("Cobra", 0.05),
            ],
            Utc::now(),
        );
        let labels = label_container(&predictions, 0.85);
        assert_eq!(labels, vec!["Tree"]);
        let panel = render_panel(&snapshot(state), &labels);

        assert!(panel.contains("== Tree =="));
        assert_eq!(panel.matches("  Tree").count(), 1);
        assert!(!panel.contains("Cobra"));
        assert!(panel.contains("Remaining Time: 1:15"));
        assert!(panel.contains("Paused at: 1:15"));
        assert!(panel.ends_with("[Start]"));
    }

    #[test]
    fn idle_panel_has_no_pause_line() {
        let labels = label_container(&PredictionSet::default(), 0.85);
        let panel = render_panel(&snapshot(SessionState::new()), &labels);
        assert!(panel.contains("Remaining Time: 2:00"));
        assert!(!panel.contains("Paused at"));
    }

    #[test]
    fn panel_carries_the_temperature_chart() {
        let panel = render_panel(&snapshot(SessionState::new()), &[]);
        let chart_line = panel
            .lines()
            .find(|line| line.starts_with("Temperature: "))
            .expect("temperature line");
        assert_eq!(chart_line.matches(" | ").count(), 5);
        assert!(chart_line.contains("09:30 37.1"));
        assert!(panel.ends_with("[Start]"));
    }
}
