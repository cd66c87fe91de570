use std::str::FromStr;

use crate::{
    charts::{self, ChartSeries},
    display,
    screen::YogaScreen,
};

use super::{SessionController, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCommand {
    Toggle,
    Status,
    Reset,
    Charts,
    Back,
}

impl FromStr for ScreenCommand {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "t" | "toggle" | "start" | "pause" | "resume" => Ok(ScreenCommand::Toggle),
            "s" | "status" => Ok(ScreenCommand::Status),
            "r" | "reset" => Ok(ScreenCommand::Reset),
            "c" | "charts" => Ok(ScreenCommand::Charts),
            "b" | "back" | "q" | "quit" | "exit" => Ok(ScreenCommand::Back),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn controller_from_screen(screen: &YogaScreen) -> SessionController {
    screen.controller().clone()
}

pub async fn get_session_state(screen: &YogaScreen) -> Result<SessionSnapshot, String> {
    let controller = controller_from_screen(screen);
    Ok(controller.get_snapshot().await)
}

pub async fn toggle_session(screen: &YogaScreen) -> Result<SessionSnapshot, String> {
    let controller = controller_from_screen(screen);
    controller.toggle().await.map_err(|e| e.to_string())
}

pub async fn reset_session(screen: &YogaScreen) -> Result<SessionSnapshot, String> {
    let controller = controller_from_screen(screen);
    controller.reset().await.map_err(|e| e.to_string())
}

pub fn get_confident_labels(screen: &YogaScreen) -> Vec<String> {
    let controller = controller_from_screen(screen);
    display::label_container(
        &controller.latest_predictions(),
        screen.settings().confidence_threshold,
    )
}

pub fn get_chart_series() -> Vec<ChartSeries> {
    vec![charts::activity_series(), charts::temperature_series()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("".parse::<ScreenCommand>(), Ok(ScreenCommand::Toggle));
        assert_eq!(" Pause ".parse::<ScreenCommand>(), Ok(ScreenCommand::Toggle));
        assert_eq!("status".parse::<ScreenCommand>(), Ok(ScreenCommand::Status));
        assert_eq!("r".parse::<ScreenCommand>(), Ok(ScreenCommand::Reset));
        assert_eq!("charts".parse::<ScreenCommand>(), Ok(ScreenCommand::Charts));
        assert_eq!("back".parse::<ScreenCommand>(), Ok(ScreenCommand::Back));
        assert!("jump".parse::<ScreenCommand>().is_err());
    }

    #[test]
    fn chart_series_cover_activity_and_temperature() {
        let titles: Vec<&str> = get_chart_series().iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Activity", "Temperature"]);
    }
}
