//! Data behind the screen's auxiliary charts: weekly activity bars and a
//! temperature line. Only the series are modelled; drawing is left to the front end.

use std::fmt::Write;

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

impl DataPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// An ordered sequence of labelled points plus the axis keys a chart binds to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub title: &'static str,
    pub kind: ChartKind,
    pub x_key: &'static str,
    pub y_key: &'static str,
    pub points: Vec<DataPoint>,
}

impl ChartSeries {
    pub fn max_value(&self) -> Option<f64> {
        self.points.iter().map(|p| p.value).reduce(f64::max)
    }
}

/// Sessions completed per weekday.
pub fn activity_series() -> ChartSeries {
    let points = [
        ("Mon", 2.0),
        ("Tue", 3.0),
        ("Wed", 1.0),
        ("Thu", 4.0),
        ("Fri", 2.0),
        ("Sat", 5.0),
        ("Sun", 3.0),
    ]
    .into_iter()
    .map(|(day, sessions)| DataPoint::new(day, sessions))
    .collect();

    ChartSeries {
        title: "Activity",
        kind: ChartKind::Bar,
        x_key: "day",
        y_key: "sessions",
        points,
    }
}

/// Body temperature readings over a practice morning.
pub fn temperature_series() -> ChartSeries {
    let points = [
        ("08:00", 36.4),
        ("08:30", 36.6),
        ("09:00", 36.9),
        ("09:30", 37.1),
        ("10:00", 36.8),
        ("10:30", 36.6),
    ]
    .into_iter()
    .map(|(time, temperature)| DataPoint::new(time, temperature))
    .collect();

    ChartSeries {
        title: "Temperature",
        kind: ChartKind::Line,
        x_key: "time",
        y_key: "temperature",
        points,
    }
}

/// One line per point: `label  value`.
pub fn render_series(series: &ChartSeries) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} ({} by {})", series.title, series.y_key, series.x_key);
    for point in &series.points {
        let _ = write!(out, "\n  {:<6} {}", point.label, point.value);
    }
    out
}

/// Single-line form used inside the screen panel.
pub fn render_inline(series: &ChartSeries) -> String {
    let values: Vec<String> = series
        .points
        .iter()
        .map(|p| format!("{} {}", p.label, p.value))
        .collect();
    format!("{}: {}", series.title, values.join(" | "))
}
