// Metrics projection - Latest-sample view, chart series and operator commands
use crate::domain::command::Command;
use crate::domain::dashboard::Dashboard;
use crate::domain::sample::Sample;
use crate::domain::telemetry::{ChartSeries, Metric};
use chrono::Local;

/// Most recent sample in the window, or `None` before any data arrived.
pub fn latest(window: &[Sample]) -> Option<&Sample> {
    window.last()
}

/// Build the command for an operator speed change.
///
/// No bounds are applied here; the server clamps the resulting speed.
pub fn issue_speed_adjustment(delta: f64) -> Command {
    Command::speed_delta(delta)
}

/// Project one metric of the window into a chart series keyed by time labels.
pub fn chart_series(window: &[Sample], metric: Metric) -> ChartSeries {
    let labels = window.iter().map(time_label).collect();
    let values = window.iter().map(|s| metric.value(s)).collect();
    ChartSeries::new(metric, labels, values)
}

pub fn project_dashboard(window: &[Sample]) -> Dashboard {
    let charts = Metric::ALL
        .into_iter()
        .map(|metric| chart_series(window, metric))
        .collect();

    Dashboard::new(latest(window).cloned(), charts)
}

/// Local wall-clock label used on chart axes.
pub fn time_label(sample: &Sample) -> String {
    sample
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}
