// Console dashboard - Text rendering of cards and charts plus speed controls
use crate::application::metrics_projection::{issue_speed_adjustment, project_dashboard};
use crate::domain::command::Command;
use crate::domain::dashboard::Dashboard;
use crate::domain::sample::Sample;
use crate::domain::telemetry::{ChartSeries, Metric};
use std::io::BufRead;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Summary cards for the newest sample; `None` when there is no data yet.
pub fn render_cards(latest: Option<&Sample>) -> Option<String> {
    let sample = latest?;
    let cards: Vec<String> = Metric::ALL
        .into_iter()
        .map(|m| format!("{}: {:.2} {}", m.title(), m.value(sample), m.unit()))
        .collect();
    Some(cards.join(" | "))
}

pub fn render_chart(series: &ChartSeries) -> String {
    let range = match (series.labels.first(), series.labels.last()) {
        (Some(first), Some(last)) => format!("[{} .. {}]", first, last),
        _ => "[no data]".to_string(),
    };
    let values: Vec<String> = series.values.iter().map(|v| format!("{:.2}", v)).collect();
    format!("{} {} {}", series.label, range, values.join(" "))
        .trim_end()
        .to_string()
}

pub fn render(dashboard: &Dashboard) -> String {
    let mut lines = Vec::new();
    if let Some(cards) = render_cards(dashboard.latest.as_ref()) {
        lines.push(cards);
    }
    lines.extend(dashboard.charts.iter().map(render_chart));
    lines.join("\n")
}

/// Parse an operator control line into a speed delta.
///
/// `+` and `-` step by `step`; an explicit signed number is used as is.
pub fn parse_control(line: &str, step: f64) -> Option<f64> {
    match line.trim() {
        "" => None,
        "+" => Some(step),
        "-" => Some(-step),
        other => other.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Redraw whenever the session publishes a new window.
pub async fn run_dashboard(mut snapshots: watch::Receiver<Vec<Sample>>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let dashboard = project_dashboard(&snapshots.borrow_and_update());
                println!("{}\n", render(&dashboard));
            }
        }
    }
}

/// Read stdin on a detached OS thread and forward each line.
///
/// A blocking read cannot be cancelled, so the thread is never joined; it
/// ends with the process or when the receiver goes away.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read control input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Turn operator input lines into speed commands for the session.
pub async fn run_controls(
    mut lines: mpsc::Receiver<String>,
    commands: mpsc::Sender<Command>,
    step: f64,
    shutdown: CancellationToken,
) {
    println!("Type + / - to change speed by {}, or a signed number", step);

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.recv() => line,
        };

        let Some(line) = line else { break };
        match parse_control(&line, step) {
            Some(delta) => {
                if commands.send(issue_speed_adjustment(delta)).await.is_err() {
                    break;
                }
            }
            None => tracing::warn!("Ignoring unrecognised control input: {:?}", line),
        }
    }
}
