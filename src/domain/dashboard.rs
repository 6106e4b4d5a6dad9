// Dashboard domain model - Everything the display layer reads from one window
use super::sample::Sample;
use super::telemetry::ChartSeries;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub latest: Option<Sample>,
    pub charts: Vec<ChartSeries>,
}

impl Dashboard {
    pub fn new(latest: Option<Sample>, charts: Vec<ChartSeries>) -> Self {
        Self { latest, charts }
    }
}
