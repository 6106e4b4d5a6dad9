// Telemetry chart domain models
use super::sample::Sample;

/// The three metrics every sample can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Speed,
    Temperature,
    Pressure,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Speed, Metric::Temperature, Metric::Pressure];

    pub fn title(self) -> &'static str {
        match self {
            Metric::Speed => "Velocity",
            Metric::Temperature => "Temperature",
            Metric::Pressure => "Pressure",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::Speed => "km/h",
            Metric::Temperature => "°C",
            Metric::Pressure => "Pa",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Metric::Speed => "red",
            Metric::Temperature => "blue",
            Metric::Pressure => "green",
        }
    }

    /// Raw value as stored, `None` when the source omitted it.
    pub fn raw_value(self, sample: &Sample) -> Option<f64> {
        match self {
            Metric::Speed => sample.speed,
            Metric::Temperature => sample.temperature,
            Metric::Pressure => sample.pressure,
        }
    }

    /// Value for display; missing readings count as 0.
    pub fn value(self, sample: &Sample) -> f64 {
        self.raw_value(sample).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub metric: Metric,
    pub label: String,
    pub color: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn new(metric: Metric, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            metric,
            label: format!("{} ({})", metric.title(), metric.unit()),
            color: metric.color(),
            labels,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
