use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_stream_url")]
    pub stream_url: String,
    #[serde(default = "default_history_url")]
    pub history_url: String,
    /// Earlier samples kept alongside the newest one.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Delta applied by the `+` / `-` controls.
    #[serde(default = "default_speed_step")]
    pub speed_step: f64,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            stream_url: default_stream_url(),
            history_url: default_history_url(),
            history_limit: default_history_limit(),
            speed_step: default_speed_step(),
        }
    }
}

fn default_stream_url() -> String {
    "ws://localhost:8080/ws".to_string()
}

fn default_history_url() -> String {
    "http://localhost:8080/api/sensors/history".to_string()
}

fn default_history_limit() -> usize {
    10
}

fn default_speed_step() -> f64 {
    5.0
}

impl TelemetrySettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.history_limit >= 1, "history_limit must be at least 1");
        anyhow::ensure!(
            self.stream_url.starts_with("ws://") || self.stream_url.starts_with("wss://"),
            "stream_url must be a ws:// or wss:// URL, got {}",
            self.stream_url
        );
        anyhow::ensure!(
            self.history_url.starts_with("http://") || self.history_url.starts_with("https://"),
            "history_url must be an http:// or https:// URL, got {}",
            self.history_url
        );
        anyhow::ensure!(
            self.speed_step.is_finite() && self.speed_step > 0.0,
            "speed_step must be a positive number"
        );
        Ok(())
    }
}

/// Load `config/telemetry.*` (optional) with `APP_TELEMETRY__*` overrides.
pub fn load_telemetry_config() -> anyhow::Result<TelemetryConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("config/telemetry").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"));

    build_telemetry_config(builder)
}

pub fn build_telemetry_config(
    builder: ConfigBuilder<DefaultState>,
) -> anyhow::Result<TelemetryConfig> {
    let config: TelemetryConfig = builder.build()?.try_deserialize()?;
    config.telemetry.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(source: &str) -> anyhow::Result<TelemetryConfig> {
        build_telemetry_config(
            config::Config::builder().add_source(File::from_str(source, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();

        assert_eq!(config.telemetry.stream_url, "ws://localhost:8080/ws");
        assert_eq!(
            config.telemetry.history_url,
            "http://localhost:8080/api/sensors/history"
        );
        assert_eq!(config.telemetry.history_limit, 10);
        assert_eq!(config.telemetry.speed_step, 5.0);
    }

    #[test]
    fn test_overrides() {
        let config = from_toml(
            r#"
            [telemetry]
            stream_url = "wss://plant.example/ws"
            history_limit = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.telemetry.stream_url, "wss://plant.example/ws");
        assert_eq!(config.telemetry.history_limit, 25);
        assert_eq!(config.telemetry.speed_step, 5.0);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        assert!(from_toml("[telemetry]\nhistory_limit = 0").is_err());
        assert!(from_toml("[telemetry]\nstream_url = \"http://localhost/ws\"").is_err());
        assert!(from_toml("[telemetry]\nhistory_url = \"ftp://localhost\"").is_err());
        assert!(from_toml("[telemetry]\nspeed_step = -5.0").is_err());
    }
}
