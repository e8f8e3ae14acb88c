use crate::domain::features::CapabilityFlags;
use crate::domain::series::NaiveZone;
use crate::domain::units::UnitSystem;
use crate::domain::window::TimeRangeWindow;
use anyhow::Context;
use chrono::FixedOffset;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub sensors: SensorSettings,
    #[serde(default)]
    pub polling: PollingSettings,
    /// Color overrides keyed by metric id
    #[serde(default)]
    pub palette: HashMap<String, String>,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// No timeout unless set; transport failures still surface
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorSettings {
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default = "default_true")]
    pub gas_sensor: bool,
    #[serde(default = "default_true")]
    pub particulate_sensor: bool,
    /// Wind comes from the OpenWeather integration on the board
    #[serde(default)]
    pub openweather: bool,
    #[serde(default)]
    pub fan_gpio: bool,
    /// Fixed offset for backend timestamps without a zone, e.g. "+02:00".
    /// Unset means the host time zone, DST included.
    #[serde(default)]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub default_window: TimeRangeWindow,
    #[serde(default)]
    pub pause_without_viewers: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_bind() -> String {
    "0.0.0.0:8090".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    2000
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            units: UnitSystem::default(),
            gas_sensor: true,
            particulate_sensor: true,
            openweather: false,
            fan_gpio: false,
            utc_offset: None,
        }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            default_window: TimeRangeWindow::default(),
            pause_without_viewers: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

impl AppConfig {
    pub fn capabilities(&self) -> CapabilityFlags {
        CapabilityFlags {
            has_wind: self.sensors.openweather,
            has_gas: self.sensors.gas_sensor,
            has_particulate: self.sensors.particulate_sensor,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    pub fn naive_zone(&self) -> anyhow::Result<NaiveZone> {
        match &self.sensors.utc_offset {
            Some(raw) => raw
                .parse::<FixedOffset>()
                .map(NaiveZone::Fixed)
                .with_context(|| format!("invalid sensors.utc_offset '{}'", raw)),
            None => Ok(NaiveZone::Local),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        // the particulate sensor plugs into the Enviro+ board, which has the gas sensor
        if self.sensors.particulate_sensor && !self.sensors.gas_sensor {
            anyhow::bail!("sensors.particulate_sensor requires sensors.gas_sensor");
        }
        if self.polling.interval_ms == 0 {
            anyhow::bail!("polling.interval_ms must be greater than zero");
        }
        self.naive_zone()?;
        Ok(())
    }
}

/// `config/dashboard.toml` (optional) overlaid with `ENVIRO__SECTION__KEY` variables
pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("ENVIRO")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(settings)
}

fn finish(settings: config::Config) -> anyhow::Result<AppConfig> {
    let config: AppConfig = settings
        .try_deserialize()
        .context("failed to parse dashboard configuration")?;
    config.validate()?;
    Ok(config)
}
