// Metric identifiers and descriptors
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Every quantity the sensor board (or the weather API) can report.
/// Serialized names match the keys the backend uses in its JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricId {
    #[serde(rename = "temp")]
    Temperature,
    #[serde(rename = "humi")]
    Humidity,
    #[serde(rename = "pres")]
    Pressure,
    #[serde(rename = "lux")]
    Light,
    #[serde(rename = "high")]
    NoiseHigh,
    #[serde(rename = "mid")]
    NoiseMid,
    #[serde(rename = "low")]
    NoiseLow,
    #[serde(rename = "amp")]
    NoiseAmp,
    #[serde(rename = "nh3")]
    Ammonia,
    #[serde(rename = "red")]
    Reducing,
    #[serde(rename = "oxi")]
    Oxidising,
    #[serde(rename = "pm1")]
    Pm1,
    #[serde(rename = "pm25")]
    Pm25,
    #[serde(rename = "pm10")]
    Pm10,
    #[serde(rename = "windDir")]
    WindDirection,
    #[serde(rename = "windSp")]
    WindSpeed,
}

impl MetricId {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricId::Temperature => "temp",
            MetricId::Humidity => "humi",
            MetricId::Pressure => "pres",
            MetricId::Light => "lux",
            MetricId::NoiseHigh => "high",
            MetricId::NoiseMid => "mid",
            MetricId::NoiseLow => "low",
            MetricId::NoiseAmp => "amp",
            MetricId::Ammonia => "nh3",
            MetricId::Reducing => "red",
            MetricId::Oxidising => "oxi",
            MetricId::Pm1 => "pm1",
            MetricId::Pm25 => "pm25",
            MetricId::Pm10 => "pm10",
            MetricId::WindDirection => "windDir",
            MetricId::WindSpeed => "windSp",
        }
    }

    pub fn group(self) -> FeatureGroup {
        match self {
            MetricId::Temperature
            | MetricId::Humidity
            | MetricId::Pressure
            | MetricId::Light
            | MetricId::NoiseHigh
            | MetricId::NoiseMid
            | MetricId::NoiseLow
            | MetricId::NoiseAmp => FeatureGroup::Base,
            MetricId::Ammonia | MetricId::Reducing | MetricId::Oxidising => FeatureGroup::Gas,
            MetricId::Pm1 | MetricId::Pm25 | MetricId::Pm10 => FeatureGroup::Particulate,
            MetricId::WindDirection | MetricId::WindSpeed => FeatureGroup::Wind,
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureGroup {
    Base,
    Gas,
    Particulate,
    Wind,
}

impl FeatureGroup {
    /// Members in display order
    pub fn members(self) -> &'static [MetricId] {
        match self {
            FeatureGroup::Base => &[
                MetricId::Temperature,
                MetricId::Humidity,
                MetricId::Pressure,
                MetricId::Light,
                MetricId::NoiseHigh,
                MetricId::NoiseMid,
                MetricId::NoiseLow,
                MetricId::NoiseAmp,
            ],
            FeatureGroup::Gas => &[MetricId::Ammonia, MetricId::Reducing, MetricId::Oxidising],
            FeatureGroup::Particulate => &[MetricId::Pm1, MetricId::Pm25, MetricId::Pm10],
            FeatureGroup::Wind => &[MetricId::WindDirection, MetricId::WindSpeed],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub group: FeatureGroup,
    pub display_unit: String,
    pub color: String,
    pub range_min: f64,
    pub range_max: f64,
}

/// Numeric value of a metric in a raw backend object.
/// Missing keys, `null` and non-numeric values all read as `None`.
pub fn read_value(raw: &Map<String, Value>, id: MetricId) -> Option<Number> {
    match raw.get(id.as_str()) {
        Some(Value::Number(n)) => Some(n.clone()),
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::debug!("Ignoring non-numeric value for {}: {}", id, other);
            None
        }
    }
}
