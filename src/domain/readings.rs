// Live readings projected for the dashboard header
use super::features::ActiveMetricSet;
use super::metric::{read_value, MetricId};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

/// Shown in place of a value the backend did not report
pub const NO_DATA: &str = "-";

const COMPASS_DIRECTIONS: [&str; 8] = [
    "North",
    "North East",
    "East",
    "South East",
    "South",
    "South West",
    "West",
    "North West",
];

/// 8-point compass label for a bearing in degrees.
/// Each 45° sector starts at its named bearing: 0..45 is North, 45..90 North East.
pub fn degrees_to_direction(degrees: f64) -> &'static str {
    let sector = (degrees / 45.0).floor() as i64;
    COMPASS_DIRECTIONS[sector.rem_euclid(8) as usize]
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingValue {
    Value(Number),
    Missing,
}

impl Serialize for ReadingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReadingValue::Value(n) => n.serialize(serializer),
            ReadingValue::Missing => serializer.serialize_str(NO_DATA),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindIndicator {
    pub degrees: f64,
    pub compass: &'static str,
}

/// One header update: a value (or the no-data sentinel) per active metric
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayReading {
    pub time: Option<String>,
    pub values: Vec<(MetricId, ReadingValue)>,
    /// `None` hides the wind arrow
    pub wind: Option<WindIndicator>,
}

impl DisplayReading {
    pub fn project(active: &ActiveMetricSet, raw: &Map<String, Value>) -> Self {
        let values = active
            .ids()
            .map(|id| {
                let value = read_value(raw, id)
                    .map(ReadingValue::Value)
                    .unwrap_or(ReadingValue::Missing);
                (id, value)
            })
            .collect();

        let wind = if active.contains(MetricId::WindDirection) {
            read_value(raw, MetricId::WindDirection)
                .and_then(|n| n.as_f64())
                .map(|degrees| WindIndicator {
                    degrees,
                    compass: degrees_to_direction(degrees),
                })
        } else {
            None
        };

        let time = raw.get("time").and_then(Value::as_str).map(str::to_string);

        Self { time, values, wind }
    }

    pub fn get(&self, id: MetricId) -> Option<&ReadingValue> {
        self.values.iter().find(|(k, _)| *k == id).map(|(_, v)| v)
    }
}

impl Serialize for DisplayReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(time) = &self.time {
            map.serialize_entry("time", time)?;
        }
        for (id, value) in &self.values {
            map.serialize_entry(id.as_str(), value)?;
        }
        if let Some(wind) = &self.wind {
            map.serialize_entry("windCompass", wind.compass)?;
        }
        map.end()
    }
}
