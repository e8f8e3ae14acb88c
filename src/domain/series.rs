// Historical samples projected into chart-ready series
use super::features::ActiveMetricSet;
use super::metric::{read_value, MetricId};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};

/// One sample as delivered by the backend's `/graph` endpoint
pub type RawSample = Map<String, Value>;

/// Epoch values below this are seconds, above it milliseconds (~ year 5138 in seconds)
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Naive formats the backend is known to write, tried in order.
/// The first one is Python's `asctime()`.
const NAIVE_FORMATS: &[&str] = &[
    "%a %b %d %H:%M:%S %Y",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Chart point: ISO-8601 time plus one entry per active metric
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedSample {
    pub time: String,
    pub values: Vec<(MetricId, Option<Number>)>,
}

impl ProjectedSample {
    pub fn get(&self, id: MetricId) -> Option<&Option<Number>> {
        self.values.iter().find(|(k, _)| *k == id).map(|(_, v)| v)
    }
}

impl Serialize for ProjectedSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("time", &self.time)?;
        for (id, value) in &self.values {
            map.serialize_entry(id.as_str(), value)?;
        }
        map.end()
    }
}

/// Where timestamps that carry no zone of their own are placed on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaiveZone {
    /// Host time zone rules, DST transitions included
    Local,
    Fixed(FixedOffset),
}

impl NaiveZone {
    fn resolve(self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            NaiveZone::Fixed(offset) => offset
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            // the repeated fall-back hour resolves to its first occurrence
            NaiveZone::Local => match Local.from_local_datetime(naive).earliest() {
                Some(dt) => Some(dt.with_timezone(&Utc)),
                None => {
                    tracing::warn!("Local time {} falls in a DST gap", naive);
                    None
                }
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesProjector {
    naive_zone: NaiveZone,
}

impl SeriesProjector {
    pub fn new(naive_zone: NaiveZone) -> Self {
        Self { naive_zone }
    }

    /// Order is preserved; samples are not sorted here. Values are copied
    /// through unchanged and a missing value stays `null` so charts show a gap.
    pub fn project(&self, active: &ActiveMetricSet, samples: &[RawSample]) -> Vec<ProjectedSample> {
        samples
            .iter()
            .filter_map(|sample| {
                let Some(time) = sample.get("time").and_then(|t| self.parse_time(t)) else {
                    tracing::warn!("Dropping sample with unparseable time: {:?}", sample.get("time"));
                    return None;
                };

                let values = active.ids().map(|id| (id, read_value(sample, id))).collect();

                Some(ProjectedSample {
                    time: to_iso8601(time),
                    values,
                })
            })
            .collect()
    }

    pub fn parse_time(&self, value: &Value) -> Option<DateTime<Utc>> {
        match value {
            Value::Number(n) => parse_epoch(n.as_f64()?),
            Value::String(s) => self.parse_time_str(s),
            _ => None,
        }
    }

    fn parse_time_str(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(epoch) = s.parse::<f64>() {
            return parse_epoch(epoch);
        }

        // asctime pads single-digit days with a second space
        let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&collapsed, fmt).ok())?;
        self.naive_zone.resolve(&naive)
    }
}

fn parse_epoch(epoch: f64) -> Option<DateTime<Utc>> {
    if !epoch.is_finite() {
        return None;
    }
    let millis = if epoch.abs() < EPOCH_MILLIS_THRESHOLD {
        epoch * 1000.0
    } else {
        epoch
    };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

/// Same shape as JavaScript's `Date.prototype.toISOString`
pub fn to_iso8601(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Palette, SensorCatalog};
    use crate::domain::features::CapabilityFlags;
    use crate::domain::units::UnitSystem;
    use serde_json::json;

    fn utc_projector() -> SeriesProjector {
        SeriesProjector::new(NaiveZone::Fixed(FixedOffset::east_opt(0).unwrap()))
    }

    fn active(flags: CapabilityFlags) -> ActiveMetricSet {
        let catalog = SensorCatalog::new(UnitSystem::Metric, &Palette::default());
        ActiveMetricSet::resolve(&catalog, flags)
    }

    fn sample(value: Value) -> RawSample {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_empty_input() {
        let projected = utc_projector().project(&active(CapabilityFlags::default()), &[]);
        assert!(projected.is_empty());
    }

    #[test]
    fn test_missing_field_is_null() {
        let active = active(CapabilityFlags::default());
        let samples = vec![sample(json!({"time": "2026-10-19T06:00:00Z", "temp": 20.1}))];
        let projected = utc_projector().project(&active, &samples);

        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].values.len(), active.len());
        assert_eq!(projected[0].get(MetricId::Humidity), Some(&None));

        let json = serde_json::to_value(&projected[0]).unwrap();
        assert_eq!(json["humi"], Value::Null);
        assert_eq!(json["temp"], 20.1);
    }

    #[test]
    fn test_values_round_trip_unchanged() {
        let active = active(CapabilityFlags {
            has_wind: true,
            has_gas: true,
            has_particulate: true,
        });
        let raw = json!({
            "time": "2026-10-19T06:15:00Z",
            "temp": 21.3, "humi": 48.2, "pres": 1012.7, "lux": 340,
            "high": 1.25, "mid": 2.5, "low": 3.75, "amp": 0.5,
            "nh3": 120, "red": 240, "oxi": 18.4,
            "pm1": 2, "pm25": 3, "pm10": 4,
            "windDir": 270, "windSp": 14.4
        });
        let projected = utc_projector().project(&active, &[sample(raw.clone())]);
        let json = serde_json::to_value(&projected[0]).unwrap();

        assert_eq!(json["time"], "2026-10-19T06:15:00.000Z");
        for id in active.ids() {
            assert_eq!(json[id.as_str()], raw[id.as_str()], "{} changed", id);
        }
    }

    #[test]
    fn test_inactive_metrics_are_omitted() {
        let active = active(CapabilityFlags::default());
        let samples = vec![sample(json!({"time": 0, "temp": 1, "pm25": 9, "bogus": 3}))];
        let json = serde_json::to_value(utc_projector().project(&active, &samples)).unwrap();

        assert!(json[0].get("pm25").is_none());
        assert!(json[0].get("bogus").is_none());
        assert_eq!(json[0]["time"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_order_preserved_and_bad_times_dropped() {
        let active = active(CapabilityFlags::default());
        let samples = vec![
            sample(json!({"time": "2026-10-19T08:00:00Z"})),
            sample(json!({"time": "not a time"})),
            sample(json!({"temp": 3})),
            sample(json!({"time": "2026-10-19T07:00:00Z"})),
        ];
        let projected = utc_projector().project(&active, &samples);
        let times: Vec<&str> = projected.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(times, vec!["2026-10-19T08:00:00.000Z", "2026-10-19T07:00:00.000Z"]);
    }

    #[test]
    fn test_time_formats() {
        let projector = utc_projector();
        let expected = Utc.with_ymd_and_hms(2026, 10, 5, 6, 28, 0).unwrap();

        assert_eq!(projector.parse_time(&json!("Mon Oct  5 06:28:00 2026")), Some(expected));
        assert_eq!(projector.parse_time(&json!("2026-10-05 06:28:00")), Some(expected));
        assert_eq!(projector.parse_time(&json!("2026-10-05T08:28:00+02:00")), Some(expected));
        assert_eq!(projector.parse_time(&json!(expected.timestamp())), Some(expected));
        assert_eq!(projector.parse_time(&json!(expected.timestamp_millis())), Some(expected));
        assert_eq!(projector.parse_time(&json!(null)), None);
    }

    #[test]
    fn test_naive_times_use_offset() {
        let projector = SeriesProjector::new(NaiveZone::Fixed(FixedOffset::east_opt(2 * 3600).unwrap()));
        let parsed = projector.parse_time(&json!("Mon Oct  5 08:28:00 2026")).unwrap();
        assert_eq!(to_iso8601(parsed), "2026-10-05T06:28:00.000Z");
    }

    #[test]
    fn test_local_zone_follows_dst() {
        // POSIX rule for Central Europe; needs no tzdata on the host
        unsafe { std::env::set_var("TZ", "CET-1CEST,M3.5.0,M10.5.0/3") };
        let projector = SeriesProjector::new(NaiveZone::Local);
        let iso = |raw: &str| projector.parse_time(&json!(raw)).map(to_iso8601);

        assert_eq!(iso("Sat Jan 10 12:00:00 2026").as_deref(), Some("2026-01-10T11:00:00.000Z"));
        assert_eq!(iso("Fri Jul 10 12:00:00 2026").as_deref(), Some("2026-07-10T10:00:00.000Z"));
        // fall-back hour happens twice; the summer-time instant wins
        assert_eq!(iso("Sun Oct 25 02:30:00 2026").as_deref(), Some("2026-10-25T00:30:00.000Z"));
        // spring-forward hour never happens
        assert_eq!(iso("Sun Mar 29 02:30:00 2026"), None);

        let active = active(CapabilityFlags::default());
        let samples = vec![
            sample(json!({"time": "Sun Mar 29 01:30:00 2026", "temp": 4.0})),
            sample(json!({"time": "Sun Mar 29 02:30:00 2026", "temp": 4.1})),
            sample(json!({"time": "Sun Mar 29 03:30:00 2026", "temp": 4.2})),
        ];
        let times: Vec<String> = projector
            .project(&active, &samples)
            .into_iter()
            .map(|p| p.time)
            .collect();
        assert_eq!(times, vec!["2026-03-29T00:30:00.000Z", "2026-03-29T01:30:00.000Z"]);
    }
}
