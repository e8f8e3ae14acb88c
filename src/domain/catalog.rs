// Sensor catalog - every metric the dashboard knows about
use super::metric::{FeatureGroup, MetricDescriptor, MetricId};
use super::units::{celsius_to_fahrenheit, hpa_to_inhg, UnitSystem};
use std::collections::HashMap;

const TEMP_MIN_C: f64 = 0.0;
const TEMP_MAX_C: f64 = 60.0;
const PRES_MIN_HPA: f64 = 850.0;
const PRES_MAX_HPA: f64 = 1050.0;

/// Unit of a metric, resolved against the unit system when the catalog is built
#[derive(Debug, Clone, Copy)]
enum UnitKind {
    Fixed(&'static str),
    Temperature,
    Pressure,
    WindSpeed,
}

#[derive(Debug, Clone, Copy)]
struct MetricDefinition {
    id: MetricId,
    unit: UnitKind,
    min: f64,
    max: f64,
}

const fn def(id: MetricId, unit: UnitKind, min: f64, max: f64) -> MetricDefinition {
    MetricDefinition { id, unit, min, max }
}

const DEFINITIONS: &[MetricDefinition] = &[
    def(MetricId::Temperature, UnitKind::Temperature, TEMP_MIN_C, TEMP_MAX_C),
    def(MetricId::Humidity, UnitKind::Fixed("%"), 0.0, 100.0),
    def(MetricId::Pressure, UnitKind::Pressure, PRES_MIN_HPA, PRES_MAX_HPA),
    def(MetricId::Light, UnitKind::Fixed("lux"), 0.0, 25000.0),
    def(MetricId::NoiseHigh, UnitKind::Fixed("u"), 0.0, 600.0),
    def(MetricId::NoiseMid, UnitKind::Fixed("u"), 0.0, 600.0),
    def(MetricId::NoiseLow, UnitKind::Fixed("u"), 0.0, 600.0),
    def(MetricId::NoiseAmp, UnitKind::Fixed("u"), 0.0, 600.0),
    def(MetricId::Ammonia, UnitKind::Fixed("kΩ"), 0.0, 1200.0),
    def(MetricId::Reducing, UnitKind::Fixed("kΩ"), 0.0, 1200.0),
    def(MetricId::Oxidising, UnitKind::Fixed("kΩ"), 0.0, 1200.0),
    def(MetricId::Pm1, UnitKind::Fixed("μg/m3"), 0.0, 800.0),
    def(MetricId::Pm25, UnitKind::Fixed("μg/m3"), 0.0, 800.0),
    def(MetricId::Pm10, UnitKind::Fixed("μg/m3"), 0.0, 800.0),
    def(MetricId::WindDirection, UnitKind::Fixed("°"), 0.0, 360.0),
    def(MetricId::WindSpeed, UnitKind::WindSpeed, 0.0, 500.0),
];

/// Series colors. Defaults follow the dashboard's stylesheet; any entry can be
/// overridden by metric id (e.g. `temp = "#ff6b6b"`).
#[derive(Debug, Clone, Default)]
pub struct Palette {
    overrides: HashMap<String, String>,
}

impl Palette {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self { overrides }
    }

    pub fn color(&self, id: MetricId) -> String {
        self.overrides
            .get(&id.as_str().to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| Self::default_color(id).to_string())
    }

    fn default_color(id: MetricId) -> &'static str {
        match id {
            MetricId::Temperature => "#f05a5a",
            MetricId::Humidity => "#3b8eea",
            MetricId::Pressure => "#8e6fd8",
            MetricId::Light => "#f2b632",
            MetricId::NoiseHigh => "#e4572e",
            MetricId::NoiseMid => "#f3a712",
            MetricId::NoiseLow => "#29335c",
            MetricId::NoiseAmp => "#669bbc",
            MetricId::Ammonia => "#7d8491",
            MetricId::Reducing => "#b5651d",
            MetricId::Oxidising => "#2a9d8f",
            MetricId::Pm1 => "#9c6644",
            MetricId::Pm25 => "#6d597a",
            MetricId::Pm10 => "#355070",
            MetricId::WindDirection | MetricId::WindSpeed => "#48a9a6",
        }
    }
}

/// Immutable registry of every metric, built once per session
#[derive(Debug, Clone)]
pub struct SensorCatalog {
    units: UnitSystem,
    descriptors: Vec<MetricDescriptor>,
}

impl SensorCatalog {
    pub fn new(units: UnitSystem, palette: &Palette) -> Self {
        let descriptors = DEFINITIONS
            .iter()
            .map(|d| Self::describe(d, units, palette))
            .collect();
        Self { units, descriptors }
    }

    fn describe(d: &MetricDefinition, units: UnitSystem, palette: &Palette) -> MetricDescriptor {
        let (display_unit, range_min, range_max) = match d.unit {
            UnitKind::Fixed(unit) => (unit, d.min, d.max),
            UnitKind::Temperature if !units.is_metric() => (
                units.temperature_unit(),
                celsius_to_fahrenheit(d.min),
                celsius_to_fahrenheit(d.max),
            ),
            UnitKind::Temperature => (units.temperature_unit(), d.min, d.max),
            UnitKind::Pressure if !units.is_metric() => {
                (units.pressure_unit(), hpa_to_inhg(d.min), hpa_to_inhg(d.max))
            }
            UnitKind::Pressure => (units.pressure_unit(), d.min, d.max),
            UnitKind::WindSpeed => (units.wind_speed_unit(), d.min, d.max),
        };

        MetricDescriptor {
            id: d.id,
            group: d.id.group(),
            display_unit: display_unit.to_string(),
            color: palette.color(d.id),
            range_min,
            range_max,
        }
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn get(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Descriptors of one feature group, in display order
    pub fn group(&self, group: FeatureGroup) -> Vec<MetricDescriptor> {
        group
            .members()
            .iter()
            .filter_map(|id| self.get(*id).cloned())
            .collect()
    }

    pub fn all(&self) -> &[MetricDescriptor] {
        &self.descriptors
    }
}
