// Unit system and metric/imperial conversions
use serde::{Deserialize, Serialize};

/// Standard sea level pressure in hPa
pub const SEA_LEVEL_HPA: f64 = 1013.25;
/// Scale height of the atmosphere in meters
const SCALE_HEIGHT_M: f64 = 8434.5;
const HPA_PER_INHG: f64 = 33.8639;
const METERS_PER_FOOT: f64 = 0.3048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn is_metric(self) -> bool {
        self == UnitSystem::Metric
    }

    pub fn temperature_unit(self) -> &'static str {
        if self.is_metric() { "°C" } else { "°F" }
    }

    pub fn pressure_unit(self) -> &'static str {
        if self.is_metric() { "hPa" } else { "inHg" }
    }

    pub fn wind_speed_unit(self) -> &'static str {
        if self.is_metric() { "km/h" } else { "mph" }
    }
}

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn hpa_to_inhg(p: f64) -> f64 {
    p * 0.02953
}

/// Weather API wind speed is m/s in metric mode
pub fn ms_to_kmh(v: f64) -> f64 {
    v * 3.6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AltitudeUnit {
    #[default]
    Feet,
    Meters,
}

/// Barometric estimate of the pressure (hPa) at an altitude in meters
pub fn pressure_at_altitude(altitude_m: f64) -> f64 {
    SEA_LEVEL_HPA * (-altitude_m / SCALE_HEIGHT_M).exp()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressureCompensation {
    pub hpa: f64,
    pub inhg: f64,
}

/// Offset to add to the raw sensor pressure so it reads as sea level pressure
pub fn pressure_compensation(altitude: f64, unit: AltitudeUnit) -> PressureCompensation {
    let altitude_m = match unit {
        AltitudeUnit::Feet => altitude * METERS_PER_FOOT,
        AltitudeUnit::Meters => altitude,
    };
    let hpa = round_to(SEA_LEVEL_HPA - pressure_at_altitude(altitude_m), 2);
    let inhg = round_to(hpa / HPA_PER_INHG, 4);
    PressureCompensation { hpa, inhg }
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
