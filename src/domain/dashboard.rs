// Dashboard layout - chart panels derived from the active metric set
use super::features::ActiveMetricSet;
use super::metric::{MetricDescriptor, MetricId};
use super::window::{TimeRangeWindow, TimeUnit};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSeries {
    pub id: MetricId,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPanel {
    pub id: &'static str,
    pub title: &'static str,
    pub unit: String,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub series: Vec<PanelSeries>,
}

#[derive(Debug, Clone, Copy)]
enum Scale {
    /// Let the chart fit the data
    Auto,
    /// Start at zero, fit the top
    FromZero,
    /// Fixed to the first series' display range
    Fixed,
}

struct PanelDefinition {
    id: &'static str,
    title: &'static str,
    scale: Scale,
    metrics: &'static [MetricId],
}

const PANELS: &[PanelDefinition] = &[
    PanelDefinition {
        id: "temp",
        title: "Temperature",
        scale: Scale::Auto,
        metrics: &[MetricId::Temperature],
    },
    PanelDefinition {
        id: "humi",
        title: "Humidity",
        scale: Scale::Auto,
        metrics: &[MetricId::Humidity],
    },
    PanelDefinition {
        id: "pres",
        title: "Pressure",
        scale: Scale::Fixed,
        metrics: &[MetricId::Pressure],
    },
    PanelDefinition {
        id: "lux",
        title: "Light",
        scale: Scale::FromZero,
        metrics: &[MetricId::Light],
    },
    // direction is shown alongside speed, not plotted
    PanelDefinition {
        id: "wind",
        title: "Wind",
        scale: Scale::FromZero,
        metrics: &[MetricId::WindSpeed],
    },
    PanelDefinition {
        id: "noise",
        title: "Noise",
        scale: Scale::Fixed,
        metrics: &[
            MetricId::NoiseHigh,
            MetricId::NoiseMid,
            MetricId::NoiseLow,
            MetricId::NoiseAmp,
        ],
    },
    PanelDefinition {
        id: "gas",
        title: "Gas",
        scale: Scale::Fixed,
        metrics: &[MetricId::Ammonia, MetricId::Reducing, MetricId::Oxidising],
    },
    PanelDefinition {
        id: "pm",
        title: "Particulates",
        scale: Scale::FromZero,
        metrics: &[MetricId::Pm1, MetricId::Pm25, MetricId::Pm10],
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardLayout {
    pub window: TimeRangeWindow,
    pub time_unit: TimeUnit,
    pub charts: Vec<ChartPanel>,
}

impl DashboardLayout {
    pub fn new(active: &ActiveMetricSet, window: TimeRangeWindow) -> Self {
        let charts = PANELS.iter().filter_map(|p| Self::build_panel(p, active)).collect();
        Self {
            window,
            time_unit: window.time_unit(),
            charts,
        }
    }

    fn build_panel(panel: &PanelDefinition, active: &ActiveMetricSet) -> Option<ChartPanel> {
        let members: Vec<&MetricDescriptor> =
            panel.metrics.iter().filter_map(|id| active.get(*id)).collect();
        // panels come and go with their feature group
        let first = *members.first()?;

        let (y_min, y_max) = match panel.scale {
            Scale::Auto => (None, None),
            Scale::FromZero => (Some(0.0), None),
            Scale::Fixed => (Some(first.range_min), Some(first.range_max)),
        };

        Some(ChartPanel {
            id: panel.id,
            title: panel.title,
            unit: first.display_unit.clone(),
            y_min,
            y_max,
            series: members
                .iter()
                .map(|m| PanelSeries {
                    id: m.id,
                    color: m.color.clone(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Palette, SensorCatalog};
    use crate::domain::features::CapabilityFlags;
    use crate::domain::units::UnitSystem;

    fn layout(flags: CapabilityFlags, units: UnitSystem) -> DashboardLayout {
        let catalog = SensorCatalog::new(units, &Palette::default());
        let active = ActiveMetricSet::resolve(&catalog, flags);
        DashboardLayout::new(&active, TimeRangeWindow::Week)
    }

    #[test]
    fn test_base_layout() {
        let layout = layout(CapabilityFlags::default(), UnitSystem::Metric);
        let ids: Vec<&str> = layout.charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["temp", "humi", "pres", "lux", "noise"]);
        assert_eq!(layout.time_unit, TimeUnit::Day);

        let noise = layout.charts.iter().find(|c| c.id == "noise").unwrap();
        assert_eq!(noise.series.len(), 4);
        assert_eq!((noise.y_min, noise.y_max), (Some(0.0), Some(600.0)));
    }

    #[test]
    fn test_full_layout() {
        let flags = CapabilityFlags {
            has_wind: true,
            has_gas: true,
            has_particulate: true,
        };
        let layout = layout(flags, UnitSystem::Imperial);
        let ids: Vec<&str> = layout.charts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["temp", "humi", "pres", "lux", "wind", "noise", "gas", "pm"]);

        let pres = layout.charts.iter().find(|c| c.id == "pres").unwrap();
        assert_eq!(pres.unit, "inHg");
        assert!((pres.y_min.unwrap() - 25.1).abs() < 0.01);

        let wind = layout.charts.iter().find(|c| c.id == "wind").unwrap();
        assert_eq!(wind.unit, "mph");
        assert_eq!(wind.series.len(), 1);
        assert_eq!(wind.series[0].id, MetricId::WindSpeed);
    }
}
