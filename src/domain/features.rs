// Feature resolution - which metrics the current hardware can show
use super::catalog::SensorCatalog;
use super::metric::{FeatureGroup, MetricDescriptor, MetricId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityFlags {
    /// Driven by the external weather API, not by the board itself
    pub has_wind: bool,
    pub has_gas: bool,
    pub has_particulate: bool,
}

impl CapabilityFlags {
    /// Feature groups in composition order: base, gas, particulate, wind
    pub fn groups(&self) -> Vec<FeatureGroup> {
        let mut groups = vec![FeatureGroup::Base];
        if self.has_gas {
            groups.push(FeatureGroup::Gas);
        }
        if self.has_particulate {
            groups.push(FeatureGroup::Particulate);
        }
        if self.has_wind {
            groups.push(FeatureGroup::Wind);
        }
        groups
    }
}

/// Ordered subset of the catalog that applies to this session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActiveMetricSet {
    metrics: Vec<MetricDescriptor>,
}

impl ActiveMetricSet {
    pub fn resolve(catalog: &SensorCatalog, flags: CapabilityFlags) -> Self {
        let metrics = flags
            .groups()
            .into_iter()
            .flat_map(|group| catalog.group(group))
            .collect();
        Self { metrics }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.metrics.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = MetricId> + '_ {
        self.metrics.iter().map(|m| m.id)
    }

    pub fn get(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.metrics.iter().find(|m| m.id == id)
    }

    pub fn contains(&self, id: MetricId) -> bool {
        self.get(id).is_some()
    }

    pub fn has_group(&self, group: FeatureGroup) -> bool {
        self.metrics.iter().any(|m| m.group == group)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
