// Latest projected snapshots, replayable by any number of viewers
use crate::domain::readings::DisplayReading;
use crate::domain::series::ProjectedSample;
use crate::domain::window::{TimeRangeWindow, TimeUnit};
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSnapshot {
    pub window: TimeRangeWindow,
    pub time_unit: TimeUnit,
    pub fetched_at: String,
    pub samples: Vec<ProjectedSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub source: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DashboardEvent {
    Readings(DisplayReading),
    Series(SeriesSnapshot),
    Error(ErrorReport),
}

impl DashboardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::Readings(_) => "readings",
            DashboardEvent::Series(_) => "series",
            DashboardEvent::Error(_) => "error",
        }
    }
}

pub struct SnapshotStore {
    readings: RwLock<Option<DisplayReading>>,
    series: RwLock<Option<SeriesSnapshot>>,
    events: broadcast::Sender<DashboardEvent>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            readings: RwLock::new(None),
            series: RwLock::new(None),
            events,
        }
    }

    pub async fn readings(&self) -> Option<DisplayReading> {
        self.readings.read().await.clone()
    }

    pub async fn series(&self) -> Option<SeriesSnapshot> {
        self.series.read().await.clone()
    }

    pub async fn publish_readings(&self, reading: DisplayReading) {
        *self.readings.write().await = Some(reading.clone());
        self.notify(DashboardEvent::Readings(reading));
    }

    pub async fn publish_series(&self, snapshot: SeriesSnapshot) {
        *self.series.write().await = Some(snapshot.clone());
        self.notify(DashboardEvent::Series(snapshot));
    }

    pub fn publish_error(&self, source: &'static str, message: String) {
        self.notify(DashboardEvent::Error(ErrorReport { source, message }));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Number of connected event-stream clients
    pub fn viewer_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn notify(&self, event: DashboardEvent) {
        // no subscribers is fine; the snapshot is still stored
        let _ = self.events.send(event);
    }
}
