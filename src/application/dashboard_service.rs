// Dashboard service - one refresh cycle: fetch, project, publish
use crate::application::error::{DashboardError, Result};
use crate::application::polling::PollingState;
use crate::application::sensor_backend::SensorBackend;
use crate::application::snapshot::{SeriesSnapshot, SnapshotStore};
use crate::domain::dashboard::DashboardLayout;
use crate::domain::features::ActiveMetricSet;
use crate::domain::readings::DisplayReading;
use crate::domain::series::{to_iso8601, SeriesProjector};
use crate::domain::system::{SystemAction, SystemActionOutcome};
use crate::domain::window::TimeRangeWindow;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_FAN_DUTY: u8 = 100;

/// What a graph refresh did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphRefresh {
    /// Same window, reload interval not yet elapsed
    Skipped,
    /// Fetched and published this many samples
    Applied(usize),
    /// Fetched, but a newer fetch had been started meanwhile
    Discarded,
}

pub struct DashboardService {
    backend: Arc<dyn SensorBackend>,
    active: ActiveMetricSet,
    projector: SeriesProjector,
    store: Arc<SnapshotStore>,
    /// Locked only around bookkeeping, never across a fetch
    polling: Mutex<PollingState>,
    /// Present only when the board drives a fan
    fan_duty: Option<AtomicU8>,
}

impl DashboardService {
    pub fn new(
        backend: Arc<dyn SensorBackend>,
        active: ActiveMetricSet,
        projector: SeriesProjector,
        store: Arc<SnapshotStore>,
        has_fan: bool,
    ) -> Self {
        Self {
            backend,
            active,
            projector,
            store,
            polling: Mutex::new(PollingState::new()),
            fan_duty: has_fan.then(|| AtomicU8::new(DEFAULT_FAN_DUTY)),
        }
    }

    pub fn active(&self) -> &ActiveMetricSet {
        &self.active
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn layout(&self, window: TimeRangeWindow) -> DashboardLayout {
        DashboardLayout::new(&self.active, window)
    }

    pub fn fan_duty(&self) -> Option<u8> {
        self.fan_duty.as_ref().map(|d| d.load(Ordering::Relaxed))
    }

    /// Returns false when there is no fan to drive
    pub fn set_fan_duty(&self, duty: u8) -> bool {
        match &self.fan_duty {
            Some(d) => {
                d.store(duty.min(100), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// One polling tick: readings and history run concurrently and do not
    /// share state. Failures are reported and never end the cycle early.
    pub async fn tick(&self, window: TimeRangeWindow, now: DateTime<Utc>) {
        let (readings, graph) = futures::join!(
            self.refresh_readings(),
            self.refresh_graph(window, now)
        );

        if let Err(e) = readings {
            tracing::debug!("Readings refresh failed this tick: {}", e);
        }
        if let Err(e) = graph {
            tracing::debug!("Graph refresh failed this tick: {}", e);
        }
    }

    pub async fn refresh_readings(&self) -> Result<DisplayReading> {
        match self.backend.fetch_readings(self.fan_duty()).await {
            Ok(raw) => {
                let reading = DisplayReading::project(&self.active, &raw);
                self.store.publish_readings(reading.clone()).await;
                Ok(reading)
            }
            Err(e) => {
                self.report("readings", &e);
                Err(e)
            }
        }
    }

    /// Fetches history when the window changed or its reload interval elapsed.
    /// On failure the error is reported and the state goes back to idle; there is
    /// no retry before the next window change or elapsed interval. A window
    /// change may start a fetch while another is in flight; only the newest
    /// response is published.
    pub async fn refresh_graph(&self, window: TimeRangeWindow, now: DateTime<Utc>) -> Result<GraphRefresh> {
        let Some(ticket) = self.polling.lock().await.begin(window, now) else {
            return Ok(GraphRefresh::Skipped);
        };

        tracing::debug!("Fetching {} history", window);
        let result = self.backend.fetch_graph(ticket.window).await;
        let current = self.polling.lock().await.finish(ticket);

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                self.report("graph", &e);
                return Err(e);
            }
        };

        if !current {
            tracing::debug!("Dropping superseded {} history response", ticket.window);
            return Ok(GraphRefresh::Discarded);
        }

        let samples = self.projector.project(&self.active, &raw);
        let count = samples.len();
        self.store
            .publish_series(SeriesSnapshot {
                window: ticket.window,
                time_unit: ticket.window.time_unit(),
                fetched_at: to_iso8601(now),
                samples,
            })
            .await;

        tracing::debug!("Published {} {} samples", count, ticket.window);
        Ok(GraphRefresh::Applied(count))
    }

    /// Nothing is sent unless the user confirmed the action
    pub async fn perform_system_action(
        &self,
        action: SystemAction,
        confirmed: bool,
    ) -> SystemActionOutcome {
        if !confirmed {
            tracing::info!("{} cancelled by user", action);
            return SystemActionOutcome::Cancelled;
        }

        tracing::info!("{} requested", action);
        match self.backend.system_action(action).await {
            Ok(outcome) => {
                if let SystemActionOutcome::Error(message) = &outcome {
                    tracing::warn!("{} rejected by backend: {}", action, message);
                }
                outcome
            }
            Err(e) => {
                self.report(action.path(), &e);
                SystemActionOutcome::Error(format!("Network error: {}", e))
            }
        }
    }

    fn report(&self, source: &'static str, error: &DashboardError) {
        tracing::error!("Error fetching '{}' data: {}", source, error);
        self.store.publish_error(source, error.to_string());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::catalog::{Palette, SensorCatalog};
    use crate::domain::features::CapabilityFlags;
    use crate::domain::series::{NaiveZone, RawSample};
    use crate::domain::units::UnitSystem;
    use async_trait::async_trait;
    use chrono::FixedOffset;
    use serde_json::{json, Map, Value};
    use std::sync::Mutex;

    /// Scripted backend that records every call
    #[derive(Default)]
    pub(crate) struct FakeBackend {
        pub readings: Mutex<Option<Result<Map<String, Value>>>>,
        pub graph: Mutex<Option<Result<Vec<RawSample>>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        pub fn with_data(readings: Value, graph: Value) -> Self {
            let samples = graph
                .as_array()
                .unwrap()
                .iter()
                .map(|s| s.as_object().unwrap().clone())
                .collect();
            Self {
                readings: Mutex::new(Some(Ok(readings.as_object().unwrap().clone()))),
                graph: Mutex::new(Some(Ok(samples))),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SensorBackend for FakeBackend {
        async fn fetch_readings(&self, fan: Option<u8>) -> Result<Map<String, Value>> {
            self.calls.lock().unwrap().push(format!("readings fan={:?}", fan));
            self.readings
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(DashboardError::transport("/readings", "offline")))
        }

        async fn fetch_graph(&self, window: TimeRangeWindow) -> Result<Vec<RawSample>> {
            self.calls.lock().unwrap().push(format!("graph {}", window));
            // let a concurrent refresh start while this one is in flight
            tokio::task::yield_now().await;
            self.graph
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(DashboardError::transport("/graph", "offline")))
        }

        async fn system_action(&self, action: SystemAction) -> Result<SystemActionOutcome> {
            self.calls.lock().unwrap().push(format!("system {}", action.path()));
            Ok(SystemActionOutcome::Success(format!("{} in progress...", action)))
        }
    }

    pub(crate) fn service(backend: Arc<FakeBackend>, has_fan: bool) -> DashboardService {
        let catalog = SensorCatalog::new(UnitSystem::Metric, &Palette::default());
        let active = ActiveMetricSet::resolve(&catalog, CapabilityFlags::default());
        DashboardService::new(
            backend,
            active,
            SeriesProjector::new(NaiveZone::Fixed(FixedOffset::east_opt(0).unwrap())),
            Arc::new(SnapshotStore::new()),
            has_fan,
        )
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_790_000_000 + secs, 0).unwrap()
    }

    fn sample_backend() -> Arc<FakeBackend> {
        Arc::new(FakeBackend::with_data(
            json!({"temp": 22.0, "humi": 40.5}),
            json!([
                {"time": "2026-10-19T05:00:00Z", "temp": 21.0},
                {"time": "2026-10-19T05:15:00Z", "temp": null}
            ]),
        ))
    }

    #[tokio::test]
    async fn test_tick_publishes_both_snapshots() {
        let backend = sample_backend();
        let service = service(backend.clone(), false);

        service.tick(TimeRangeWindow::Day, at(0)).await;

        let reading = service.store().readings().await.unwrap();
        assert_eq!(reading.values.len(), 8);
        let series = service.store().series().await.unwrap();
        assert_eq!(series.window, TimeRangeWindow::Day);
        assert_eq!(series.samples.len(), 2);
        assert_eq!(backend.calls(), vec!["readings fan=None", "graph day"]);
    }

    #[tokio::test]
    async fn test_graph_debounce() {
        let backend = sample_backend();
        let service = service(backend.clone(), false);

        let first = service.refresh_graph(TimeRangeWindow::Day, at(0)).await;
        assert_eq!(first, Ok(GraphRefresh::Applied(2)));
        let early = service.refresh_graph(TimeRangeWindow::Day, at(59)).await;
        assert_eq!(early, Ok(GraphRefresh::Skipped));
        let due = service.refresh_graph(TimeRangeWindow::Day, at(60)).await;
        assert_eq!(due, Ok(GraphRefresh::Applied(2)));
        let changed = service.refresh_graph(TimeRangeWindow::Week, at(61)).await;
        assert_eq!(changed, Ok(GraphRefresh::Applied(2)));

        assert_eq!(backend.calls(), vec!["graph day", "graph day", "graph week"]);
    }

    #[tokio::test]
    async fn test_superseded_history_is_discarded() {
        let backend = sample_backend();
        let service = service(backend.clone(), false);

        let (day, week) = futures::join!(
            service.refresh_graph(TimeRangeWindow::Day, at(0)),
            service.refresh_graph(TimeRangeWindow::Week, at(1)),
        );

        assert_eq!(day, Ok(GraphRefresh::Discarded));
        assert_eq!(week, Ok(GraphRefresh::Applied(2)));
        assert_eq!(backend.calls(), vec!["graph day", "graph week"]);
        assert_eq!(service.store().series().await.unwrap().window, TimeRangeWindow::Week);
    }

    #[tokio::test]
    async fn test_graph_failure_is_reported_without_retry() {
        let backend = Arc::new(FakeBackend::default());
        let service = service(backend.clone(), false);
        let mut events = service.store().subscribe();

        let result = service.refresh_graph(TimeRangeWindow::Day, at(0)).await;
        assert!(matches!(result, Err(DashboardError::Transport { .. })));
        assert_eq!(events.recv().await.unwrap().name(), "error");

        let again = service.refresh_graph(TimeRangeWindow::Day, at(30)).await;
        assert_eq!(again, Ok(GraphRefresh::Skipped));
        assert_eq!(backend.calls(), vec!["graph day"]);
        assert!(service.store().series().await.is_none());
    }

    #[tokio::test]
    async fn test_fan_duty_is_sent_with_readings() {
        let backend = sample_backend();
        let service = service(backend.clone(), true);
        assert_eq!(service.fan_duty(), Some(DEFAULT_FAN_DUTY));
        assert!(service.set_fan_duty(40));
        service.refresh_readings().await.unwrap();
        assert_eq!(backend.calls(), vec!["readings fan=Some(40)"]);

        let no_fan = super::tests::service(sample_backend(), false);
        assert!(!no_fan.set_fan_duty(40));
        assert_eq!(no_fan.fan_duty(), None);
    }

    #[tokio::test]
    async fn test_system_action_requires_confirmation() {
        let backend = sample_backend();
        let service = service(backend.clone(), false);

        let outcome = service.perform_system_action(SystemAction::Reboot, false).await;
        assert_eq!(outcome, SystemActionOutcome::Cancelled);
        assert!(backend.calls().is_empty());

        let outcome = service.perform_system_action(SystemAction::Reboot, true).await;
        assert_eq!(outcome, SystemActionOutcome::Success("Reboot in progress...".to_string()));
        assert_eq!(backend.calls(), vec!["system reboot"]);
    }
}
