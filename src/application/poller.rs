// Fixed-period polling loop driving the dashboard service
use crate::application::dashboard_service::{DashboardService, GraphRefresh};
use crate::domain::window::TimeRangeWindow;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Clone)]
pub struct Poller {
    service: Arc<DashboardService>,
    window_rx: watch::Receiver<TimeRangeWindow>,
    period: Duration,
    pause_without_viewers: bool,
}

impl Poller {
    pub fn new(
        service: Arc<DashboardService>,
        window_rx: watch::Receiver<TimeRangeWindow>,
        period: Duration,
        pause_without_viewers: bool,
    ) -> Self {
        Self {
            service,
            window_rx,
            period,
            pause_without_viewers,
        }
    }

    /// Runs until the window sender is dropped. At most one tick is in flight;
    /// a tick that comes due while the previous one is still running is skipped.
    /// Window changes do not wait for the running tick, so a slow history fetch
    /// for the old window is superseded rather than awaited.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!("Polling sensor backend every {:?}", self.period);

        let mut running: Option<JoinHandle<()>> = None;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if running.as_ref().is_some_and(|task| !task.is_finished()) {
                        tracing::debug!("Previous poll still running, skipping tick");
                    } else {
                        let poller = self.clone();
                        running = Some(tokio::spawn(async move { poller.on_tick().await }));
                    }
                }
                changed = self.window_rx.changed() => {
                    if changed.is_err() {
                        tracing::info!("Window selector closed, stopping poller");
                        break;
                    }
                    let poller = self.clone();
                    tokio::spawn(async move { poller.on_window_change().await });
                }
            }
        }
    }

    fn selected_window(&self) -> TimeRangeWindow {
        *self.window_rx.borrow()
    }

    pub async fn on_tick(&self) {
        if self.pause_without_viewers && self.service.store().viewer_count() == 0 {
            tracing::trace!("No viewers connected, skipping tick");
            return;
        }
        let window = self.selected_window();
        self.service.tick(window, Utc::now()).await;
    }

    /// A new window is fetched right away, regardless of the debounce interval
    pub async fn on_window_change(&self) -> Option<GraphRefresh> {
        let window = self.selected_window();
        tracing::debug!("Time range changed to {}", window);
        self.service.refresh_graph(window, Utc::now()).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::tests::{service, FakeBackend};
    use serde_json::json;

    fn backend() -> Arc<FakeBackend> {
        Arc::new(FakeBackend::with_data(
            json!({"temp": 19.5}),
            json!([{"time": "2026-10-19T05:00:00Z", "temp": 19.5}]),
        ))
    }

    #[tokio::test]
    async fn test_tick_then_window_change() {
        let backend = backend();
        let service = Arc::new(service(backend.clone(), false));
        let (tx, rx) = watch::channel(TimeRangeWindow::Day);
        let poller = Poller::new(service.clone(), rx, Duration::from_secs(2), false);

        poller.on_tick().await;
        // same window inside the debounce interval
        poller.on_tick().await;

        tx.send(TimeRangeWindow::Year).unwrap();
        assert_eq!(poller.on_window_change().await, Some(GraphRefresh::Applied(1)));

        assert_eq!(
            backend.calls(),
            vec!["readings fan=None", "graph day", "readings fan=None", "graph year"]
        );
        assert_eq!(service.store().series().await.unwrap().window, TimeRangeWindow::Year);
    }

    #[tokio::test]
    async fn test_paused_without_viewers() {
        let backend = backend();
        let service = Arc::new(service(backend.clone(), false));
        let (_tx, rx) = watch::channel(TimeRangeWindow::Day);
        let poller = Poller::new(service.clone(), rx, Duration::from_secs(2), true);

        poller.on_tick().await;
        assert!(backend.calls().is_empty());

        let _viewer = service.store().subscribe();
        poller.on_tick().await;
        assert_eq!(backend.calls(), vec!["readings fan=None", "graph day"]);
    }

    #[tokio::test]
    async fn test_run_stops_when_sender_dropped() {
        let backend = backend();
        let service = Arc::new(service(backend.clone(), false));
        let (tx, rx) = watch::channel(TimeRangeWindow::Day);
        let poller = Poller::new(service, rx, Duration::from_secs(3600), false);

        let handle = tokio::spawn(poller.run());
        drop(tx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("poller did not stop")
            .unwrap();
    }
}
