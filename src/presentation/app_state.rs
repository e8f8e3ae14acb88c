// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::domain::window::TimeRangeWindow;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DashboardService>,
    /// Selected history window; the poller listens on the other end
    pub window_tx: Arc<watch::Sender<TimeRangeWindow>>,
}

impl AppState {
    pub fn selected_window(&self) -> TimeRangeWindow {
        *self.window_tx.borrow()
    }
}
