// Backend trait for the sensor board's HTTP API
use crate::application::error::Result;
use crate::domain::series::RawSample;
use crate::domain::system::{SystemAction, SystemActionOutcome};
use crate::domain::window::TimeRangeWindow;
use async_trait::async_trait;
use serde_json::{Map, Value};

#[async_trait]
pub trait SensorBackend: Send + Sync {
    /// Latest live reading (`GET /readings`). `fan` carries the fan duty
    /// when the board drives a fan.
    async fn fetch_readings(&self, fan: Option<u8>) -> Result<Map<String, Value>>;

    /// History for a window (`GET /graph?time=`), oldest first
    async fn fetch_graph(&self, window: TimeRangeWindow) -> Result<Vec<RawSample>>;

    /// `POST /reboot` or `POST /shutdown`
    async fn system_action(&self, action: SystemAction) -> Result<SystemActionOutcome>;
}
