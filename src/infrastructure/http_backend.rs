// HTTP implementation of the sensor backend
use crate::application::error::{DashboardError, Result};
use crate::application::sensor_backend::SensorBackend;
use crate::domain::series::RawSample;
use crate::domain::system::{SystemAction, SystemActionOutcome, SystemActionResponse};
use crate::domain::window::TimeRangeWindow;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSensorBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSensorBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn readings_url(&self, fan: Option<u8>) -> String {
        match fan {
            Some(duty) => format!("{}/readings?fan={}", self.base_url, duty),
            None => format!("{}/readings", self.base_url),
        }
    }

    fn graph_url(&self, window: TimeRangeWindow) -> String {
        format!(
            "{}/graph?time={}",
            self.base_url,
            urlencoding::encode(window.as_str())
        )
    }

    async fn get_json(&self, endpoint: &str, url: &str) -> Result<Value> {
        tracing::trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::transport(endpoint, e))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DashboardError::transport(endpoint, format!("HTTP error! status: {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DashboardError::malformed(endpoint, e))
    }
}

#[async_trait]
impl SensorBackend for HttpSensorBackend {
    async fn fetch_readings(&self, fan: Option<u8>) -> Result<Map<String, Value>> {
        let url = self.readings_url(fan);
        match self.get_json("readings", &url).await? {
            Value::Object(map) => Ok(map),
            other => Err(DashboardError::malformed(
                "readings",
                format!("expected an object, got {}", json_kind(&other)),
            )),
        }
    }

    async fn fetch_graph(&self, window: TimeRangeWindow) -> Result<Vec<RawSample>> {
        let url = self.graph_url(window);
        let items = match self.get_json("graph", &url).await? {
            Value::Array(items) => items,
            other => {
                return Err(DashboardError::malformed(
                    "graph",
                    format!("expected an array, got {}", json_kind(&other)),
                ));
            }
        };

        let total = items.len();
        let samples: Vec<RawSample> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        if samples.len() < total {
            tracing::warn!("Skipped {} non-object {} samples", total - samples.len(), window);
        }
        Ok(samples)
    }

    async fn system_action(&self, action: SystemAction) -> Result<SystemActionOutcome> {
        let url = format!("{}/{}", self.base_url, action.path());
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| DashboardError::transport(action.path(), e))?;

        let http_ok = response.status().is_success();
        // the board may answer with HTML; that counts as a failed action
        let body = response.json::<SystemActionResponse>().await.ok();
        Ok(SystemActionOutcome::from_response(action, http_ok, body))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
