// Errors a refresh cycle can surface
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Network failure or non-success HTTP status
    #[error("{endpoint}: transport error: {reason}")]
    Transport { endpoint: String, reason: String },
    /// The payload was not the JSON shape the endpoint promises
    #[error("{endpoint}: malformed data: {reason}")]
    MalformedData { endpoint: String, reason: String },
}

impl DashboardError {
    pub fn transport(endpoint: &str, reason: impl ToString) -> Self {
        DashboardError::Transport {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(endpoint: &str, reason: impl ToString) -> Self {
        DashboardError::MalformedData {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
