// Application layer - refresh cycle, polling and snapshots
pub mod dashboard_service;
pub mod error;
pub mod poller;
pub mod polling;
pub mod sensor_backend;
pub mod snapshot;
