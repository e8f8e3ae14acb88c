// Infrastructure layer - configuration and the sensor board's HTTP API
pub mod config;
pub mod http_backend;
