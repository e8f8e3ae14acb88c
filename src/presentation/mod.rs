// Presentation layer - HTTP API for the browser front-end
pub mod app_state;
pub mod events;
pub mod handlers;
pub mod router;
