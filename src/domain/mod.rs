// Domain layer - metric catalog, projections and time windows
pub mod catalog;
pub mod dashboard;
pub mod features;
pub mod metric;
pub mod readings;
pub mod series;
pub mod system;
pub mod units;
pub mod window;
