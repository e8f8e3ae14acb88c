// Time range windows for the history charts
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRangeWindow {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

/// Bucket unit the chart's time axis uses for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Hour,
    Day,
    Month,
}

impl TimeRangeWindow {
    pub const ALL: [TimeRangeWindow; 4] = [
        TimeRangeWindow::Day,
        TimeRangeWindow::Week,
        TimeRangeWindow::Month,
        TimeRangeWindow::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRangeWindow::Day => "day",
            TimeRangeWindow::Week => "week",
            TimeRangeWindow::Month => "month",
            TimeRangeWindow::Year => "year",
        }
    }

    /// Minimum time before the same window is fetched again
    pub fn reload_interval(self) -> Duration {
        let secs = match self {
            TimeRangeWindow::Day => 60,
            TimeRangeWindow::Week => 600,
            TimeRangeWindow::Month => 1800,
            TimeRangeWindow::Year => 43200,
        };
        Duration::from_secs(secs)
    }

    pub fn time_unit(self) -> TimeUnit {
        match self {
            TimeRangeWindow::Day => TimeUnit::Hour,
            TimeRangeWindow::Week | TimeRangeWindow::Month => TimeUnit::Day,
            TimeRangeWindow::Year => TimeUnit::Month,
        }
    }
}

impl fmt::Display for TimeRangeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time range '{0}', expected one of day, week, month, year")]
pub struct UnknownWindow(pub String);

impl FromStr for TimeRangeWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRangeWindow::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownWindow(s.to_string()))
    }
}
