// Debounce and single-flight bookkeeping for history fetches
use crate::domain::window::TimeRangeWindow;
use chrono::{DateTime, TimeDelta, Utc};

/// Identifies one history fetch. A response is applied only if its ticket
/// is still the newest one issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub window: TimeRangeWindow,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching(FetchTicket),
}

#[derive(Debug, Clone)]
pub struct PollingState {
    last_window: Option<TimeRangeWindow>,
    last_fetch: Option<DateTime<Utc>>,
    generation: u64,
    phase: Phase,
}

impl Default for PollingState {
    fn default() -> Self {
        Self::new()
    }
}

impl PollingState {
    pub fn new() -> Self {
        Self {
            last_window: None,
            last_fetch: None,
            generation: 0,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_window(&self) -> Option<TimeRangeWindow> {
        self.last_window
    }

    /// True when the window changed or its reload interval has elapsed
    pub fn needs_fetch(&self, window: TimeRangeWindow, now: DateTime<Utc>) -> bool {
        match (self.last_window, self.last_fetch) {
            (Some(last_window), Some(last_fetch)) if last_window == window => {
                let reload = TimeDelta::seconds(window.reload_interval().as_secs() as i64);
                now.signed_duration_since(last_fetch) >= reload
            }
            _ => true,
        }
    }

    /// Idle -> Fetching. Bookkeeping is updated here, when the fetch is
    /// initiated, so a failed fetch is not retried before the interval elapses.
    /// Starting a fetch while another is in flight supersedes the older one.
    pub fn begin(&mut self, window: TimeRangeWindow, now: DateTime<Utc>) -> Option<FetchTicket> {
        if !self.needs_fetch(window, now) {
            return None;
        }

        self.last_window = Some(window);
        self.last_fetch = Some(now);
        self.generation += 1;

        let ticket = FetchTicket {
            window,
            generation: self.generation,
        };
        self.phase = Phase::Fetching(ticket);
        Some(ticket)
    }

    /// Fetching -> Idle. Returns false for a superseded ticket, whose
    /// response must be dropped.
    pub fn finish(&mut self, ticket: FetchTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.phase = Phase::Idle;
        true
    }
}
