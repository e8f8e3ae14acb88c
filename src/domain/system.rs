// System actions (reboot / shutdown) proxied to the sensor board
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemAction {
    Reboot,
    Shutdown,
}

impl SystemAction {
    /// Backend path segment
    pub fn path(self) -> &'static str {
        match self {
            SystemAction::Reboot => "reboot",
            SystemAction::Shutdown => "shutdown",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SystemAction::Reboot => "Reboot",
            SystemAction::Shutdown => "Shutdown",
        }
    }
}

impl fmt::Display for SystemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SystemAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reboot" => Ok(SystemAction::Reboot),
            "shutdown" => Ok(SystemAction::Shutdown),
            other => Err(format!("unknown system action '{}'", other)),
        }
    }
}

/// Body the backend answers a system action with
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemActionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SystemActionOutcome {
    Success(String),
    Error(String),
    /// The user did not confirm; nothing was sent
    Cancelled,
}

impl SystemActionOutcome {
    /// Interpret the backend answer: only a 2xx with `status: "success"` counts
    pub fn from_response(
        action: SystemAction,
        http_ok: bool,
        response: Option<SystemActionResponse>,
    ) -> Self {
        let response = response.unwrap_or_default();
        if http_ok && response.status.as_deref() == Some("success") {
            let message = response
                .message
                .unwrap_or_else(|| format!("{} in progress...", action));
            SystemActionOutcome::Success(message)
        } else {
            let message = response
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("{} failed", action));
            SystemActionOutcome::Error(message)
        }
    }
}
