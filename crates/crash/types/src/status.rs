//! Betting script status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the betting script is running, and why it stopped if it is not.
///
/// Serialized with the camelCase keys the dashboard reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStatus {
    pub is_running: bool,
    #[serde(default)]
    pub error_message: String,
}

impl ScriptStatus {
    pub fn running() -> Self {
        Self {
            is_running: true,
            error_message: String::new(),
        }
    }

    pub fn stopped(error_message: impl Into<String>) -> Self {
        Self {
            is_running: false,
            error_message: error_message.into(),
        }
    }
}

/// A persisted status transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStatusRecord {
    pub id: i64,
    pub is_running: bool,
    pub message: Option<String>,
    pub reported_at: DateTime<Utc>,
}

/// Script status and last known balance, as pushed to newly connected dashboards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    #[serde(rename = "scriptStatus")]
    pub script_status: ScriptStatus,
    pub balance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_status_wire_keys() {
        let json = serde_json::to_value(ScriptStatus::stopped("rate limited")).unwrap();
        assert_eq!(json["isRunning"], false);
        assert_eq!(json["errorMessage"], "rate limited");
    }

    #[test]
    fn test_live_status_default() {
        let status = LiveStatus::default();
        assert!(!status.script_status.is_running);
        assert_eq!(status.balance, 0.0);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["scriptStatus"]["isRunning"], false);
    }
}
