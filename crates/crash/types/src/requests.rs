//! Request payloads reported by the betting script
//!
//! Required fields are optional here so the daemon can answer a missing field
//! with its own validation message instead of a decoder rejection.

use crate::NewGame;
use serde::{Deserialize, Serialize};

/// A bet was placed on an open round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetPlacedRequest {
    pub game_id: Option<i64>,
    #[serde(default)]
    pub attempted_bet_amount: f64,
    #[serde(default)]
    pub real_bet_amount: f64,
    #[serde(default)]
    pub payout: f64,
    #[serde(default)]
    pub balance: f64,
}

/// A round crashed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameEndedRequest {
    pub game_id: Option<i64>,
    pub crash_value: Option<f64>,
    #[serde(default)]
    pub balance: f64,
}

/// Bulk upload of finalized rounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddGamesRequest {
    pub data: Option<Vec<NewGame>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptStartedRequest {
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptStoppedRequest {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_ended_missing_fields_decode() {
        let req: GameEndedRequest = serde_json::from_str(r#"{"balance": 12.5}"#).unwrap();
        assert!(req.game_id.is_none());
        assert!(req.crash_value.is_none());
        assert_eq!(req.balance, 12.5);
    }

    #[test]
    fn test_add_games_decode() {
        let req: AddGamesRequest =
            serde_json::from_str(r#"{"data": [{"game_id": 1, "crash_value": 2.5}, {"game_id": 2}]}"#)
                .unwrap();
        let data = req.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].crash_value, None);
    }
}
