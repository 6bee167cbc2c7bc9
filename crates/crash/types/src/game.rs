//! Game rounds and their outcomes

use crate::GameId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decimal places kept when a settled profit is stored or reported.
const PROFIT_DECIMALS: i32 = 5;

/// A finalized round as seen by the analysis engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub sequence_id: GameId,
    pub crash_value: f64,
}

impl Outcome {
    pub fn new(sequence_id: impl Into<GameId>, crash_value: f64) -> Self {
        Self {
            sequence_id: sequence_id.into(),
            crash_value,
        }
    }

    /// Rounds still in progress or cancelled carry a crash value of 0.
    pub fn is_finalized(&self) -> bool {
        self.crash_value > 0.0
    }
}

/// Persisted game row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: GameId,

    /// Crash multiplier; 0 while the round is open
    pub crash_value: f64,

    #[serde(default)]
    pub attempted_bet_amount: f64,

    #[serde(default)]
    pub real_bet_amount: f64,

    #[serde(default)]
    pub payout: f64,

    #[serde(default)]
    pub balance_before: f64,

    #[serde(default)]
    pub balance_after: f64,

    #[serde(default)]
    pub profit: f64,

    pub reported_at: DateTime<Utc>,
}

impl GameRecord {
    /// A bare finalized round, as imported from CSV or bulk upload.
    pub fn finalized(game_id: GameId, crash_value: f64) -> Self {
        Self {
            game_id,
            crash_value,
            attempted_bet_amount: 0.0,
            real_bet_amount: 0.0,
            payout: 0.0,
            balance_before: 0.0,
            balance_after: 0.0,
            profit: 0.0,
            reported_at: Utc::now(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            sequence_id: self.game_id,
            crash_value: self.crash_value,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome().is_finalized()
    }
}

/// One entry of a bulk game upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGame {
    pub game_id: Option<i64>,
    pub crash_value: Option<f64>,
}

/// Profit of a settled round.
///
/// A balance that grew since the bet was placed means the bet paid out, and the
/// stake is subtracted from the gain; otherwise the stake was lost.
pub fn settle_profit(balance_before: f64, real_bet_amount: f64, balance_after: f64) -> f64 {
    let profit = if balance_after > balance_before {
        (balance_after - balance_before) - real_bet_amount
    } else {
        -real_bet_amount
    };
    round_profit(profit)
}

fn round_profit(value: f64) -> f64 {
    let scale = 10f64.powi(PROFIT_DECIMALS);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_profit_on_win() {
        // 100 before, bet 10, cashed out at 2x: balance 110 after the payout
        let profit = settle_profit(100.0, 10.0, 110.0);
        assert!((profit - 0.0).abs() < 1e-9);

        let profit = settle_profit(100.0, 10.0, 125.5);
        assert!((profit - 15.5).abs() < 1e-9);
    }

    #[test]
    fn test_settle_profit_on_loss() {
        assert_eq!(settle_profit(100.0, 10.0, 90.0), -10.0);
        assert_eq!(settle_profit(100.0, 10.0, 100.0), -10.0);
    }

    #[test]
    fn test_settle_profit_rounds_to_five_places() {
        let profit = settle_profit(1.0, 0.123456789, 2.0);
        assert_eq!(profit, 0.87654);
    }

    #[test]
    fn test_outcome_finalized() {
        assert!(Outcome::new(1, 1.01).is_finalized());
        assert!(!Outcome::new(2, 0.0).is_finalized());
        assert!(!Outcome::new(3, f64::NAN).is_finalized());
    }

    #[test]
    fn test_record_projects_outcome() {
        let record = GameRecord::finalized(GameId::new(10), 3.5);
        assert_eq!(record.outcome(), Outcome::new(10, 3.5));
        assert!(record.is_finalized());
    }
}
