use crate::catalog::DEFAULT_LAST_N_GAMES;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// What a window's ratio is divided by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioDenominator {
    /// The nominal window size, even when fewer rounds are available.
    /// Matches the existing dashboard; short histories read low.
    #[default]
    Nominal,
    /// The number of rounds actually inside the window.
    Available,
}

impl std::fmt::Display for RatioDenominator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nominal => write!(f, "nominal"),
            Self::Available => write!(f, "available"),
        }
    }
}

/// Validated inputs of one analysis run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Size of the dynamic window; always positive.
    last_n_games: usize,
    pub denominator: RatioDenominator,
}

impl AnalysisOptions {
    pub fn new(last_n_games: i64, denominator: RatioDenominator) -> Result<Self, AnalysisError> {
        if last_n_games <= 0 {
            return Err(AnalysisError::invalid("last_n_games", last_n_games));
        }
        let last_n_games = usize::try_from(last_n_games)
            .map_err(|_| AnalysisError::invalid("last_n_games", last_n_games))?;
        Ok(Self {
            last_n_games,
            denominator,
        })
    }

    pub fn last_n_games(&self) -> usize {
        self.last_n_games
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            last_n_games: DEFAULT_LAST_N_GAMES,
            denominator: RatioDenominator::Nominal,
        }
    }
}

/// Appearance rate of one threshold within one trailing window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    pub window_size: usize,
    /// Qualifying rounds among the most recent `window_size` rounds.
    pub count: usize,
    pub ratio_percent: f64,
    /// Qualifying rounds the payout odds predict for a window of this size.
    pub avg_expected_count: f64,
    /// Observed rate exceeds the expected rate beyond the tolerance.
    pub anomaly: bool,
    /// Window is shorter than the threshold and not actionable.
    pub hidden: bool,
}

/// All windows of one threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub threshold: f64,
    pub expected_rate: f64,
    /// Rounds since the threshold was last reached (1 = the latest round);
    /// `None` when it was never reached in the supplied history.
    pub games_ago: Option<usize>,
    pub windows: Vec<WindowResult>,
}

impl ThresholdReport {
    pub fn anomalies(&self) -> impl Iterator<Item = &WindowResult> {
        self.windows.iter().filter(|w| w.anomaly)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub last_n_games: usize,
    /// Eligible (finalized) rounds the report was computed over.
    pub history_len: usize,
    pub denominator: RatioDenominator,
    pub thresholds: Vec<ThresholdReport>,
}

impl AnalysisReport {
    pub fn anomaly_count(&self) -> usize {
        self.thresholds.iter().map(|t| t.anomalies().count()).sum()
    }

    pub fn threshold(&self, value: f64) -> Option<&ThresholdReport> {
        self.thresholds.iter().find(|t| t.threshold == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_reject_non_positive_window() {
        assert!(AnalysisOptions::new(0, RatioDenominator::Nominal).is_err());
        assert!(AnalysisOptions::new(-20, RatioDenominator::Available).is_err());
        let opts = AnalysisOptions::new(500, RatioDenominator::Available).unwrap();
        assert_eq!(opts.last_n_games(), 500);
    }

    #[test]
    fn denominator_serde() {
        let json = serde_json::to_string(&RatioDenominator::Available).unwrap();
        assert_eq!(json, "\"available\"");
        assert_eq!(RatioDenominator::default(), RatioDenominator::Nominal);
    }

    #[test]
    fn missing_games_ago_serializes_as_null() {
        let report = ThresholdReport {
            threshold: 1000.0,
            expected_rate: 0.099,
            games_ago: None,
            windows: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["games_ago"].is_null());
    }
}
