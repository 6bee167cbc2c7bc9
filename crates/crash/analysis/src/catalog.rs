//! Threshold and window catalogs

use serde::{Deserialize, Serialize};

/// Window used as the dynamic window when the caller does not choose one.
pub const DEFAULT_LAST_N_GAMES: usize = 3000;

/// A crash multiplier and the percentage of rounds expected to reach it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSpec {
    /// Multiplier a round must reach (inclusive) to qualify.
    pub value: f64,
    /// Expected qualifying rounds per 100, from the payout odds (~99 / value).
    pub expected_rate: f64,
}

impl ThresholdSpec {
    pub const fn new(value: f64, expected_rate: f64) -> Self {
        Self {
            value,
            expected_rate,
        }
    }

    pub fn qualifies(&self, crash_value: f64) -> bool {
        crash_value >= self.value
    }

    /// Qualifying rounds expected in a window of `window_size` rounds.
    pub fn expected_count(&self, window_size: usize) -> f64 {
        self.expected_rate * window_size as f64 / 100.0
    }

    /// A window shorter than the multiplier cannot say anything about its rate.
    pub fn is_covered_by(&self, window_size: usize) -> bool {
        window_size as f64 >= self.value
    }
}

/// Thresholds in report order. The order is part of the dashboard contract
/// and is not numeric.
pub const THRESHOLDS: [ThresholdSpec; 8] = [
    ThresholdSpec::new(50.0, 1.98),
    ThresholdSpec::new(100.0, 0.99),
    ThresholdSpec::new(150.0, 0.66),
    ThresholdSpec::new(300.0, 0.33),
    ThresholdSpec::new(500.0, 0.198),
    ThresholdSpec::new(1000.0, 0.099),
    ThresholdSpec::new(10.0, 9.9),
    ThresholdSpec::new(25.0, 3.96),
];

/// Trailing window sizes evaluated for every threshold.
pub const FIXED_WINDOWS: [usize; 8] = [50, 100, 150, 300, 500, 1000, 3000, 10000];

/// A trailing window over the most recent rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub size: usize,
}

/// The fixed windows followed by the caller's dynamic window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowCatalog {
    windows: Vec<WindowSpec>,
}

impl WindowCatalog {
    /// The dynamic window is appended even when it repeats a fixed size, so
    /// every report has the same shape.
    pub fn with_dynamic(last_n_games: usize) -> Self {
        let windows = FIXED_WINDOWS
            .iter()
            .copied()
            .chain(std::iter::once(last_n_games))
            .map(|size| WindowSpec { size })
            .collect();
        Self { windows }
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowSpec> {
        self.windows.iter()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for WindowCatalog {
    fn default() -> Self {
        Self::with_dynamic(DEFAULT_LAST_N_GAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_order_is_presentation_order() {
        let values: Vec<f64> = THRESHOLDS.iter().map(|t| t.value).collect();
        assert_eq!(
            values,
            vec![50.0, 100.0, 150.0, 300.0, 500.0, 1000.0, 10.0, 25.0]
        );
    }

    #[test]
    fn expected_rates_follow_payout_odds() {
        for t in THRESHOLDS {
            assert!((t.expected_rate - 99.0 / t.value).abs() < 1e-9);
        }
    }

    #[test]
    fn catalog_appends_dynamic_window() {
        let catalog = WindowCatalog::with_dynamic(750);
        let sizes: Vec<usize> = catalog.iter().map(|w| w.size).collect();
        assert_eq!(sizes, vec![50, 100, 150, 300, 500, 1000, 3000, 10000, 750]);
    }

    #[test]
    fn catalog_keeps_duplicate_dynamic_window() {
        let catalog = WindowCatalog::default();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.iter().filter(|w| w.size == 3000).count(), 2);
    }

    #[test]
    fn window_equal_to_threshold_covers_it() {
        let t = ThresholdSpec::new(100.0, 0.99);
        assert!(t.is_covered_by(100));
        assert!(!t.is_covered_by(99));
        assert!((t.expected_count(300) - 2.97).abs() < 1e-9);
    }
}
