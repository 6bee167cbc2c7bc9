//! Windowed appearance-rate aggregation

use crate::catalog::{ThresholdSpec, WindowCatalog, WindowSpec, DEFAULT_LAST_N_GAMES, THRESHOLDS};
use crate::error::AnalysisError;
use crate::types::{
    AnalysisOptions, AnalysisReport, RatioDenominator, ThresholdReport, WindowResult,
};
use crash_types::Outcome;

/// Absolute tolerance, in percentage points, above the expected rate before a
/// window is flagged.
pub const ANOMALY_TOLERANCE: f64 = 0.02;

/// Run the analysis with the nominal ratio denominator.
///
/// `history` must be ordered newest first. Fails with
/// [`AnalysisError::InvalidParameter`] when `last_n_games` is not positive.
pub fn analyze(history: &[Outcome], last_n_games: i64) -> Result<AnalysisReport, AnalysisError> {
    let options = AnalysisOptions::new(last_n_games, RatioDenominator::Nominal)?;
    Ok(analyze_with(history, &options))
}

/// Run the analysis with validated options.
pub fn analyze_with(history: &[Outcome], options: &AnalysisOptions) -> AnalysisReport {
    let eligible: Vec<Outcome> = history.iter().copied().filter(Outcome::is_finalized).collect();
    let catalog = WindowCatalog::with_dynamic(options.last_n_games());

    let thresholds: Vec<ThresholdReport> = THRESHOLDS
        .iter()
        .map(|threshold| {
            let prefix = QualifyingPrefix::build(&eligible, threshold);
            ThresholdReport {
                threshold: threshold.value,
                expected_rate: threshold.expected_rate,
                games_ago: games_ago(&eligible, threshold),
                windows: catalog
                    .iter()
                    .map(|window| evaluate_window(threshold, *window, &prefix, options.denominator))
                    .collect(),
            }
        })
        .collect();

    let report = AnalysisReport {
        last_n_games: options.last_n_games(),
        history_len: eligible.len(),
        denominator: options.denominator,
        thresholds,
    };

    tracing::debug!(
        history_len = report.history_len,
        skipped = history.len() - report.history_len,
        last_n_games = report.last_n_games,
        anomalies = report.anomaly_count(),
        "appearance-rate analysis complete"
    );

    report
}

/// Rounds since `threshold` was last reached, counting the latest round as 1.
pub fn games_ago(history: &[Outcome], threshold: &ThresholdSpec) -> Option<usize> {
    history
        .iter()
        .filter(|o| o.is_finalized())
        .position(|o| threshold.qualifies(o.crash_value))
        .map(|index| index + 1)
}

/// Running count of qualifying rounds from the newest round backwards.
#[derive(Clone, Debug)]
pub struct QualifyingPrefix {
    /// `counts[i]` is the number of qualifying rounds among the newest `i`.
    counts: Vec<usize>,
}

impl QualifyingPrefix {
    pub fn build(history: &[Outcome], threshold: &ThresholdSpec) -> Self {
        let mut counts = Vec::with_capacity(history.len() + 1);
        counts.push(0);
        let mut running = 0;
        for outcome in history {
            if threshold.qualifies(outcome.crash_value) {
                running += 1;
            }
            counts.push(running);
        }
        Self { counts }
    }

    /// Rounds actually present inside a window of `size`.
    pub fn available(&self, size: usize) -> usize {
        size.min(self.counts.len() - 1)
    }

    /// Qualifying rounds inside a window of `size`.
    pub fn count(&self, size: usize) -> usize {
        self.counts[self.available(size)]
    }
}

/// Evaluate one threshold over one trailing window.
pub fn evaluate_window(
    threshold: &ThresholdSpec,
    window: WindowSpec,
    prefix: &QualifyingPrefix,
    denominator: RatioDenominator,
) -> WindowResult {
    let count = prefix.count(window.size);
    let divisor = match denominator {
        RatioDenominator::Nominal => window.size,
        RatioDenominator::Available => prefix.available(window.size),
    };
    let ratio_percent = if divisor == 0 {
        0.0
    } else {
        count as f64 / divisor as f64 * 100.0
    };

    let hidden = !threshold.is_covered_by(window.size);
    let anomaly = !hidden && ratio_percent > threshold.expected_rate + ANOMALY_TOLERANCE;

    WindowResult {
        window_size: window.size,
        count,
        ratio_percent,
        avg_expected_count: threshold.expected_count(window.size),
        anomaly,
        hidden,
    }
}

/// Interpret the dynamic window parameter of a request.
///
/// Absent or non-numeric input falls back to the default window; decimals are
/// truncated toward zero. A value that ends up non-positive is rejected.
pub fn parse_last_n_games(raw: Option<&str>) -> Result<usize, AnalysisError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_LAST_N_GAMES);
    };

    let parsed = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => match raw.parse::<f64>() {
            Ok(f) if f.is_finite() => f.trunc() as i64,
            _ => return Ok(DEFAULT_LAST_N_GAMES),
        },
    };

    AnalysisOptions::new(parsed, RatioDenominator::Nominal).map(|opts| opts.last_n_games())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FIXED_WINDOWS;

    fn history(values: &[(i64, f64)]) -> Vec<Outcome> {
        values.iter().map(|&(id, v)| Outcome::new(id, v)).collect()
    }

    fn sample() -> Vec<Outcome> {
        history(&[(5, 120.0), (4, 40.0), (3, 200.0), (2, 10.0), (1, 5.0)])
    }

    fn window(report: &ThresholdReport, size: usize) -> &WindowResult {
        report
            .windows
            .iter()
            .find(|w| w.window_size == size)
            .unwrap()
    }

    #[test]
    fn short_history_uses_nominal_denominator() {
        let report = analyze(&sample(), 3000).unwrap();
        let t100 = report.threshold(100.0).unwrap();

        let w50 = window(t100, 50);
        assert_eq!(w50.count, 2);
        assert!((w50.ratio_percent - 4.0).abs() < 1e-9);
        assert_eq!(t100.games_ago, Some(1));
    }

    #[test]
    fn available_denominator_divides_by_present_rounds() {
        let opts = AnalysisOptions::new(3000, RatioDenominator::Available).unwrap();
        let report = analyze_with(&sample(), &opts);
        let t100 = report.threshold(100.0).unwrap();

        let w50 = window(t100, 50);
        assert_eq!(w50.count, 2);
        assert!((w50.ratio_percent - 40.0).abs() < 1e-9);
        assert_eq!(report.denominator, RatioDenominator::Available);
    }

    #[test]
    fn empty_history_yields_zero_report() {
        let report = analyze(&[], 3000).unwrap();
        assert_eq!(report.history_len, 0);
        assert_eq!(report.thresholds.len(), THRESHOLDS.len());
        for t in &report.thresholds {
            assert_eq!(t.games_ago, None);
            assert_eq!(t.windows.len(), FIXED_WINDOWS.len() + 1);
            for w in &t.windows {
                assert_eq!(w.count, 0);
                assert_eq!(w.ratio_percent, 0.0);
                assert!(!w.anomaly);
            }
        }
        assert_eq!(report.anomaly_count(), 0);
    }

    #[test]
    fn empty_history_with_available_denominator_is_zero() {
        let opts = AnalysisOptions::new(10, RatioDenominator::Available).unwrap();
        let report = analyze_with(&[], &opts);
        assert!(report
            .thresholds
            .iter()
            .flat_map(|t| t.windows.iter())
            .all(|w| w.ratio_percent == 0.0 && !w.anomaly));
    }

    #[test]
    fn zero_window_is_invalid() {
        let err = analyze(&sample(), 0).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidParameter {
                name: "last_n_games",
                ..
            }
        ));
        assert!(analyze(&sample(), -1).is_err());
    }

    #[test]
    fn thresholds_keep_catalog_order() {
        let report = analyze(&sample(), 100).unwrap();
        let order: Vec<f64> = report.thresholds.iter().map(|t| t.threshold).collect();
        assert_eq!(order, vec![50.0, 100.0, 150.0, 300.0, 500.0, 1000.0, 10.0, 25.0]);
    }

    #[test]
    fn dynamic_window_is_last() {
        let report = analyze(&sample(), 42).unwrap();
        for t in &report.thresholds {
            assert_eq!(t.windows.last().unwrap().window_size, 42);
        }
        assert_eq!(report.last_n_games, 42);
    }

    #[test]
    fn windows_shorter_than_threshold_are_hidden() {
        let report = analyze(&sample(), 3000).unwrap();
        let t1000 = report.threshold(1000.0).unwrap();
        for size in [50, 100, 150, 300, 500] {
            let w = window(t1000, size);
            assert!(w.hidden);
            assert!(!w.anomaly);
        }
        assert!(!window(t1000, 1000).hidden);
        assert!(!window(t1000, 3000).hidden);
    }

    #[test]
    fn hidden_window_never_flags_anomaly() {
        // 150 of the last 150 rounds at 300x: every rate is extreme
        let hot: Vec<Outcome> = (0..150).rev().map(|id| Outcome::new(id, 300.0)).collect();
        let report = analyze(&hot, 150).unwrap();
        let t300 = report.threshold(300.0).unwrap();
        let w150 = window(t300, 150);
        assert!(w150.hidden);
        assert!(!w150.anomaly);
        assert_eq!(w150.count, 150);
    }

    #[test]
    fn window_equal_to_threshold_is_eligible() {
        // one 100x round within the last 100: 1% vs 0.99% expected, within tolerance
        let mut rounds: Vec<Outcome> = (0..100).rev().map(|id| Outcome::new(id, 1.5)).collect();
        rounds[10].crash_value = 100.0;
        let report = analyze(&rounds, 3000).unwrap();
        let w100 = window(report.threshold(100.0).unwrap(), 100);
        assert!(!w100.hidden);
        assert!((w100.ratio_percent - 1.0).abs() < 1e-9);
        assert!(!w100.anomaly);

        // two of them: 2% clearly above 1.01%
        rounds[20].crash_value = 150.0;
        let report = analyze(&rounds, 3000).unwrap();
        let w100 = window(report.threshold(100.0).unwrap(), 100);
        assert_eq!(w100.count, 2);
        assert!(w100.anomaly);
    }

    #[test]
    fn tolerance_is_absolute_percentage_points() {
        // 10x expects 9.9%; 10 of 100 is 10.0%, within 0.02 points
        let mut rounds: Vec<Outcome> = (0..100).rev().map(|id| Outcome::new(id, 1.2)).collect();
        for r in rounds.iter_mut().take(10) {
            r.crash_value = 12.0;
        }
        let report = analyze(&rounds, 100).unwrap();
        let w100 = window(report.threshold(10.0).unwrap(), 100);
        assert!((w100.ratio_percent - 10.0).abs() < 1e-9);
        assert!(w100.ratio_percent > 9.9);
        assert!(!w100.anomaly);

        // 11 of 100 is 11.0%, beyond it
        rounds[50].crash_value = 10.0;
        let report = analyze(&rounds, 100).unwrap();
        assert!(window(report.threshold(10.0).unwrap(), 100).anomaly);
    }

    #[test]
    fn ratio_exactly_at_tolerance_is_not_flagged() {
        // one 50x round in the last 50 is 2.0%, equal to 1.98 + 0.02
        let mut rounds: Vec<Outcome> = (0..50).rev().map(|id| Outcome::new(id, 1.3)).collect();
        rounds[5].crash_value = 50.0;
        let report = analyze(&rounds, 50).unwrap();
        let w50 = window(report.threshold(50.0).unwrap(), 50);
        assert_eq!(w50.count, 1);
        assert_eq!(w50.ratio_percent, 1.98 + ANOMALY_TOLERANCE);
        assert!(!w50.hidden);
        assert!(!w50.anomaly);
    }

    #[test]
    fn expected_count_scales_with_window() {
        let report = analyze(&sample(), 3000).unwrap();
        let t50 = report.threshold(50.0).unwrap();
        assert!((window(t50, 50).avg_expected_count - 0.99).abs() < 1e-9);
        assert!((window(t50, 1000).avg_expected_count - 19.8).abs() < 1e-9);
    }

    #[test]
    fn non_positive_values_are_skipped() {
        let rounds = history(&[(9, 0.0), (8, 0.0), (7, 60.0), (6, -1.0), (5, 2.0)]);
        let report = analyze(&rounds, 3000).unwrap();
        assert_eq!(report.history_len, 2);

        let t50 = report.threshold(50.0).unwrap();
        assert_eq!(t50.games_ago, Some(1));
        assert_eq!(window(t50, 50).count, 1);
    }

    #[test]
    fn games_ago_counts_from_latest_round() {
        let rounds = sample();
        assert_eq!(games_ago(&rounds, &ThresholdSpec::new(150.0, 0.66)), Some(3));
        assert_eq!(games_ago(&rounds, &ThresholdSpec::new(10.0, 9.9)), Some(1));
        assert_eq!(games_ago(&rounds, &ThresholdSpec::new(500.0, 0.198)), None);
    }

    #[test]
    fn qualifying_is_inclusive() {
        let rounds = history(&[(2, 25.0), (1, 24.99)]);
        let report = analyze(&rounds, 3000).unwrap();
        let t25 = report.threshold(25.0).unwrap();
        assert_eq!(t25.games_ago, Some(1));
        assert_eq!(window(t25, 50).count, 1);
    }

    #[test]
    fn input_history_is_untouched() {
        let rounds = sample();
        let before = rounds.clone();
        let first = analyze(&rounds, 300).unwrap();
        let second = analyze(&rounds, 300).unwrap();
        assert_eq!(rounds, before);
        assert_eq!(first, second);
    }

    #[test]
    fn parse_last_n_games_defaults_and_truncates() {
        assert_eq!(parse_last_n_games(None).unwrap(), 3000);
        assert_eq!(parse_last_n_games(Some("")).unwrap(), 3000);
        assert_eq!(parse_last_n_games(Some("abc")).unwrap(), 3000);
        assert_eq!(parse_last_n_games(Some("NaN")).unwrap(), 3000);
        assert_eq!(parse_last_n_games(Some("500")).unwrap(), 500);
        assert_eq!(parse_last_n_games(Some(" 750 ")).unwrap(), 750);
        assert_eq!(parse_last_n_games(Some("2.9")).unwrap(), 2);
        assert_eq!(parse_last_n_games(Some("1e3")).unwrap(), 1000);
    }

    #[test]
    fn parse_last_n_games_rejects_non_positive() {
        assert!(parse_last_n_games(Some("0")).is_err());
        assert!(parse_last_n_games(Some("-10")).is_err());
        assert!(parse_last_n_games(Some("0.5")).is_err());
    }

    #[test]
    fn prefix_clamps_to_available_rounds() {
        let rounds = sample();
        let prefix = QualifyingPrefix::build(&rounds, &ThresholdSpec::new(100.0, 0.99));
        assert_eq!(prefix.available(3), 3);
        assert_eq!(prefix.available(10_000), 5);
        assert_eq!(prefix.count(1), 1);
        assert_eq!(prefix.count(2), 1);
        assert_eq!(prefix.count(3), 2);
        assert_eq!(prefix.count(10_000), 2);
    }
}
