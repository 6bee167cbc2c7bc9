#![deny(unsafe_code)]
//! # crash-analysis
//!
//! Threshold appearance-rate analysis over the history of a crash game.
//!
//! For every threshold in a fixed catalog and every trailing window in a fixed
//! catalog (plus one caller-chosen window), the engine counts how many of the
//! most recent rounds crashed at or above the threshold, compares the observed
//! rate with the rate the payout odds predict, and flags windows whose rate is
//! elevated beyond a fixed tolerance.
//!
//! The engine is a pure function of its input: it borrows the history
//! immutably, performs no I/O and keeps no state between calls, so concurrent
//! callers may share one history snapshot.
//!
//! ## Short histories
//!
//! With the default [`RatioDenominator::Nominal`] policy the ratio of a window
//! is `count / window_size * 100` even when fewer rounds than `window_size` are
//! available, so a short history understates the rate of its larger windows.
//! [`RatioDenominator::Available`] divides by the rounds actually present.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod types;

pub use catalog::{
    ThresholdSpec, WindowCatalog, WindowSpec, DEFAULT_LAST_N_GAMES, FIXED_WINDOWS, THRESHOLDS,
};
pub use engine::{
    analyze, analyze_with, evaluate_window, games_ago, parse_last_n_games, QualifyingPrefix,
    ANOMALY_TOLERANCE,
};
pub use error::AnalysisError;
pub use types::{AnalysisOptions, AnalysisReport, RatioDenominator, ThresholdReport, WindowResult};
