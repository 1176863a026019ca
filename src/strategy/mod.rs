//! Signal scoring and market scanning.
//!
//! Contains the core logic for:
//! - Feature extraction from an indicator series
//! - Rule-based scoring for the breakout, trend, and value-dip strategies
//! - Universe scans with bounded concurrency

mod features;
mod rules;
mod scanner;
mod scoring;
mod summary;

pub use features::{extract_features, FeatureBundle};
pub use rules::{Evaluation, Signal, Strategy};
pub use scanner::{Inspection, MarketScanner, ScanOptions, ScanReport};
pub use scoring::{
    evaluate_history, evaluate_series, score, BandStatus, ChipStatus, MacdPolarity,
    Recommendation, ScoreResult,
};
pub use summary::summarize;
