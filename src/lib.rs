//! # Equity Scanner
//!
//! Scores equities against technical setups computed from daily OHLCV
//! history and ranks the instruments that qualify.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `data`: Price bars, history providers (CSV directory, in-memory mock)
//! - `indicators`: Moving averages, RSI, MACD, OBV, MFI, Bollinger bands
//! - `strategy`: Feature extraction, rule scoring, and universe scans
//! - `valuation`: Fundamentals-based price bands and risk flags
//! - `error`: Error taxonomy shared by the library
//! - `utils`: Shared utilities, decimal arithmetic, and ticker handling

pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod strategy;
pub mod utils;
pub mod valuation;

pub use config::Config;
pub use error::{ScanError, ScanResult};
