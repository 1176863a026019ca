//! Configuration management for the equity scanner.
//!
//! Loads settings from an optional `config.toml` and environment variables
//! prefixed with `SCANNER` (nested keys use `__`, e.g. `SCANNER_SCAN__STRICT`).

use crate::strategy::{ScanOptions, Strategy};
use crate::utils::symbols::dedup_symbols;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scan behaviour
    #[serde(default)]
    pub scan: ScanConfig,
    /// History source
    #[serde(default)]
    pub data: DataConfig,
    /// Instruments to scan
    #[serde(default)]
    pub universe: UniverseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    /// Raise qualification thresholds
    #[serde(default)]
    pub strict: bool,
    /// Maximum concurrent history fetches
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Calendar days of history requested per symbol
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Report non-qualifying instruments too
    #[serde(default)]
    pub bypass_qualification: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one `<SYMBOL>.csv` per instrument
    #[serde(default = "default_csv_dir")]
    pub csv_dir: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Always-scanned symbols
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Named groups selectable from the CLI
    #[serde(default)]
    pub sectors: BTreeMap<String, Vec<String>>,
}

fn default_strategy() -> Strategy {
    Strategy::Breakout
}

fn default_concurrency() -> usize {
    8
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_lookback_days() -> u32 {
    180
}

fn default_csv_dir() -> String {
    "data".to_string()
}

impl Config {
    /// Load configuration from environment variables and `config.toml`.
    pub fn load() -> Result<Self> {
        Self::load_with_file(Path::new("config"), false)
    }

    /// Load from an explicit file, still honouring environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with_file(path, true)
    }

    fn load_with_file(path: &Path, required: bool) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix("SCANNER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.scan.concurrency >= 1,
            "scan.concurrency must be at least 1"
        );

        anyhow::ensure!(
            self.scan.fetch_timeout_secs >= 1,
            "scan.fetch_timeout_secs must be at least 1"
        );

        // 60 trading bars need roughly 90 calendar days
        anyhow::ensure!(
            self.scan.lookback_days >= 90,
            "scan.lookback_days must be at least 90"
        );

        anyhow::ensure!(!self.data.csv_dir.is_empty(), "data.csv_dir must be set");

        Ok(())
    }

    /// Scan options derived from the `[scan]` section.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            strategy: self.scan.strategy,
            strict: self.scan.strict,
            concurrency: self.scan.concurrency,
            fetch_timeout: Duration::from_secs(self.scan.fetch_timeout_secs),
            lookback_days: self.scan.lookback_days,
            bypass_qualification: self.scan.bypass_qualification,
        }
    }
}

impl UniverseConfig {
    /// Base symbols plus the named sectors, normalized and de-duplicated.
    pub fn resolve(&self, sectors: &[String]) -> Result<Vec<String>> {
        let mut symbols = self.symbols.clone();
        for name in sectors {
            let members = self
                .sectors
                .get(name)
                .with_context(|| format!("Unknown sector '{name}'"))?;
            symbols.extend(members.iter().cloned());
        }
        Ok(dedup_symbols(symbols))
    }

    /// Base symbols plus every sector.
    pub fn all(&self) -> Vec<String> {
        dedup_symbols(
            self.symbols
                .iter()
                .chain(self.sectors.values().flatten()),
        )
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            strict: false,
            concurrency: default_concurrency(),
            fetch_timeout_secs: default_fetch_timeout(),
            lookback_days: default_lookback_days(),
            bypass_qualification: false,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
        }
    }
}
