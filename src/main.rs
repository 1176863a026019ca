//! Equity Scanner - Main Entry Point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use equity_scanner::config::Config;
use equity_scanner::data::CsvHistoryProvider;
use equity_scanner::strategy::{
    summarize, Inspection, MarketScanner, ScanReport, ScoreResult, Strategy,
};
use equity_scanner::utils::symbols::{dedup_symbols, normalize_symbol};
use equity_scanner::valuation::{valuate, Fundamentals, Valuation};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Equity Scanner CLI
#[derive(Parser)]
#[command(name = "equity-scanner")]
#[command(version, about = "Indicator-driven equity scanner")]
struct Cli {
    /// Config file (default: ./config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a universe and list qualifying instruments
    Scan {
        /// breakout, trend or value_dip (default from config)
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Raise qualification thresholds
        #[arg(long)]
        strict: bool,

        /// Add a configured sector to the universe (repeatable)
        #[arg(long = "sector")]
        sectors: Vec<String>,

        /// Scan exactly these symbols instead of the configured universe
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Scan every configured sector
        #[arg(long)]
        all: bool,

        /// Keep non-qualifying instruments in the output
        #[arg(long)]
        bypass: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Score one instrument in detail, whether or not it qualifies
    Inspect {
        symbol: String,

        #[arg(short, long)]
        strategy: Option<Strategy>,

        #[arg(long)]
        strict: bool,

        #[arg(long)]
        json: bool,
    },

    /// Price bands and risk flags from supplied fundamentals
    Valuate {
        symbol: String,

        /// Current share price
        #[arg(long)]
        price: Decimal,

        /// Analyst mean target price
        #[arg(long)]
        target: Option<Decimal>,

        #[arg(long)]
        forward_eps: Option<Decimal>,

        #[arg(long)]
        forward_pe: Option<Decimal>,

        #[arg(long, allow_hyphen_values = true)]
        operating_cash_flow: Option<Decimal>,

        /// Fraction, e.g. 0.45
        #[arg(long)]
        gross_margin: Option<Decimal>,

        /// Percent, e.g. 80
        #[arg(long)]
        debt_to_equity: Option<Decimal>,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Scan {
            strategy,
            strict,
            sectors,
            symbols,
            all,
            bypass,
            json,
        } => {
            let universe = if !symbols.is_empty() {
                dedup_symbols(&symbols)
            } else if all {
                config.universe.all()
            } else {
                config.universe.resolve(&sectors)?
            };
            anyhow::ensure!(
                !universe.is_empty(),
                "Universe is empty; configure [universe] symbols or pass --symbols"
            );

            let mut options = config.scan_options();
            options.strategy = strategy.unwrap_or(options.strategy);
            options.strict |= strict;
            options.bypass_qualification |= bypass;

            let provider = Arc::new(CsvHistoryProvider::new(&config.data.csv_dir));
            let report = MarketScanner::new(provider, options).scan(&universe).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Inspect {
            symbol,
            strategy,
            strict,
            json,
        } => {
            let symbol = normalize_symbol(&symbol);
            let mut options = config.scan_options();
            options.strategy = strategy.unwrap_or(options.strategy);
            options.strict |= strict;

            let provider = Arc::new(CsvHistoryProvider::new(&config.data.csv_dir));
            let inspection = MarketScanner::new(provider, options)
                .inspect(&symbol)
                .await
                .with_context(|| format!("Failed to inspect {symbol}"))?;

            if json {
                let latest = inspection.series.points().last();
                let out = serde_json::json!({
                    "result": inspection.result,
                    "summary": summarize(&inspection.result),
                    "latest_indicators": latest,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_inspection(&inspection);
            }
        }
        Commands::Valuate {
            symbol,
            price,
            target,
            forward_eps,
            forward_pe,
            operating_cash_flow,
            gross_margin,
            debt_to_equity,
            json,
        } => {
            let symbol = normalize_symbol(&symbol);
            let fundamentals = Fundamentals {
                current_price: price,
                forward_pe,
                forward_eps,
                target_mean_price: target,
                operating_cash_flow,
                gross_margin,
                debt_to_equity,
            };

            match valuate(&symbol, &fundamentals) {
                Some(valuation) if json => {
                    println!("{}", serde_json::to_string_pretty(&valuation)?)
                }
                Some(valuation) => print_valuation(&valuation, price),
                None => info!(symbol = %symbol, "Funds are not valued"),
            }
        }
    }

    Ok(())
}

/// Initialize logging to stderr and a daily rolling file under `logs/`.
///
/// Stdout is reserved for command output.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "equity-scanner.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer alive for the program duration
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("equity_scanner=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stderr.and(file_writer))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(false)
        .init();

    Ok(())
}

fn print_report(report: &ScanReport) {
    println!(
        "Strategy: {} ({})",
        report.strategy,
        if report.strict { "strict" } else { "loose" }
    );
    println!(
        "Attempted {} | qualified {} | not qualified {} | unavailable {} | insufficient history {}",
        report.attempted,
        report.qualified,
        report.not_qualified,
        report.skipped_unavailable,
        report.skipped_insufficient
    );

    if report.results.is_empty() {
        println!("\nNo instruments matched.");
        return;
    }

    println!(
        "\n{:<12} {:>5}  {:<11} {:>10} {:>8} {:>6} {:>6}  {:<10} {:<12}  SIGNALS",
        "SYMBOL", "SCORE", "ACTION", "PRICE", "CHG%", "RSI", "MFI", "BANDS", "CHIPS"
    );
    for r in &report.results {
        print_row(r);
    }
}

fn print_row(r: &ScoreResult) {
    println!(
        "{:<12} {:>5}  {:<11} {:>10.2} {:>+8.2} {:>6.1} {:>6.1}  {:<10} {:<12}  {}",
        r.symbol,
        r.score,
        r.recommendation.to_string(),
        r.price,
        r.change_pct,
        r.rsi,
        r.mfi,
        r.band_status.to_string(),
        r.chip_status.to_string(),
        r.signal_text()
    );
}

fn print_inspection(inspection: &Inspection) {
    let r = &inspection.result;
    let last_date = inspection
        .series
        .bars()
        .last()
        .map(|b| b.date.to_string())
        .unwrap_or_default();

    println!("{} as of {} ({} bars)", r.symbol, last_date, inspection.series.len());
    println!(
        "   ├─ Strategy:        {} ({})",
        r.strategy,
        if r.strict { "strict" } else { "loose" }
    );
    println!("   ├─ Score:           {} ({})", r.score, r.recommendation);
    println!("   ├─ Qualifies:       {}", r.qualifies);
    println!("   ├─ Price:           {:.2} ({:+.2}%)", r.price, r.change_pct);
    println!("   ├─ RSI / MFI:       {:.1} / {:.1}", r.rsi, r.mfi);
    println!("   ├─ Volume ratio:    {:.2}", r.volume_ratio);
    println!("   ├─ MACD histogram:  {}", r.macd_polarity);
    println!("   ├─ Bands:           {}", r.band_status);
    println!("   ├─ Chips:           {}", r.chip_status);
    println!("   ├─ Bias vs MA20:    {:+.2}%", r.bias_pct);
    println!("   ├─ Big-holder cost: {:.2}", r.big_holder_price);
    println!("   ├─ Support (MA20):  {:.2}", r.support_price);
    println!("   └─ Signals:         {}", r.signal_text());
    println!("\n{}", summarize(r));
}

fn print_valuation(v: &Valuation, price: Decimal) {
    println!("{} valuation ({})", v.symbol, v.model);
    println!("   ├─ Cheap:     {:.2}", v.cheap_price);
    println!("   ├─ Fair:      {:.2}", v.fair_price);
    println!("   ├─ Expensive: {:.2}", v.expensive_price);
    match v.zone {
        Some(zone) => println!("   └─ Price {price:.2} is {zone}"),
        None => println!("   └─ No model applies"),
    }

    if v.risks.is_empty() {
        println!("\nNo balance-sheet risk flags.");
    } else {
        println!("\nRisk flags:");
        for risk in &v.risks {
            println!("   - {risk}");
        }
    }
}
