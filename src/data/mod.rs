//! Price history model and providers.
//!
//! ## Providers
//! - `CsvHistoryProvider`: one CSV file per symbol on local disk
//! - `MockHistoryProvider`: in-memory histories with failure injection
//!
//! Live market-data vendors plug in by implementing `HistoryProvider`.

mod csv;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod mock;
mod traits;
mod types;

pub use csv::CsvHistoryProvider;
pub use mock::MockHistoryProvider;
pub use traits::HistoryProvider;
pub use types::{PriceBar, PriceHistory};
