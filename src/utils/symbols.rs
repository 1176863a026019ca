//! Ticker normalization and universe assembly.

use std::collections::HashSet;

/// Normalize user input to a provider ticker.
///
/// Bare four-digit Taiwan listings get the `.TW` suffix; everything else is
/// trimmed and upper-cased.
pub fn normalize_symbol(input: &str) -> String {
    let symbol = input.trim().to_uppercase();
    if symbol.len() == 4 && symbol.chars().all(|c| c.is_ascii_digit()) {
        format!("{symbol}.TW")
    } else {
        symbol
    }
}

/// Exchange-traded funds use codes starting with `00`.
pub fn is_fund(symbol: &str) -> bool {
    symbol.starts_with("00")
}

/// Normalize and de-duplicate, keeping the first occurrence of each symbol.
pub fn dedup_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| normalize_symbol(s.as_ref()))
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}
