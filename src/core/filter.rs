//! Keyword filtering over a currency rate list.

use crate::core::model::CurrencyRate;

/// Case-insensitive substring match against name or symbol. Empty keywords
/// is the identity. Source ordering is preserved.
pub fn filter_rates(rates: &[CurrencyRate], keywords: &str) -> Vec<CurrencyRate> {
    if keywords.is_empty() {
        return rates.to_vec();
    }
    let needle = keywords.to_lowercase();
    rates
        .iter()
        .filter(|rate| {
            rate.name.to_lowercase().contains(&needle)
                || rate.symbol.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
