//! Core exchange-rate value types and the join/convert helpers shared by
//! the converter and selector presenters.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single displayable currency: its human-readable name, its uppercase
/// symbol (the unique key, e.g. "USD"), and a rate relative to whatever
/// base the containing list was computed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub name: String,
    pub symbol: String,
    pub rate: f64,
}

/// An immutable snapshot of exchange rates against a base currency, as
/// returned by one successful remote fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRateSnapshot {
    pub base: String,
    pub captured_at: DateTime<Utc>,
    pub rates: HashMap<String, f64>,
}

impl ExchangeRateSnapshot {
    pub fn new(base: &str, timestamp: i64, rates: HashMap<String, f64>) -> Self {
        let captured_at = Utc
            .timestamp_opt(timestamp, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            base: base.to_string(),
            captured_at,
            rates,
        }
    }
}

/// An immutable mapping from currency symbol to display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencyDirectory {
    names: HashMap<String, String>,
}

impl CurrencyDirectory {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    pub fn name_of(&self, symbol: &str) -> Option<&str> {
        self.names.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<HashMap<String, String>> for CurrencyDirectory {
    fn from(names: HashMap<String, String>) -> Self {
        Self::new(names)
    }
}

/// Joins a rate snapshot with a currency directory on symbol. Rates whose
/// symbol has no directory name are dropped. The result is sorted ascending
/// by name, with ties broken by symbol so the ordering is deterministic.
pub fn join_rates(
    snapshot: &ExchangeRateSnapshot,
    directory: &CurrencyDirectory,
) -> Vec<CurrencyRate> {
    let mut rates: Vec<CurrencyRate> = snapshot
        .rates
        .iter()
        .filter_map(|(symbol, rate)| {
            directory.name_of(symbol).map(|name| CurrencyRate {
                name: name.to_string(),
                symbol: symbol.clone(),
                rate: *rate,
            })
        })
        .collect();
    rates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.symbol.cmp(&b.symbol)));
    rates
}

/// Recomputes every rate relative to the selected currency, scaled by
/// `amount`. The selected entry itself comes out with rate == `amount`.
/// Returns `None` when the selected symbol is absent from `rates`; callers
/// treat that as a no-op and keep whatever list they had before.
pub fn convert_rates(
    rates: &[CurrencyRate],
    selected_symbol: &str,
    amount: f64,
) -> Option<Vec<CurrencyRate>> {
    let selected = rates.iter().find(|rate| rate.symbol == selected_symbol)?;
    let selected_rate = selected.rate;
    Some(
        rates
            .iter()
            .map(|entry| CurrencyRate {
                name: entry.name.clone(),
                symbol: entry.symbol.clone(),
                rate: (entry.rate / selected_rate) * amount,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rates: &[(&str, f64)]) -> ExchangeRateSnapshot {
        let rates = rates
            .iter()
            .map(|(symbol, rate)| (symbol.to_string(), *rate))
            .collect();
        ExchangeRateSnapshot::new("USD", 10, rates)
    }

    fn directory(names: &[(&str, &str)]) -> CurrencyDirectory {
        CurrencyDirectory::new(
            names
                .iter()
                .map(|(symbol, name)| (symbol.to_string(), name.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_join_sorts_by_name() {
        let snapshot = snapshot(&[("VND", 100.356), ("JPY", 10.0)]);
        let directory = directory(&[("JPY", "Japanese Yen"), ("VND", "Vietnamese Dong")]);

        let rates = join_rates(&snapshot, &directory);

        assert_eq!(
            rates,
            vec![
                CurrencyRate {
                    name: "Japanese Yen".to_string(),
                    symbol: "JPY".to_string(),
                    rate: 10.0,
                },
                CurrencyRate {
                    name: "Vietnamese Dong".to_string(),
                    symbol: "VND".to_string(),
                    rate: 100.356,
                },
            ]
        );
    }

    #[test]
    fn test_join_drops_symbols_without_a_name() {
        let snapshot = snapshot(&[("JPY", 10.0), ("XXX", 1.0)]);
        let directory = directory(&[("JPY", "Japanese Yen")]);

        let rates = join_rates(&snapshot, &directory);

        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].symbol, "JPY");
    }

    #[test]
    fn test_join_breaks_name_ties_by_symbol() {
        let snapshot = snapshot(&[("BBB", 2.0), ("AAA", 1.0)]);
        let directory = directory(&[("AAA", "Same Name"), ("BBB", "Same Name")]);

        let rates = join_rates(&snapshot, &directory);

        assert_eq!(rates[0].symbol, "AAA");
        assert_eq!(rates[1].symbol, "BBB");
    }

    #[test]
    fn test_convert_scales_every_entry_by_the_selected_rate() {
        let rates = vec![
            CurrencyRate {
                name: "Japanese Yen".to_string(),
                symbol: "JPY".to_string(),
                rate: 10.0,
            },
            CurrencyRate {
                name: "United States Dollar".to_string(),
                symbol: "USD".to_string(),
                rate: 1.0,
            },
        ];

        let converted = convert_rates(&rates, "JPY", 50.0).unwrap();

        assert_eq!(converted[0].symbol, "JPY");
        assert_eq!(converted[0].rate, 50.0);
        assert_eq!(converted[1].symbol, "USD");
        assert_eq!(converted[1].rate, 5.0);
    }

    #[test]
    fn test_convert_with_absent_selected_symbol_is_none() {
        let rates = vec![CurrencyRate {
            name: "Japanese Yen".to_string(),
            symbol: "JPY".to_string(),
            rate: 10.0,
        }];

        assert!(convert_rates(&rates, "USD", 50.0).is_none());
    }
}
