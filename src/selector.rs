//! The currency selector presenter: a filterable pick list over the
//! converted rates, reporting the chosen symbol back to its listener.

use crate::core::filter::filter_rates;
use crate::core::model::CurrencyRate;
use tracing::debug;

/// Receives the symbol the user picked. The converter presenter implements
/// this to switch its selected currency.
pub trait CurrencySelectorListener: Send + Sync {
    fn on_currency_selected(&self, symbol: &str);
}

pub struct CurrencySelectorPresenter {
    rates: Vec<CurrencyRate>,
    filtered_rates: Vec<CurrencyRate>,
    listener: Option<Box<dyn CurrencySelectorListener>>,
}

impl CurrencySelectorPresenter {
    pub fn new(rates: Vec<CurrencyRate>) -> Self {
        Self {
            filtered_rates: rates.clone(),
            rates,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn CurrencySelectorListener>) {
        self.listener = Some(listener);
    }

    /// The list the pick list displays, in the current filter order.
    pub fn rates(&self) -> &[CurrencyRate] {
        &self.filtered_rates
    }

    pub fn item(&self, index: usize) -> Option<&CurrencyRate> {
        self.filtered_rates.get(index)
    }

    /// Re-filters the pick list against the full rate list, so narrowing
    /// and then widening the keywords brings entries back.
    pub fn keywords_did_change(&mut self, keywords: &str) {
        self.filtered_rates = filter_rates(&self.rates, keywords);
    }

    /// Reports the entry at `index` of the filtered list to the listener.
    /// Out-of-range indices are ignored.
    pub fn select(&self, index: usize) {
        let Some(rate) = self.filtered_rates.get(index) else {
            debug!(index, "Selection index out of range");
            return;
        };
        if let Some(listener) = &self.listener {
            listener.on_currency_selected(&rate.symbol);
        }
    }
}
