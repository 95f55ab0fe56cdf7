//! Remote data gateway abstraction

use crate::core::error::FetchError;
use crate::core::model::{CurrencyDirectory, ExchangeRateSnapshot};
use async_trait::async_trait;

#[async_trait]
pub trait RateGateway: Send + Sync {
    /// Fetch the latest exchange rates against the remote's base currency.
    async fn fetch_exchange_rates(&self) -> Result<ExchangeRateSnapshot, FetchError>;

    /// Fetch the symbol-to-display-name directory.
    async fn fetch_currency_directory(&self) -> Result<CurrencyDirectory, FetchError>;
}
