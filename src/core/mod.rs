//! Core business logic abstractions

pub mod cache;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod model;

// Re-export main types for cleaner imports
pub use cache::Cache;
pub use error::FetchError;
pub use filter::filter_rates;
pub use gateway::RateGateway;
pub use model::{
    CurrencyDirectory, CurrencyRate, ExchangeRateSnapshot, convert_rates, join_rates,
};
