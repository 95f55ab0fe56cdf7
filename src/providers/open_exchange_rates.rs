use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::error::FetchError;
use crate::core::gateway::RateGateway;
use crate::core::model::{CurrencyDirectory, ExchangeRateSnapshot};

/// Gateway for the Open Exchange Rates API. Authentication travels as an
/// `app_id` query parameter on every request.
pub struct OpenExchangeRatesGateway {
    base_url: String,
    app_id: String,
    client: reqwest::Client,
}

impl OpenExchangeRatesGateway {
    pub fn new(base_url: &str, app_id: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fxr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(OpenExchangeRatesGateway {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("app_id", self.app_id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The API reports failures as a structured JSON body; anything
            // else non-2xx is a plain transport-level failure.
            if let Ok(api_error) = serde_json::from_str::<ApiErrorBody>(&body) {
                return Err(FetchError::Api {
                    message: api_error.description.unwrap_or(api_error.message),
                });
            }
            return Err(FetchError::Network(format!(
                "HTTP error: {status} for {endpoint}"
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            FetchError::Network(format!("failed to decode response for {endpoint}: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    timestamp: i64,
    base: String,
    rates: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[allow(dead_code)]
    error: bool,
    message: String,
    description: Option<String>,
}

#[async_trait]
impl RateGateway for OpenExchangeRatesGateway {
    #[instrument(name = "LatestRatesFetch", skip(self))]
    async fn fetch_exchange_rates(&self) -> Result<ExchangeRateSnapshot, FetchError> {
        let response: LatestRatesResponse = self.get_json("/latest.json").await?;
        debug!(
            base = %response.base,
            rates = response.rates.len(),
            "Received latest exchange rates"
        );
        Ok(ExchangeRateSnapshot::new(
            &response.base,
            response.timestamp,
            response.rates,
        ))
    }

    #[instrument(name = "CurrencyDirectoryFetch", skip(self))]
    async fn fetch_currency_directory(&self) -> Result<CurrencyDirectory, FetchError> {
        let names: HashMap<String, String> = self.get_json("/currencies.json").await?;
        debug!(currencies = names.len(), "Received currency directory");
        Ok(CurrencyDirectory::new(names))
    }
}
