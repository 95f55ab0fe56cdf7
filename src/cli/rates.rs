//! The `rates` command: drives the converter presenter once and renders
//! the converted rate list as a table.

use super::ui;
use crate::config::AppConfig;
use crate::converter::{ConverterPresenter, ConverterView};
use crate::core::error::FetchError;
use crate::core::model::CurrencyRate;
use crate::providers::OpenExchangeRatesGateway;
use anyhow::Result;
use comfy_table::Cell;
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Terminal rendition of the converter's display contract. `reload_data`
/// re-reads the presenter's rate list and prints it.
struct ConsoleView {
    amount: f64,
    presenter: Mutex<Option<ConverterPresenter>>,
    spinner: Mutex<Option<ProgressBar>>,
    error: Mutex<Option<FetchError>>,
    printed: AtomicBool,
}

impl ConsoleView {
    fn new(amount: f64) -> Self {
        Self {
            amount,
            presenter: Mutex::new(None),
            spinner: Mutex::new(None),
            error: Mutex::new(None),
            printed: AtomicBool::new(false),
        }
    }

    fn bind(&self, presenter: &ConverterPresenter) {
        *self.presenter.lock().unwrap() = Some(presenter.clone());
    }

    fn take_error(&self) -> Option<FetchError> {
        self.error.lock().unwrap().take()
    }
}

impl ConverterView for ConsoleView {
    fn reload_data(&self) {
        let presenter = self.presenter.lock().unwrap().clone();
        let Some(presenter) = presenter else {
            return;
        };
        let output = render_table(
            &presenter.rates(),
            &presenter.selected_symbol(),
            self.amount,
        );
        println!("{output}");
        self.printed.store(true, Ordering::SeqCst);
    }

    fn show_loading(&self) {
        *self.spinner.lock().unwrap() = Some(ui::new_spinner("Fetching exchange rates..."));
    }

    fn hide_loading(&self) {
        if let Some(spinner) = self.spinner.lock().unwrap().take() {
            spinner.finish_and_clear();
        }
    }

    fn show_error(&self, error: &FetchError) {
        eprintln!("{}", ui::style_text(&error.to_string(), ui::StyleType::Error));
        *self.error.lock().unwrap() = Some(error.clone());
    }

    fn set_currency_selector_enabled(&self, enabled: bool) {
        debug!(enabled, "Currency selector availability changed");
    }
}

fn render_table(rates: &[CurrencyRate], symbol: &str, amount: f64) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Symbol"),
        ui::header_cell(&format!("Amount ({symbol})")),
    ]);

    for rate in rates {
        table.add_row(vec![
            Cell::new(&rate.name),
            Cell::new(&rate.symbol),
            ui::amount_cell(rate.rate),
        ]);
    }

    let title = format!("{amount} {symbol} converts to:");
    let footer = format!("{} currencies", rates.len());
    format!(
        "{}\n\n{}\n{}",
        ui::style_text(&title, ui::StyleType::Title),
        table,
        ui::style_text(&footer, ui::StyleType::Subtle)
    )
}

/// Loads the rate list once and prints `amount` converted into every known
/// currency, denominated in `currency` (falling back to the configured
/// default). An optional keyword filter narrows the printed list.
pub async fn run(
    config: &AppConfig,
    amount: f64,
    currency: Option<&str>,
    filter: Option<&str>,
) -> Result<()> {
    let gateway = OpenExchangeRatesGateway::new(&config.api.base_url, &config.api.app_id)?;
    let presenter = ConverterPresenter::new(Arc::new(gateway))
        .with_selected_symbol(currency.unwrap_or(&config.currency))
        .with_debounce(Duration::from_millis(config.debounce_ms));

    // Keywords are set before the view attaches so the single publish after
    // the fetch already carries the filtered list.
    if let Some(keywords) = filter {
        presenter.keywords_did_change(keywords);
    }

    let view = Arc::new(ConsoleView::new(amount));
    view.bind(&presenter);
    let dyn_view: Arc<dyn ConverterView> = Arc::clone(&view) as Arc<dyn ConverterView>;
    presenter.attach_view(&dyn_view);

    presenter.reload(amount).await;
    presenter.wait_until_idle().await;

    if let Some(error) = view.take_error() {
        anyhow::bail!("Failed to load exchange rates: {error}");
    }
    // A successful fetch that never published means the requested currency
    // is not part of the rate list.
    if !view.printed.load(Ordering::SeqCst) {
        anyhow::bail!(
            "Currency '{}' is not in the fetched rate list",
            presenter.selected_symbol()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rates() -> Vec<CurrencyRate> {
        vec![
            CurrencyRate {
                name: "Japanese Yen".to_string(),
                symbol: "JPY".to_string(),
                rate: 1473.2,
            },
            CurrencyRate {
                name: "Vietnamese Dong".to_string(),
                symbol: "VND".to_string(),
                rate: 253801.55,
            },
        ]
    }

    #[test]
    fn test_render_table_lists_each_currency() {
        let output = render_table(&sample_rates(), "USD", 10.0);

        assert!(output.contains("10 USD converts to:"));
        assert!(output.contains("Japanese Yen"));
        assert!(output.contains("JPY"));
        assert!(output.contains("1473.2000"));
        assert!(output.contains("Vietnamese Dong"));
        assert!(output.contains("2 currencies"));
    }

    #[test]
    fn test_render_table_with_no_rates_is_still_well_formed() {
        let output = render_table(&[], "EUR", 1.0);

        assert!(output.contains("1 EUR converts to:"));
        assert!(output.contains("0 currencies"));
    }
}
