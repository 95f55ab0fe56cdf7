//! The currency converter presenter: debounces amount input, coordinates
//! the two concurrent gateway fetches, caches the joined rate list, and
//! recomputes converted rates for a passive display contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::cache::Cache;
use crate::core::error::FetchError;
use crate::core::filter::filter_rates;
use crate::core::gateway::RateGateway;
use crate::core::model::{CurrencyRate, convert_rates, join_rates};
use crate::selector::{CurrencySelectorListener, CurrencySelectorPresenter};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Logical cache key for the current default (unconverted) rate list.
const RATE_LIST_KEY: &str = "exchange-currency-rates";

/// A passive view the presenter publishes to. Loading calls bracket every
/// network-bound reload; `reload_data` tells the view to re-read
/// [`ConverterPresenter::rates`]; `show_error` is never called for
/// cancellations.
pub trait ConverterView: Send + Sync {
    fn reload_data(&self);
    fn show_loading(&self);
    fn hide_loading(&self);
    fn show_error(&self, error: &FetchError);
    fn set_currency_selector_enabled(&self, enabled: bool);
}

#[derive(Debug)]
struct State {
    debounce: Duration,
    last_amount: f64,
    selected_symbol: String,
    keywords: String,
    default_rates: Vec<CurrencyRate>,
    converted_rates: Vec<CurrencyRate>,
    filtered_rates: Vec<CurrencyRate>,
}

/// An in-flight fetch pipeline. Sending on `cancel` makes the task observe
/// `FetchError::Cancelled` at its own classification point, so the loading
/// indicator pair stays matched even when the task is superseded.
struct FetchTask {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl FetchTask {
    fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

struct Inner {
    gateway: Arc<dyn RateGateway>,
    cache: Cache<String, Vec<CurrencyRate>>,
    view: Mutex<Option<Weak<dyn ConverterView>>>,
    state: Mutex<State>,
    // Bumped on every committed amount change; stale work compares against
    // it before publishing anything.
    generation: AtomicU64,
    pending_reload: Mutex<Option<JoinHandle<()>>>,
    fetch_task: Mutex<Option<FetchTask>>,
    retired_tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// A cheaply cloneable handle; clones share one coordinator instance.
#[derive(Clone)]
pub struct ConverterPresenter {
    inner: Arc<Inner>,
}

impl ConverterPresenter {
    pub fn new(gateway: Arc<dyn RateGateway>) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                cache: Cache::new(),
                view: Mutex::new(None),
                state: Mutex::new(State {
                    debounce: DEFAULT_DEBOUNCE,
                    last_amount: 0.0,
                    selected_symbol: "USD".to_string(),
                    keywords: String::new(),
                    default_rates: Vec::new(),
                    converted_rates: Vec::new(),
                    filtered_rates: Vec::new(),
                }),
                generation: AtomicU64::new(0),
                pending_reload: Mutex::new(None),
                fetch_task: Mutex::new(None),
                retired_tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn with_selected_symbol(self, symbol: &str) -> Self {
        self.inner.state.lock().unwrap().selected_symbol = symbol.to_string();
        self
    }

    pub fn with_debounce(self, debounce: Duration) -> Self {
        self.inner.state.lock().unwrap().debounce = debounce;
        self
    }

    /// Seeds the displayed lists, e.g. when restoring a previous screen.
    pub fn with_rates(self, rates: Vec<CurrencyRate>) -> Self {
        {
            let mut state = self.inner.state.lock().unwrap();
            state.default_rates = rates.clone();
            state.converted_rates = rates.clone();
            state.filtered_rates = rates;
        }
        self
    }

    /// The view is held weakly; whoever assembles the screen owns it.
    pub fn attach_view(&self, view: &Arc<dyn ConverterView>) {
        *self.inner.view.lock().unwrap() = Some(Arc::downgrade(view));
    }

    /// The list the view re-reads on `reload_data`: converted rates with the
    /// current keyword filter applied.
    pub fn rates(&self) -> Vec<CurrencyRate> {
        self.inner.state.lock().unwrap().filtered_rates.clone()
    }

    pub fn selected_symbol(&self) -> String {
        self.inner.state.lock().unwrap().selected_symbol.clone()
    }

    pub fn last_amount(&self) -> f64 {
        self.inner.state.lock().unwrap().last_amount
    }

    /// Drops the cached default rate list so the next reload goes remote.
    pub async fn invalidate_cache(&self) {
        self.inner.cache.remove(&RATE_LIST_KEY.to_string()).await;
    }

    /// Handles a raw amount text change. Unparsable input and values equal
    /// to the last committed amount are absorbed. A genuinely new value
    /// supersedes any pending debounce and any in-flight fetch, then
    /// schedules a reload after the debounce interval.
    pub fn amount_did_change(&self, value: Option<&str>) {
        let Some(amount) = value.and_then(|v| v.trim().parse::<f64>().ok()) else {
            return;
        };
        let debounce;
        {
            let mut state = self.inner.state.lock().unwrap();
            if amount == state.last_amount {
                return;
            }
            state.last_amount = amount;
            debounce = state.debounce;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_pending_work();

        let presenter = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if presenter.inner.generation.load(Ordering::SeqCst) != generation {
                return;
            }
            presenter.reload(amount).await;
        });
        *self.inner.pending_reload.lock().unwrap() = Some(handle);
    }

    /// Reloads the rate list and publishes it converted by `amount`.
    ///
    /// A cache hit recomputes and publishes within the same turn, with no
    /// loading indicator and no task. A miss starts one cancellable fetch
    /// task that runs both gateway requests concurrently.
    pub async fn reload(&self, amount: f64) {
        if let Some(default_rates) = self.inner.cache.get(&RATE_LIST_KEY.to_string()).await {
            debug!("Publishing converted rates from cache");
            self.publish(&default_rates, amount);
            return;
        }

        let generation = self.inner.generation.load(Ordering::SeqCst);
        if let Some(mut task) = self.inner.fetch_task.lock().unwrap().take() {
            task.cancel();
            self.inner.retired_tasks.lock().unwrap().push(task.handle);
        }

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let presenter = self.clone();
        let handle = tokio::spawn(async move {
            presenter.with_view(|view| view.show_loading());
            let fetched = tokio::select! {
                _ = &mut cancel_rx => Err(FetchError::Cancelled),
                result = async {
                    tokio::try_join!(
                        presenter.inner.gateway.fetch_exchange_rates(),
                        presenter.inner.gateway.fetch_currency_directory(),
                    )
                } => result,
            };
            presenter.with_view(|view| view.hide_loading());

            if presenter.inner.generation.load(Ordering::SeqCst) != generation {
                debug!("Discarding superseded reload result");
                return;
            }

            match fetched {
                Ok((snapshot, directory)) => {
                    let default_rates = join_rates(&snapshot, &directory);
                    presenter
                        .inner
                        .cache
                        .put(RATE_LIST_KEY.to_string(), default_rates.clone())
                        .await;
                    presenter.publish(&default_rates, amount);
                }
                Err(error) if error.is_cancelled() => {
                    debug!("Reload was cancelled");
                }
                Err(error) => {
                    debug!(%error, "Reload failed");
                    presenter.with_view(|view| view.show_error(&error));
                }
            }
        });
        *self.inner.fetch_task.lock().unwrap() = Some(FetchTask {
            cancel: Some(cancel_tx),
            handle,
        });
    }

    /// A direct selection from the selector flow: no debounce, reload with
    /// the last committed amount right away.
    pub async fn handle_currency_selected(&self, symbol: &str) {
        let amount = {
            let mut state = self.inner.state.lock().unwrap();
            state.selected_symbol = symbol.to_string();
            state.last_amount
        };
        self.reload(amount).await;
    }

    /// Re-filters the currently displayed list. The currency selector is
    /// only actionable while no filter is open and there is data to pick
    /// from.
    pub fn keywords_did_change(&self, keywords: &str) {
        let enabled;
        {
            let mut state = self.inner.state.lock().unwrap();
            state.keywords = keywords.to_string();
            state.filtered_rates = filter_rates(&state.converted_rates, keywords);
            enabled = keywords.is_empty() && !state.converted_rates.is_empty();
        }
        self.with_view(|view| {
            view.reload_data();
            view.set_currency_selector_enabled(enabled);
        });
    }

    /// Builds a selector over the current converted rates, wired back to
    /// this presenter as listener.
    pub fn selector(&self) -> CurrencySelectorPresenter {
        let rates = self.inner.state.lock().unwrap().converted_rates.clone();
        let mut selector = CurrencySelectorPresenter::new(rates);
        selector.set_listener(Box::new(self.clone()));
        selector
    }

    /// Awaits every outstanding debounce/fetch task, including superseded
    /// ones. Drives one-shot callers and keeps tests deterministic.
    pub async fn wait_until_idle(&self) {
        loop {
            let pending = self.inner.pending_reload.lock().unwrap().take();
            let fetch = self.inner.fetch_task.lock().unwrap().take();
            let retired: Vec<JoinHandle<()>> =
                self.inner.retired_tasks.lock().unwrap().drain(..).collect();
            if pending.is_none() && fetch.is_none() && retired.is_empty() {
                break;
            }
            if let Some(handle) = pending {
                let _ = handle.await;
            }
            if let Some(FetchTask { cancel, handle }) = fetch {
                // The sender must outlive the await, or dropping it would
                // read as a cancellation to the task being waited on.
                let _ = handle.await;
                drop(cancel);
            }
            for handle in retired {
                let _ = handle.await;
            }
        }
    }

    fn cancel_pending_work(&self) {
        if let Some(handle) = self.inner.pending_reload.lock().unwrap().take() {
            handle.abort();
            self.inner.retired_tasks.lock().unwrap().push(handle);
        }
        if let Some(mut task) = self.inner.fetch_task.lock().unwrap().take() {
            task.cancel();
            self.inner.retired_tasks.lock().unwrap().push(task.handle);
        }
    }

    fn publish(&self, default_rates: &[CurrencyRate], amount: f64) {
        let enabled;
        {
            let mut state = self.inner.state.lock().unwrap();
            state.default_rates = default_rates.to_vec();
            let Some(converted) = convert_rates(default_rates, &state.selected_symbol, amount)
            else {
                debug!(
                    symbol = %state.selected_symbol,
                    "Selected symbol missing from rate list, keeping previous data"
                );
                return;
            };
            state.converted_rates = converted;
            state.filtered_rates = filter_rates(&state.converted_rates, &state.keywords);
            enabled = state.keywords.is_empty() && !state.converted_rates.is_empty();
        }
        self.with_view(|view| {
            view.reload_data();
            view.set_currency_selector_enabled(enabled);
        });
    }

    fn with_view(&self, f: impl FnOnce(&dyn ConverterView)) {
        let view = self
            .inner
            .view
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|view| view.upgrade());
        if let Some(view) = view {
            f(view.as_ref());
        }
    }
}

impl CurrencySelectorListener for ConverterPresenter {
    fn on_currency_selected(&self, symbol: &str) {
        let presenter = self.clone();
        let symbol = symbol.to_string();
        tokio::spawn(async move {
            presenter.handle_currency_selected(&symbol).await;
        });
    }
}
