pub mod cli;
pub mod config;
pub mod converter;
pub mod core;
pub mod log;
pub mod providers;
pub mod selector;

use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Rates {
        amount: f64,
        currency: Option<String>,
        filter: Option<String>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Currency converter starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Rates {
            amount,
            currency,
            filter,
        } => cli::rates::run(&config, amount, currency.as_deref(), filter.as_deref()).await,
    }
}
