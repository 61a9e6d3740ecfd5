pub mod cli;
pub mod core;
pub mod providers;

use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::core::currency::SUPPORTED_CURRENCIES;
use crate::core::Converter;
use crate::providers::ExchangeRateApiProvider;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, info};

pub enum AppCommand {
    Convert { from: String, to: String, amount: f64 },
    Currencies,
    Rates { base: String },
    Interactive,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {:?}", config.provider);
    Ok(config)
}

/// Wires the HTTP provider and its cache into a converter.
pub fn build_converter(config: &AppConfig) -> Result<Converter> {
    let api_key = config.api_key()?;
    let cache = Arc::new(RateCache::new(config.cache_ttl()));
    let provider =
        ExchangeRateApiProvider::new(&config.provider.base_url, &api_key, config.timeout(), cache)?;
    Ok(Converter::new(Arc::new(provider)))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxconv starting...");

    match command {
        AppCommand::Currencies => {
            println!("{}", cli::currencies::render_table(&SUPPORTED_CURRENCIES));
            Ok(())
        }
        AppCommand::Convert { from, to, amount } => {
            let converter = build_converter(&load_config(config_path)?)?;
            cli::convert::run(&converter, &from, &to, amount).await
        }
        AppCommand::Rates { base } => {
            let converter = build_converter(&load_config(config_path)?)?;
            cli::rates::run(&converter, &base).await
        }
        AppCommand::Interactive => {
            let converter = build_converter(&load_config(config_path)?)?;
            let input = BufReader::new(tokio::io::stdin());
            let mut shell = cli::shell::Shell::new(&converter, input, std::io::stdout());
            shell.run().await
        }
    }
}
