use anyhow::Result;
use log::info;
use std::sync::Arc;

use crypto_info_bot::api::{CoinGeckoClient, NewsClient};
use crypto_info_bot::config::Config;
use crypto_info_bot::dispatcher::Dispatcher;
use crypto_info_bot::telegram::CryptoBot;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    info!("Configuration loaded.");

    let dispatcher = Dispatcher::new(
        CoinGeckoClient::new(),
        NewsClient::new(config.news_api_key.clone()),
    );
    let bot = Arc::new(CryptoBot::new(config.telegram_token.clone(), dispatcher));

    info!("Starting crypto info bot...");
    bot.run().await?;

    Ok(())
}
