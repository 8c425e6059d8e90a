use std::sync::Arc;

use anyhow::Context;
use hushpair::{
    config::Config, dispatch::Dispatcher, logging, pairing::PairingRegistry, poll, server,
    telegram::Bot,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = Config::from_env()?;
    let bot = Arc::new(Bot::new(&config.token));
    let dispatcher = Arc::new(Dispatcher::new(PairingRegistry::new(), bot.clone()));

    match &config.public_url {
        Some(url) => {
            let callback = format!("{url}/telegram");
            bot.set_webhook(&callback)
                .await
                .context("registering webhook")?;
            info!(%callback, "running in webhook mode");
            server::serve(dispatcher, config.port).await
        }
        None => {
            // a leftover webhook registration blocks getUpdates
            if let Err(err) = bot.delete_webhook().await {
                warn!(error = %err, "deleting stale webhook failed");
            }
            info!("running in long-poll mode");
            poll::run(bot, dispatcher).await
        }
    }
}
