use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::telegram::Bot;

const RETRY_DELAY: Duration = Duration::from_secs(5);

/// getUpdates loop for deployments without a public URL.
pub async fn run(bot: Arc<Bot>, dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    let mut offset = 0;
    info!("long-poll loop started");

    loop {
        let updates = match bot.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "getUpdates failed, retrying");
                tokio::time::sleep(RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            // a slow outbound send must not stall the next poll round
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move {
                dispatcher.handle_update(update).await;
            });
        }
    }
}
