use std::sync::Arc;

use axum::{
    Router, debug_handler,
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::telegram::Update;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/telegram", post(telegram_update))
        .route("/healthcheck", get(healthcheck))
}

pub async fn serve(dispatcher: Arc<Dispatcher>, port: u16) -> anyhow::Result<()> {
    let app = router().with_state(AppState { dispatcher });
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "webhook server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[debug_handler]
async fn telegram_update(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: String,
) -> StatusCode {
    match serde_json::from_str::<Update>(&body) {
        Ok(update) => dispatcher.handle_update(update).await,
        // still 200, otherwise telegram keeps redelivering the same update
        Err(err) => warn!(error = %err, "unparseable webhook payload, dropping"),
    }
    StatusCode::OK
}

#[debug_handler]
async fn healthcheck() -> &'static str {
    "The bot is still running fine :)"
}
