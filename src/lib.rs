pub mod api;
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod relay;
pub mod trigger;
pub mod videos;

use axum::extract::DefaultBodyLimit;
use axum::{Router, routing};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::RelayConfig;
use crate::error::Result;
use crate::trigger::TriggerClient;

/// Route the hosting platform posts deploy-succeeded notifications to.
pub const DEPLOY_SUCCEEDED_PATH: &str = "/deploy-succeeded";
/// Same handler under the serverless-function path the platform uses.
pub const FUNCTION_PATH: &str = "/.netlify/functions/deploy-succeeded";

/// Per-process state. Invocations share nothing else.
pub struct AppState {
    pub config: RelayConfig,
    pub trigger: TriggerClient,
    fatal: Notify,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let trigger = TriggerClient::from_config(&config)?;
        Ok(Self {
            config,
            trigger,
            fatal: Notify::new(),
        })
    }

    /// Asks the process to terminate after a fatal forwarding failure.
    pub fn signal_fatal(&self) {
        self.fatal.notify_one();
    }

    /// Resolves once a handler has signalled a fatal forwarding failure.
    pub async fn fatal_signalled(&self) {
        self.fatal.notified().await;
    }
}

pub type SharedState = Arc<AppState>;

/// Deploy notifications are acknowledged whatever their size, so the deploy
/// routes carry no body limit.
pub fn router(state: SharedState) -> Router {
    let deploy_routes: Router<SharedState> = Router::new()
        .route(DEPLOY_SUCCEEDED_PATH, routing::post(api::deploy_succeeded))
        .route(FUNCTION_PATH, routing::post(api::deploy_succeeded))
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route("/", routing::get(api::root))
        .merge(deploy_routes)
        .with_state(state)
}
