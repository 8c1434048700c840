use deploy_relay::config::RelayConfig;
use deploy_relay::relay::{ACKNOWLEDGMENT, relay};
use deploy_relay::trigger::TriggerClient;
use deploy_relay::{AppState, logging, router};
use std::future::IntoFuture;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{error, info};

/// Runs the relay once on the body read from stdin, for hosts that start a
/// process per notification.
async fn invoke_once(config: &RelayConfig) -> ExitCode {
    let mut body = Vec::new();
    if let Err(e) = tokio::io::stdin().read_to_end(&mut body).await {
        error!("failed to read deploy event from stdin: {}", e);
        return ExitCode::FAILURE;
    }

    let client = match TriggerClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build trigger client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match relay(&client, &body).await {
        Ok(_) => {
            println!("{}", ACKNOWLEDGMENT);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("error making trigger request: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: RelayConfig) -> ExitCode {
    let bind_address = config.bind_address.clone();
    let state = match AppState::new(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to build trigger client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Forwarding preview deploys to {}", state.trigger.base_url());
    let app = router(state.clone());

    info!("Listening on {}", bind_address);
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_address, e);
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        _ = state.fatal_signalled() => {
            error!("Terminating after a failed trigger request");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let log_guard = logging::setup_logging("deploy_relay");

    let code = match RelayConfig::from_env() {
        Ok(config) if std::env::args().nth(1).as_deref() == Some("invoke") => {
            invoke_once(&config).await
        }
        Ok(config) => serve(config).await,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    };

    // Flush buffered file log lines before the process exits.
    drop(log_guard);
    code
}
