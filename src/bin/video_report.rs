use deploy_relay::config::VideoConfig;
use deploy_relay::{logging, videos};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

const DEFAULT_ENV_FILE: &str = ".env";

#[tokio::main]
async fn main() -> ExitCode {
    let env_file = std::env::var("VIDEO_ENV_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_ENV_FILE));
    let env_loaded = dotenv::from_path(&env_file);

    let log_guard = logging::setup_logging("video_report");
    if let Err(e) = env_loaded {
        warn!("Could not load env file at {}: {}", env_file.display(), e);
    }

    let code = match VideoConfig::from_env() {
        Ok(config) => match videos::run(&config).await {
            Ok(count) => {
                info!("Done: {} videos", count);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Video report failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    };

    drop(log_guard);
    code
}
