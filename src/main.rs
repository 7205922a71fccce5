use std::process::ExitCode;

use lantern::config::Config;
use lantern::server::listener::{self, ServerError};
use tracing_subscriber::EnvFilter;

const CONFIG_ERROR_EXIT: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    let Some(config_path) = std::env::args().nth(1) else {
        println!("Usage: lantern <config.yaml>");
        return ExitCode::SUCCESS;
    };

    let cfg = match Config::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "Couldn't load configuration from {}", config_path);
            return ExitCode::from(CONFIG_ERROR_EXIT);
        }
    };

    tokio::select! {
        res = listener::run(&cfg) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "Server stopped");
                let code = e
                    .downcast_ref::<ServerError>()
                    .map(ServerError::exit_code)
                    .unwrap_or(4);
                return ExitCode::from(code);
            }
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    ExitCode::SUCCESS
}
