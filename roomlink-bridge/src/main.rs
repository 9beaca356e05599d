use std::process::ExitCode;
use std::sync::Arc;

use roomlink_bridge::configs::Settings;
use roomlink_bridge::run;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::new() {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            tracing_subscriber::fmt().init();
            tracing::error!("Failed to load settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let bin_name = env!("CARGO_BIN_NAME");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level},{bin_name}={level},tower_http={level}").into()
        }))
        .init();

    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
