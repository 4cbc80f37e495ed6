use std::env;
use std::process::ExitCode;

use meshsense_mock::run;
use meshsense_mock::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match env::args().nth(1) {
        Some(path) => Settings::from_path(path),
        None => Settings::new(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to load settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level},meshsense_embedded={level}").into()
        }))
        .init();

    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
