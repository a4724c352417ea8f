mod config;
mod error;
mod logging;
pub mod report;
mod runtime;
pub mod services;

pub use error::AppError;

fn bootstrap(entrypoint: &str) -> Result<config::AppConfig, AppError> {
    logging::init()?;

    let config = config::AppConfig::from_env()?;

    tracing::info!(
        entrypoint,
        http_bind = %config.http_bind,
        base_url = %config.base_url,
        station_path = %config.station_path,
        location = %config.location,
        cors_allowed_origin = config.cors_allowed_origin.as_deref().unwrap_or("*"),
        "application bootstrap initialized"
    );

    Ok(config)
}

pub fn run_api() -> Result<(), AppError> {
    runtime::run_api(bootstrap("api")?)
}

pub fn run_report() -> Result<(), AppError> {
    runtime::run_report(bootstrap("report")?)
}
