use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::Method, web};

use crate::adapters::api::{ApiState, HttpForecastService, configure_routes};
use crate::adapters::forecast_source::ForecastSource;
use crate::adapters::page_fetcher::HttpPageFetcher;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::report::render_comparison_table;
use crate::app::services::{RainForecastService, SystemClock};

fn build_service(config: &AppConfig) -> Result<HttpForecastService, AppError> {
    let fetcher = HttpPageFetcher::new(&config.user_agent).map_err(AppError::runtime)?;
    let source = ForecastSource::new(
        fetcher,
        &config.base_url,
        &config.station_path,
        &config.location,
    );

    Ok(RainForecastService::new(source, SystemClock))
}

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods([Method::GET])
        .allow_any_header()
        .max_age(3600);

    match allowed_origin {
        Some(origin) => cors.allowed_origin(origin),
        None => cors.allow_any_origin(),
    }
}

pub fn run_api(config: AppConfig) -> Result<(), AppError> {
    let api_state = ApiState {
        forecasts: Arc::new(build_service(&config)?),
    };
    let allowed_origin = config.cors_allowed_origin.clone();

    tracing::info!(bind = %config.http_bind, "http server starting");

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .wrap(cors(allowed_origin.as_deref()))
                    .app_data(web::Data::new(api_state.clone()))
                    .configure(configure_routes)
            })
            .bind(config.http_bind)?
            .run()
            .await
        })
        .map_err(AppError::runtime)
}

pub fn run_report(config: AppConfig) -> Result<(), AppError> {
    let service = build_service(&config)?;

    let forecast = actix_web::rt::System::new()
        .block_on(async move { service.fetch_multi_model_forecast().await })
        .map_err(AppError::runtime)?;

    print!("{}", render_comparison_table(&forecast));
    Ok(())
}
