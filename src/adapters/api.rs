use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, http::StatusCode, web};
use serde::Serialize;

use crate::adapters::forecast_source::{ScraperError, ScraperErrorKind, SourceConfig};
use crate::adapters::page_fetcher::HttpPageFetcher;
use crate::app::services::{AggregateError, RainForecastService, SystemClock};
use crate::domain::models::WeatherModel;

pub type HttpForecastService = RainForecastService<HttpPageFetcher, SystemClock>;

#[derive(Clone)]
pub struct ApiState {
    pub forecasts: Arc<HttpForecastService>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ScraperErrorResponse {
    #[serde(rename = "type")]
    pub kind: ScraperErrorKind,
    pub error: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UnavailableResponse {
    pub error: String,
    pub models: Vec<WeatherModel>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(get_multi_model_forecast_endpoint)
        .service(get_hourly_feed_endpoint)
        .service(get_model_forecast_endpoint);
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/rain")]
async fn get_multi_model_forecast_endpoint(state: web::Data<ApiState>) -> impl Responder {
    match state.forecasts.fetch_multi_model_forecast().await {
        Ok(forecast) => HttpResponse::Ok().json(forecast),
        Err(error) => aggregate_error_response(error),
    }
}

#[get("/rain/hourly")]
async fn get_hourly_feed_endpoint(state: web::Data<ApiState>) -> impl Responder {
    match state.forecasts.fetch_hourly_feed().await {
        Ok(feed) => HttpResponse::Ok().json(feed),
        Err(error) => scraper_error_response(error),
    }
}

#[get("/rain/{model}")]
async fn get_model_forecast_endpoint(
    state: web::Data<ApiState>,
    path: web::Path<String>,
) -> impl Responder {
    let slug = path.into_inner();
    let Some(source) = SourceConfig::by_slug(&slug) else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("unknown model: {slug}")
        }));
    };

    match state.forecasts.fetch_forecast(source).await {
        Ok(forecast) => HttpResponse::Ok().json(forecast),
        Err(error) => scraper_error_response(error),
    }
}

fn scraper_error_response(error: ScraperError) -> HttpResponse {
    let kind = error.kind();
    let status = match kind {
        ScraperErrorKind::NetworkError | ScraperErrorKind::FetchError => StatusCode::BAD_GATEWAY,
        ScraperErrorKind::ParseError => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(kind = ?kind, error = %error, "forecast request failed");

    HttpResponse::build(status).json(ScraperErrorResponse {
        kind,
        error: error.to_string(),
    })
}

fn aggregate_error_response(error: AggregateError) -> HttpResponse {
    let message = error.to_string();
    tracing::warn!(error = %message, "multi-model forecast unavailable");

    match error {
        AggregateError::AllModelsUnavailable(models) => {
            HttpResponse::ServiceUnavailable().json(UnavailableResponse {
                error: message,
                models,
            })
        }
    }
}
