use chrono::{DateTime, Utc};
use futures::future::join_all;
use thiserror::Error;

use crate::adapters::forecast_source::{
    ForecastSource, MULTI_MODEL_SOURCES, ScraperError, SourceConfig,
};
use crate::adapters::hourly_feed::parse_hourly_feed;
use crate::adapters::page_fetcher::PageFetcher;
use crate::domain::merge::merge_forecasts;
use crate::domain::models::{
    MultiModelForecast, RainForecast, RainPerHourInformations, WeatherModel,
};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("all weather models are unavailable ({})", model_list(.0))]
    AllModelsUnavailable(Vec<WeatherModel>),
}

fn model_list(models: &[WeatherModel]) -> String {
    models
        .iter()
        .map(|model| model.label())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct RainForecastService<F, C> {
    source: ForecastSource<F>,
    clock: C,
}

impl<F, C> RainForecastService<F, C>
where
    F: PageFetcher,
    C: Clock,
{
    pub fn new(source: ForecastSource<F>, clock: C) -> Self {
        Self { source, clock }
    }

    pub async fn fetch_forecast(
        &self,
        source: &SourceConfig,
    ) -> Result<RainForecast, ScraperError> {
        self.source.fetch(source, self.clock.now()).await
    }

    /// Fetches every model concurrently and merges whatever succeeded. A
    /// failing model only loses its column; all of them failing is an error.
    pub async fn fetch_multi_model_forecast(&self) -> Result<MultiModelForecast, AggregateError> {
        let fetched_at = self.clock.now();
        let results = join_all(
            MULTI_MODEL_SOURCES
                .iter()
                .map(|source| self.source.fetch(source, fetched_at)),
        )
        .await;

        let mut forecasts = Vec::with_capacity(results.len());
        for (source, result) in MULTI_MODEL_SOURCES.iter().zip(results) {
            match result {
                Ok(forecast) => forecasts.push((source.model, forecast)),
                Err(error) => tracing::warn!(
                    model = source.label,
                    kind = ?error.kind(),
                    error = %error,
                    "model forecast unavailable"
                ),
            }
        }

        if forecasts.is_empty() {
            return Err(AggregateError::AllModelsUnavailable(
                MULTI_MODEL_SOURCES
                    .iter()
                    .map(|source| source.model)
                    .collect(),
            ));
        }

        let merged = merge_forecasts(self.source.location(), fetched_at, &forecasts);
        tracing::info!(
            models = forecasts.len(),
            entries = merged.entries.len(),
            "multi-model forecast merged"
        );

        Ok(merged)
    }

    pub async fn fetch_hourly_feed(&self) -> Result<RainPerHourInformations, ScraperError> {
        let html = self.source.fetch_page(&SourceConfig::AROME_HOURLY).await?;
        let feed = parse_hourly_feed(&html, self.clock.now());

        tracing::info!(readings = feed.data.len(), "hourly feed parsed");
        Ok(feed)
    }
}
