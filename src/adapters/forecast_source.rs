//! One pipeline for every meteociel forecast page. Models differ only by the
//! [`SourceConfig`] record passed in.

use std::time::Instant;

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::Serialize;
use thiserror::Error;

use crate::adapters::page_fetcher::{PageFetchError, PageFetcher};
use crate::domain::last_update::extract_last_update;
use crate::domain::models::{RainForecast, WeatherModel};
use crate::domain::row_parser::{CellColumns, CellIndex, RowLayout, parse_rows};
use crate::domain::table_locator::{LocateError, LocatorStrategy, locate_rows};
use crate::domain::three_hour::{aggregate_to_three_hours, window_entry};

const THREE_HOUR_MARKERS: &[&str] = &["Pluiesur 3h", "Pluie sur 3h"];

const GRID_COLUMNS: (CellColumns, CellColumns) = (
    CellColumns {
        hour: CellIndex::Start(1),
        rain: CellIndex::Start(7),
    },
    CellColumns {
        hour: CellIndex::Start(0),
        rain: CellIndex::Start(6),
    },
);

const ROW_END_COLUMNS: CellColumns = CellColumns {
    hour: CellIndex::End(10),
    rain: CellIndex::End(4),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Rows already hold 3-hour totals.
    ThreeHour,
    /// Rows hold hourly amounts, bucketed into 3-hour windows.
    Hourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    pub model: WeatherModel,
    /// Name used in logs and error messages.
    pub label: &'static str,
    /// Path segment used by the HTTP routes.
    pub slug: &'static str,
    pub page: &'static str,
    pub locator: LocatorStrategy,
    pub layout: RowLayout,
    pub granularity: Granularity,
}

impl SourceConfig {
    const THREE_HOUR_LOCATOR: LocatorStrategy = LocatorStrategy::TextAnchor {
        markers: THREE_HOUR_MARKERS,
    };

    const THREE_HOUR_LAYOUT: RowLayout = RowLayout {
        day_start: GRID_COLUMNS.0,
        continuation: GRID_COLUMNS.1,
        min_cells: 1,
        header_bgcolor: None,
    };

    const HOURLY_LAYOUT: RowLayout = RowLayout {
        day_start: GRID_COLUMNS.0,
        continuation: GRID_COLUMNS.1,
        min_cells: 8,
        header_bgcolor: None,
    };

    pub const GFS: SourceConfig = SourceConfig {
        model: WeatherModel::Gfs,
        label: "GFS",
        slug: "gfs",
        page: "previsions",
        locator: Self::THREE_HOUR_LOCATOR,
        layout: Self::THREE_HOUR_LAYOUT,
        granularity: Granularity::ThreeHour,
    };

    pub const WRF: SourceConfig = SourceConfig {
        model: WeatherModel::Wrf,
        label: "WRF",
        slug: "wrf",
        page: "previsions-wrf",
        locator: Self::THREE_HOUR_LOCATOR,
        layout: Self::THREE_HOUR_LAYOUT,
        granularity: Granularity::ThreeHour,
    };

    pub const AROME: SourceConfig = SourceConfig {
        model: WeatherModel::Arome,
        label: "AROME",
        slug: "arome",
        page: "previsions-arome",
        locator: Self::THREE_HOUR_LOCATOR,
        layout: Self::THREE_HOUR_LAYOUT,
        granularity: Granularity::ThreeHour,
    };

    pub const ARPEGE: SourceConfig = SourceConfig {
        model: WeatherModel::Arpege,
        label: "ARPEGE",
        slug: "arpege",
        page: "previsions-arpege-1h",
        locator: LocatorStrategy::Structural,
        layout: Self::HOURLY_LAYOUT,
        granularity: Granularity::Hourly,
    };

    pub const ICON_EU: SourceConfig = SourceConfig {
        model: WeatherModel::IconEu,
        label: "ICON-EU",
        slug: "icon-eu",
        page: "previsions-iconeu",
        locator: LocatorStrategy::Structural,
        layout: Self::HOURLY_LAYOUT,
        granularity: Granularity::Hourly,
    };

    /// Hourly AROME page with the deeply nested layout.
    pub const AROME_HOURLY: SourceConfig = SourceConfig {
        model: WeatherModel::Arome,
        label: "AROME-1h",
        slug: "arome-1h",
        page: "previsions-arome-1h",
        locator: LocatorStrategy::NestedDescent,
        layout: RowLayout {
            day_start: ROW_END_COLUMNS,
            continuation: ROW_END_COLUMNS,
            min_cells: 0,
            header_bgcolor: Some("#aaaaff"),
        },
        granularity: Granularity::Hourly,
    };

    pub fn by_slug(slug: &str) -> Option<&'static SourceConfig> {
        ALL_SOURCES.iter().find(|source| source.slug == slug)
    }
}

/// Sources merged into the multi-model forecast, in merge order.
pub const MULTI_MODEL_SOURCES: [SourceConfig; 5] = [
    SourceConfig::GFS,
    SourceConfig::WRF,
    SourceConfig::AROME,
    SourceConfig::ARPEGE,
    SourceConfig::ICON_EU,
];

static ALL_SOURCES: [SourceConfig; 6] = [
    SourceConfig::GFS,
    SourceConfig::WRF,
    SourceConfig::AROME,
    SourceConfig::ARPEGE,
    SourceConfig::ICON_EU,
    SourceConfig::AROME_HOURLY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScraperErrorKind {
    NetworkError,
    FetchError,
    ParseError,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: PageFetchError,
    },
    #[error("{message}")]
    Fetch {
        message: String,
        #[source]
        source: PageFetchError,
    },
    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        source: Option<LocateError>,
    },
}

impl ScraperError {
    pub fn kind(&self) -> ScraperErrorKind {
        match self {
            Self::Network { .. } => ScraperErrorKind::NetworkError,
            Self::Fetch { .. } => ScraperErrorKind::FetchError,
            Self::Parse { .. } => ScraperErrorKind::ParseError,
        }
    }

    fn from_fetch(source: &SourceConfig, error: PageFetchError) -> Self {
        let label = source.label;
        match error {
            PageFetchError::Transport(_) => Self::Network {
                message: format!("Network error while fetching {label} forecast: {error}"),
                source: error,
            },
            PageFetchError::Status { .. } => Self::Fetch {
                message: format!("Failed to fetch {label} forecast: {error}"),
                source: error,
            },
            PageFetchError::Build(_) | PageFetchError::Request(_) | PageFetchError::Body(_) => {
                Self::Fetch {
                    message: format!("Unexpected error while fetching {label} forecast: {error}"),
                    source: error,
                }
            }
        }
    }

    fn missing_table(source: &SourceConfig, error: LocateError) -> Self {
        Self::Parse {
            message: format!(
                "Could not find {} rain forecast table: {error}",
                source.label
            ),
            source: Some(error),
        }
    }

    fn no_rows(source: &SourceConfig) -> Self {
        Self::Parse {
            message: format!("No rain data found in {} forecast table", source.label),
            source: None,
        }
    }
}

/// Parses one fetched page into a forecast tagged with the source's model.
pub fn parse_forecast_page(
    source: &SourceConfig,
    html: &str,
    location: &str,
    fetched_at: DateTime<Utc>,
) -> Result<RainForecast, ScraperError> {
    let document = Html::parse_document(html);
    let rows = locate_rows(&document, &source.locator)
        .map_err(|error| ScraperError::missing_table(source, error))?;
    let readings = parse_rows(rows, &source.layout);

    tracing::debug!(
        model = source.label,
        readings = readings.len(),
        "forecast rows parsed"
    );

    let mut entries = match source.granularity {
        Granularity::ThreeHour => readings.iter().map(window_entry).collect::<Vec<_>>(),
        Granularity::Hourly => aggregate_to_three_hours(&readings),
    };

    if entries.is_empty() {
        return Err(ScraperError::no_rows(source));
    }

    for entry in &mut entries {
        entry.model = Some(source.model);
    }

    Ok(RainForecast {
        location: location.to_string(),
        fetched_at,
        entries,
        last_update: extract_last_update(html),
    })
}

#[derive(Debug, Clone)]
pub struct ForecastSource<F> {
    fetcher: F,
    base_url: String,
    station_path: String,
    location: String,
}

impl<F> ForecastSource<F>
where
    F: PageFetcher,
{
    pub fn new(fetcher: F, base_url: &str, station_path: &str, location: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            station_path: station_path.trim_start_matches('/').to_string(),
            location: location.to_string(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn page_url(&self, source: &SourceConfig) -> String {
        format!("{}/{}/{}", self.base_url, source.page, self.station_path)
    }

    pub async fn fetch_page(&self, source: &SourceConfig) -> Result<String, ScraperError> {
        let url = self.page_url(source);
        tracing::debug!(model = source.label, url = %url, "fetching forecast page");

        self.fetcher
            .fetch_page(&url)
            .await
            .map_err(|error| ScraperError::from_fetch(source, error))
    }

    pub async fn fetch(
        &self,
        source: &SourceConfig,
        fetched_at: DateTime<Utc>,
    ) -> Result<RainForecast, ScraperError> {
        let started = Instant::now();
        let html = self.fetch_page(source).await?;
        let forecast = parse_forecast_page(source, &html, &self.location, fetched_at)?;

        tracing::info!(
            model = source.label,
            entries = forecast.entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast fetched"
        );

        Ok(forecast)
    }
}
