use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WeatherModel {
    #[serde(rename = "GFS")]
    Gfs,
    #[serde(rename = "WRF")]
    Wrf,
    #[serde(rename = "AROME")]
    Arome,
    #[serde(rename = "ARPEGE")]
    Arpege,
    #[serde(rename = "ICON-EU")]
    IconEu,
}

impl WeatherModel {
    /// Fixed processing order; also the merge precedence of the aggregate.
    pub const ALL: [WeatherModel; 5] = [
        WeatherModel::Gfs,
        WeatherModel::Wrf,
        WeatherModel::Arome,
        WeatherModel::Arpege,
        WeatherModel::IconEu,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Gfs => "GFS",
            Self::Wrf => "WRF",
            Self::Arome => "AROME",
            Self::Arpege => "ARPEGE",
            Self::IconEu => "ICON-EU",
        }
    }
}

impl fmt::Display for WeatherModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One table row before any 3-hour bucketing. `day` is the raw page label (`Mar10`).
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyReading {
    pub day: String,
    pub hour: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RainForecastEntry {
    pub day: String,
    pub hour: String,
    pub amount: f64,
    pub time_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<WeatherModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RainForecast {
    pub location: String,
    pub fetched_at: DateTime<Utc>,
    pub entries: Vec<RainForecastEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelRainEntry {
    pub day: String,
    pub hour: String,
    pub time_range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gfs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrf: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arome: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arpege: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iconeu: Option<f64>,
}

impl MultiModelRainEntry {
    pub fn new(day: String, hour: String, time_range: String) -> Self {
        Self {
            day,
            hour,
            time_range,
            gfs: None,
            wrf: None,
            arome: None,
            arpege: None,
            iconeu: None,
        }
    }

    pub fn amount(&self, model: WeatherModel) -> Option<f64> {
        match model {
            WeatherModel::Gfs => self.gfs,
            WeatherModel::Wrf => self.wrf,
            WeatherModel::Arome => self.arome,
            WeatherModel::Arpege => self.arpege,
            WeatherModel::IconEu => self.iconeu,
        }
    }

    pub fn set_amount(&mut self, model: WeatherModel, amount: f64) {
        let slot = match model {
            WeatherModel::Gfs => &mut self.gfs,
            WeatherModel::Wrf => &mut self.wrf,
            WeatherModel::Arome => &mut self.arome,
            WeatherModel::Arpege => &mut self.arpege,
            WeatherModel::IconEu => &mut self.iconeu,
        };
        *slot = Some(amount);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelForecast {
    pub location: String,
    pub fetched_at: DateTime<Utc>,
    pub entries: Vec<MultiModelRainEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gfs_last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrf_last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arome_last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arpege_last_update: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iconeu_last_update: Option<String>,
}

impl MultiModelForecast {
    pub fn last_update(&self, model: WeatherModel) -> Option<&str> {
        match model {
            WeatherModel::Gfs => self.gfs_last_update.as_deref(),
            WeatherModel::Wrf => self.wrf_last_update.as_deref(),
            WeatherModel::Arome => self.arome_last_update.as_deref(),
            WeatherModel::Arpege => self.arpege_last_update.as_deref(),
            WeatherModel::IconEu => self.iconeu_last_update.as_deref(),
        }
    }

    pub fn set_last_update(&mut self, model: WeatherModel, value: Option<String>) {
        let slot = match model {
            WeatherModel::Gfs => &mut self.gfs_last_update,
            WeatherModel::Wrf => &mut self.wrf_last_update,
            WeatherModel::Arome => &mut self.arome_last_update,
            WeatherModel::Arpege => &mut self.arpege_last_update,
            WeatherModel::IconEu => &mut self.iconeu_last_update,
        };
        *slot = value;
    }

    /// True when at least one entry carries an amount for `model`.
    pub fn has_model(&self, model: WeatherModel) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.amount(model).is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainPerHour {
    pub value: f64,
    pub hour: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RainPerHourInformations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    pub data: Vec<RainPerHour>,
}
