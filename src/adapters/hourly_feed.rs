//! Dated hourly rain readings from the nested AROME-1h page.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Europe::Paris;
use regex::Regex;
use scraper::{Html, Selector};

use crate::adapters::forecast_source::SourceConfig;
use crate::domain::calendar::{day_of_month, infer_forecast_date};
use crate::domain::cell_text::cell_text;
use crate::domain::models::{HourlyReading, RainPerHour, RainPerHourInformations};
use crate::domain::row_parser::parse_rows;
use crate::domain::table_locator::locate_rows;

static CENTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("center").expect("center selector must be valid"));
static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("clock time regex must be valid"));

/// Row hours are taken as UTC, as published. The refresh time is Paris
/// wall-clock time.
pub fn parse_hourly_feed(html: &str, now: DateTime<Utc>) -> RainPerHourInformations {
    let source = &SourceConfig::AROME_HOURLY;
    let document = Html::parse_document(html);
    let rows = locate_rows(&document, &source.locator).unwrap_or_default();
    let today = now.date_naive();

    let data = parse_rows(rows, &source.layout)
        .iter()
        .filter_map(|reading| dated_reading(today, reading))
        .collect();

    RainPerHourInformations {
        updated_at: updated_at(&document, now),
        data,
    }
}

fn dated_reading(today: NaiveDate, reading: &HourlyReading) -> Option<RainPerHour> {
    let Some(date) = day_of_month(&reading.day).and_then(|day| infer_forecast_date(today, day))
    else {
        tracing::debug!(day = %reading.day, "skipping reading with unresolvable date");
        return None;
    };
    let timestamp = date.and_hms_opt(reading.hour, 0, 0)?.and_utc();

    Some(RainPerHour {
        value: reading.amount,
        hour: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        probability: None,
    })
}

/// Refresh time from the first `<center>`, read as Paris local time on the
/// current Paris date, or the day before when that would be in the future.
fn updated_at(document: &Html, now: DateTime<Utc>) -> Option<String> {
    let text = cell_text(&document.select(&CENTER).next()?);
    let captures = CLOCK_TIME.captures(&text)?;
    let time = NaiveTime::from_hms_opt(captures[1].parse().ok()?, captures[2].parse().ok()?, 0)?;

    let today = now.with_timezone(&Paris).date_naive();
    let mut refreshed = paris_instant(today, time)?;
    if refreshed > now {
        refreshed = paris_instant(today.pred_opt()?, time)?;
    }

    Some(refreshed.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// `None` when the wall-clock time falls in a spring-forward gap.
fn paris_instant(date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    Paris
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
