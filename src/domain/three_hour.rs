use std::collections::HashMap;

use crate::domain::cell_text::{format_day, hour_label, window_label};
use crate::domain::models::{HourlyReading, RainForecastEntry};

/// End hours of the 3-hour windows shared by every model.
pub const WINDOW_END_HOURS: [u32; 8] = [1, 4, 7, 10, 13, 16, 19, 22];

/// A reading from a page that already publishes 3-hour totals; the row hour
/// is the end of its window.
pub fn window_entry(reading: &HourlyReading) -> RainForecastEntry {
    RainForecastEntry {
        day: format_day(&reading.day),
        hour: hour_label(reading.hour),
        amount: reading.amount,
        time_range: window_label(reading.hour),
        model: None,
    }
}

/// Buckets hourly readings into the fixed windows ending at
/// [`WINDOW_END_HOURS`]. The window ending at 01h takes its 23h reading from
/// the previous day in page order. Missing hours add nothing, and a window
/// without any reading is left out.
pub fn aggregate_to_three_hours(readings: &[HourlyReading]) -> Vec<RainForecastEntry> {
    let mut lookup: HashMap<(&str, u32), f64> = HashMap::new();
    let mut days: Vec<&str> = Vec::new();

    for reading in readings {
        if !days.contains(&reading.day.as_str()) {
            days.push(&reading.day);
        }
        lookup.insert((reading.day.as_str(), reading.hour), reading.amount);
    }

    let mut entries = Vec::new();

    for (position, day) in days.iter().enumerate() {
        let previous_day = position.checked_sub(1).map(|index| days[index]);

        for end_hour in WINDOW_END_HOURS {
            let contributions: Vec<f64> = (0..3)
                .filter_map(|back| {
                    let hour = i64::from(end_hour) - back;
                    let (day, hour) = if hour < 0 {
                        (previous_day?, hour + 24)
                    } else {
                        (*day, hour)
                    };
                    let hour = u32::try_from(hour).ok()?;
                    lookup.get(&(day, hour)).copied()
                })
                .collect();

            if contributions.is_empty() {
                continue;
            }

            entries.push(RainForecastEntry {
                day: format_day(day),
                hour: hour_label(end_hour),
                amount: contributions.iter().sum(),
                time_range: window_label(end_hour),
                model: None,
            });
        }
    }

    entries
}
