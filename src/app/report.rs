use std::fmt::Write;

use crate::domain::models::{MultiModelForecast, MultiModelRainEntry, WeatherModel};

/// Column order of the comparison table, finest mesh first.
const DISPLAY_ORDER: [WeatherModel; 5] = [
    WeatherModel::Arome,
    WeatherModel::Wrf,
    WeatherModel::IconEu,
    WeatherModel::Arpege,
    WeatherModel::Gfs,
];

const PERIOD_WIDTH: usize = 14;
const COLUMN_WIDTH: usize = 26;
const MISSING_AMOUNT: &str = "-";

pub fn format_rain_amount(mm: f64) -> String {
    if mm == 0.0 {
        "Aucune".to_string()
    } else if mm < 0.1 {
        "< 0.1 mm".to_string()
    } else {
        format!("{mm:.1} mm")
    }
}

/// Plain-text comparison of every model, one block per forecast day.
pub fn render_comparison_table(forecast: &MultiModelForecast) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Prévisions de pluie : {}", forecast.location);
    let _ = writeln!(
        out,
        "Récupéré le {}",
        forecast.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
    for model in DISPLAY_ORDER {
        if let Some(update) = forecast.last_update(model) {
            let _ = writeln!(out, "  {model}: {update}");
        }
    }

    let available: Vec<WeatherModel> = DISPLAY_ORDER
        .into_iter()
        .filter(|model| forecast.has_model(*model))
        .collect();
    for model in DISPLAY_ORDER.iter().filter(|model| !available.contains(model)) {
        let _ = writeln!(
            out,
            "! Les données du modèle {model} sont temporairement indisponibles."
        );
    }

    for (day, entries) in group_by_day(&forecast.entries) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{day}");

        let mut header = format!("{:<PERIOD_WIDTH$}", "Période (3h)");
        for model in DISPLAY_ORDER {
            let title = if available.contains(&model) {
                let total: f64 = entries.iter().filter_map(|entry| entry.amount(model)).sum();
                format!("{model} (Total: {total:.1} mm)")
            } else {
                model.to_string()
            };
            header.push_str(&format!("{title:<COLUMN_WIDTH$}"));
        }
        let _ = writeln!(out, "{}", header.trim_end());

        for entry in entries {
            let mut line = format!("{:<PERIOD_WIDTH$}", entry.time_range);
            for model in DISPLAY_ORDER {
                let cell = entry
                    .amount(model)
                    .map(format_rain_amount)
                    .unwrap_or_else(|| MISSING_AMOUNT.to_string());
                line.push_str(&format!("{cell:<COLUMN_WIDTH$}"));
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }
    }

    out
}

/// Groups entries by day label, days in first-seen order.
fn group_by_day(entries: &[MultiModelRainEntry]) -> Vec<(&str, Vec<&MultiModelRainEntry>)> {
    let mut groups: Vec<(&str, Vec<&MultiModelRainEntry>)> = Vec::new();

    for entry in entries {
        match groups.iter_mut().find(|(day, _)| *day == entry.day) {
            Some((_, group)) => group.push(entry),
            None => groups.push((entry.day.as_str(), vec![entry])),
        }
    }

    groups
}
