use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::calendar::{day_of_month, infer_forecast_date, label_hour};
use crate::domain::models::{MultiModelForecast, MultiModelRainEntry, RainForecast, WeatherModel};

/// Combines per-model forecasts into one record keyed by `(day, hour)`.
///
/// Models are applied in [`WeatherModel::ALL`] order whatever the input order:
/// the first model to reach a slot creates it, later ones only fill their own
/// column. Entries end up sorted chronologically when every day label carries a
/// day number, in merge order otherwise.
pub fn merge_forecasts(
    location: &str,
    fetched_at: DateTime<Utc>,
    forecasts: &[(WeatherModel, RainForecast)],
) -> MultiModelForecast {
    let mut merged = MultiModelForecast {
        location: location.to_string(),
        fetched_at,
        entries: Vec::new(),
        gfs_last_update: None,
        wrf_last_update: None,
        arome_last_update: None,
        arpege_last_update: None,
        iconeu_last_update: None,
    };
    let mut slots: HashMap<(String, String), usize> = HashMap::new();

    for model in WeatherModel::ALL {
        for (_, forecast) in forecasts.iter().filter(|(source, _)| *source == model) {
            for entry in &forecast.entries {
                let key = (entry.day.clone(), entry.hour.clone());
                let index = *slots.entry(key).or_insert_with(|| {
                    merged.entries.push(MultiModelRainEntry::new(
                        entry.day.clone(),
                        entry.hour.clone(),
                        entry.time_range.clone(),
                    ));
                    merged.entries.len() - 1
                });
                merged.entries[index].set_amount(model, entry.amount);
            }

            merged.set_last_update(model, forecast.last_update.clone());
        }
    }

    sort_chronologically(&mut merged.entries, fetched_at.date_naive());
    merged
}

fn sort_chronologically(entries: &mut [MultiModelRainEntry], today: NaiveDate) {
    let keys: Option<Vec<(NaiveDate, u32)>> = entries
        .iter()
        .map(|entry| {
            let date = day_of_month(&entry.day).and_then(|day| infer_forecast_date(today, day))?;
            Some((date, label_hour(&entry.hour).unwrap_or_default()))
        })
        .collect();

    let Some(keys) = keys else {
        tracing::debug!("day label without day number, keeping merge order");
        return;
    };

    let mut keyed: Vec<((NaiveDate, u32), MultiModelRainEntry)> =
        keys.into_iter().zip(entries.iter().cloned()).collect();
    keyed.sort_by_key(|(key, _)| *key);

    for (slot, (_, entry)) in entries.iter_mut().zip(keyed) {
        *slot = entry;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::merge_forecasts;
    use crate::domain::models::{RainForecast, RainForecastEntry, WeatherModel};

    const LOCATION: &str = "La Bouëxière";

    /// `(day, hour, time_range, amount)`
    type Row<'a> = (&'a str, &'a str, &'a str, f64);

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 10, 18, 0, 0).unwrap()
    }

    fn forecast(
        model: WeatherModel,
        rows: &[Row<'_>],
        last_update: Option<&str>,
    ) -> (WeatherModel, RainForecast) {
        let entries = rows
            .iter()
            .map(|(day, hour, time_range, amount)| RainForecastEntry {
                day: day.to_string(),
                hour: hour.to_string(),
                amount: *amount,
                time_range: time_range.to_string(),
                model: Some(model),
            })
            .collect();

        (
            model,
            RainForecast {
                location: LOCATION.to_string(),
                fetched_at: fetched_at(),
                entries,
                last_update: last_update.map(str::to_string),
            },
        )
    }

    #[test]
    fn shared_slots_carry_every_model_amount() {
        let gfs = forecast(
            WeatherModel::Gfs,
            &[
                ("Mardi 11", "22h", "19h-22h", 0.5),
                ("Mercredi 12", "01h", "22h-01h", 1.2),
            ],
            Some("17:01 (run GFS de 12Z)"),
        );
        let arome = forecast(
            WeatherModel::Arome,
            &[("Mardi 11", "22h", "19h-22h", 0.2)],
            None,
        );

        let merged = merge_forecasts(LOCATION, fetched_at(), &[arome, gfs]);

        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.entries[0].day, "Mardi 11");
        assert_eq!(merged.entries[0].gfs, Some(0.5));
        assert_eq!(merged.entries[0].arome, Some(0.2));
        assert_eq!(merged.entries[0].wrf, None);
        assert_eq!(merged.entries[1].gfs, Some(1.2));
        assert_eq!(merged.entries[1].arome, None);
        assert_eq!(
            merged.gfs_last_update.as_deref(),
            Some("17:01 (run GFS de 12Z)")
        );
        assert_eq!(merged.arome_last_update, None);
    }

    #[test]
    fn same_model_collision_only_overwrites_its_own_column() {
        let gfs_early = [("Mardi 11", "04h", "01h-04h", 1.0)];
        let arome = [("Mardi 11", "04h", "01h-04h", 2.0)];
        let gfs_late = [("Mardi 11", "04h", "01h-04h", 3.0)];

        let merged = merge_forecasts(
            LOCATION,
            fetched_at(),
            &[
                forecast(WeatherModel::Gfs, &gfs_early, None),
                forecast(WeatherModel::Arome, &arome, None),
                forecast(WeatherModel::Gfs, &gfs_late, None),
            ],
        );

        assert_eq!(merged.entries.len(), 1);
        let slot = &merged.entries[0];
        assert_eq!(slot.day, "Mardi 11");
        assert_eq!(slot.hour, "04h");
        assert_eq!(slot.gfs, Some(3.0));
        assert_eq!(slot.arome, Some(2.0));
        assert_eq!(slot.wrf, None);
        assert_eq!(slot.arpege, None);
        assert_eq!(slot.iconeu, None);
    }

    #[test]
    fn merging_the_same_input_twice_gives_the_same_record() {
        let inputs = vec![
            forecast(
                WeatherModel::Wrf,
                &[("Mardi 11", "04h", "01h-04h", 3.5)],
                None,
            ),
            forecast(
                WeatherModel::IconEu,
                &[("Mardi 11", "04h", "01h-04h", 2.0)],
                Some("16:46 (run ICON-EU de 12Z)"),
            ),
        ];

        let first = merge_forecasts(LOCATION, fetched_at(), &inputs);
        let second = merge_forecasts(LOCATION, fetched_at(), &inputs);

        assert_eq!(first, second);
        assert_eq!(first.entries.len(), 1);
    }

    #[test]
    fn entries_are_sorted_across_month_rollover() {
        let at = Utc.with_ymd_and_hms(2025, 10, 31, 6, 0, 0).unwrap();
        let gfs = forecast(
            WeatherModel::Gfs,
            &[
                ("Samedi 01", "01h", "22h-01h", 0.0),
                ("Vendredi 31", "22h", "19h-22h", 0.4),
            ],
            None,
        );
        let arpege = forecast(
            WeatherModel::Arpege,
            &[("Vendredi 31", "07h", "04h-07h", 1.0)],
            None,
        );

        let merged = merge_forecasts(LOCATION, at, &[gfs, arpege]);

        let order: Vec<(&str, &str)> = merged
            .entries
            .iter()
            .map(|entry| (entry.day.as_str(), entry.hour.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Vendredi 31", "07h"),
                ("Vendredi 31", "22h"),
                ("Samedi 01", "01h"),
            ]
        );
    }

    #[test]
    fn labels_without_day_number_keep_merge_order() {
        let gfs = forecast(
            WeatherModel::Gfs,
            &[
                ("Demain", "22h", "19h-22h", 0.1),
                ("Mardi 11", "01h", "22h-01h", 0.2),
            ],
            None,
        );

        let merged = merge_forecasts(LOCATION, fetched_at(), &[gfs]);

        assert_eq!(merged.entries[0].day, "Demain");
        assert_eq!(merged.entries[1].day, "Mardi 11");
    }
}
