use chrono::{Datelike, Months, NaiveDate};

/// Day-of-month at the end of a day label: `Mar05` → 5, `Mardi 11` → 11.
pub fn day_of_month(label: &str) -> Option<u32> {
    let digits = label.trim_start_matches(|c: char| !c.is_ascii_digit());
    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();
    digits
        .parse::<u32>()
        .ok()
        .filter(|day| (1..=31).contains(day))
}

/// Calendar date of a page day label relative to the scrape date. Pages only
/// show upcoming days, so a day-of-month below today's belongs to next month.
pub fn infer_forecast_date(today: NaiveDate, day: u32) -> Option<NaiveDate> {
    let month_start = today.with_day(1)?;
    let month_start = if today.day() > day {
        month_start.checked_add_months(Months::new(1))?
    } else {
        month_start
    };
    month_start.with_day(day)
}

/// Hour number at the start of an hour label such as `22h`.
pub fn label_hour(label: &str) -> Option<u32> {
    let digits: String = label
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
