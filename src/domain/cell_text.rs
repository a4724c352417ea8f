use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

const EMPTY_RAIN_PLACEHOLDER: &str = "--";

const WEEKDAYS: &[(&str, &str)] = &[
    ("Lun", "Lundi"),
    ("Mar", "Mardi"),
    ("Mer", "Mercredi"),
    ("Jeu", "Jeudi"),
    ("Ven", "Vendredi"),
    ("Sam", "Samedi"),
    ("Dim", "Dimanche"),
];

static DAY_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Lun|Mar|Mer|Jeu|Ven|Sam|Dim)(\d{1,2})$").expect("day code regex must be valid")
});
static TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}$").expect("time regex must be valid"));
static PADDED_TIME_OF_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("time regex must be valid"));
static LEADING_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("hour regex must be valid"));
static RAIN_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*mm").expect("rain amount regex must be valid")
});

/// Text of a cell with every text node trimmed, so `Mar<br>10` reads `Mar10`.
pub fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

/// Parses a rain cell. Placeholders and unreadable cells count as no rain.
pub fn parse_rain_amount(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() || text == EMPTY_RAIN_PLACEHOLDER {
        return 0.0;
    }

    RAIN_AMOUNT
        .captures(text)
        .and_then(|captures| captures[1].replace(',', ".").parse::<f64>().ok())
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .unwrap_or(0.0)
}

/// Hour of the first `H:MM`/`HH:MM` in the text, if it is a valid hour of day.
pub fn parse_hour(text: &str) -> Option<u32> {
    LEADING_HOUR
        .captures(text)
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .filter(|hour| *hour < 24)
}

pub fn is_time_of_day(text: &str) -> bool {
    TIME_OF_DAY.is_match(text.trim())
}

pub fn is_padded_time_of_day(text: &str) -> bool {
    PADDED_TIME_OF_DAY.is_match(text.trim())
}

pub fn is_day_code(text: &str) -> bool {
    DAY_CODE.is_match(text.trim())
}

/// Expands `Mar10` to `Mardi 10`; any other label passes through unchanged.
pub fn format_day(label: &str) -> String {
    let Some(captures) = DAY_CODE.captures(label.trim()) else {
        return label.to_string();
    };

    let short = &captures[1];
    let full = WEEKDAYS
        .iter()
        .find(|(code, _)| *code == short)
        .map_or(short, |(_, name)| *name);

    format!("{full} {}", &captures[2])
}

pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}h")
}

/// `19h-22h` for a window ending at 22h; the start wraps around midnight.
pub fn window_label(end_hour: u32) -> String {
    let start = (end_hour + 21) % 24;
    format!("{start:02}h-{end_hour:02}h")
}
