use scraper::ElementRef;

use crate::domain::cell_text::{cell_text, is_time_of_day, parse_hour, parse_rain_amount};
use crate::domain::models::HourlyReading;
use crate::domain::table_locator::row_cells;

/// Position of a cell, counted from either edge of the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellIndex {
    Start(usize),
    /// `End(n)` is the cell at `len - n`.
    End(usize),
}

impl CellIndex {
    fn resolve(self, len: usize) -> Option<usize> {
        let index = match self {
            Self::Start(index) => index,
            Self::End(offset) => len.checked_sub(offset)?,
        };
        (index < len).then_some(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellColumns {
    pub hour: CellIndex,
    pub rain: CellIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    /// Rows whose first cell spans the day; one extra leading cell.
    pub day_start: CellColumns,
    pub continuation: CellColumns,
    pub min_cells: usize,
    /// Header rows carry this background colour on the `<tr>`.
    pub header_bgcolor: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    /// `hour_text` is `None` for a short row that only switches the day.
    DayStart {
        day: String,
        hour_text: Option<String>,
        rain_text: String,
    },
    Continuation {
        hour_text: String,
        rain_text: String,
    },
    Ignored,
}

pub fn classify_row(row: ElementRef<'_>, layout: &RowLayout) -> RowKind {
    if is_header_row(row, layout) {
        return RowKind::Ignored;
    }

    let cells = row_cells(row);
    let Some(first) = cells.first() else {
        return RowKind::Ignored;
    };

    // Rows below `min_cells` have no readable data, but a spanning day cell
    // still starts a new day.
    let readable = cells.len() >= layout.min_cells;
    let text_at = |index: CellIndex| {
        let position = index.resolve(cells.len()).filter(|_| readable)?;
        Some(cell_text(&cells[position]))
    };

    if spans_multiple_rows(first) {
        let columns = layout.day_start;
        return RowKind::DayStart {
            day: cell_text(first),
            hour_text: text_at(columns.hour),
            rain_text: text_at(columns.rain).unwrap_or_default(),
        };
    }

    let columns = layout.continuation;
    match text_at(columns.hour) {
        Some(hour_text) if is_time_of_day(&hour_text) => RowKind::Continuation {
            hour_text,
            rain_text: text_at(columns.rain).unwrap_or_default(),
        },
        _ => RowKind::Ignored,
    }
}

/// Walks the rows once, carrying the current day label from each day-start
/// row to the continuation rows below it.
pub fn parse_rows<'a>(
    rows: impl IntoIterator<Item = ElementRef<'a>>,
    layout: &RowLayout,
) -> Vec<HourlyReading> {
    let (_, readings) = rows.into_iter().fold(
        (None::<String>, Vec::new()),
        |(current_day, mut readings), row| {
            let (current_day, hour_text, rain_text) = match classify_row(row, layout) {
                RowKind::DayStart {
                    day,
                    hour_text,
                    rain_text,
                } => (Some(day), hour_text, rain_text),
                RowKind::Continuation {
                    hour_text,
                    rain_text,
                } => (current_day, Some(hour_text), rain_text),
                RowKind::Ignored => return (current_day, readings),
            };

            let hour = hour_text.as_deref().and_then(parse_hour);
            if let (Some(day), Some(hour)) = (current_day.as_ref(), hour) {
                readings.push(HourlyReading {
                    day: day.clone(),
                    hour,
                    amount: parse_rain_amount(&rain_text),
                });
            }

            (current_day, readings)
        },
    );

    readings
}

fn spans_multiple_rows(cell: &ElementRef<'_>) -> bool {
    cell.value()
        .attr("rowspan")
        .and_then(|value| value.trim().parse::<u32>().ok())
        .is_some_and(|span| span > 1)
}

fn is_header_row(row: ElementRef<'_>, layout: &RowLayout) -> bool {
    layout.header_bgcolor.is_some_and(|header| {
        row.value()
            .attr("bgcolor")
            .is_some_and(|bgcolor| bgcolor.trim().eq_ignore_ascii_case(header))
    })
}
