//! Finds the forecast grid inside a meteociel page.
//!
//! Pages nest layout tables several levels deep, and an outer table's text and
//! rows include everything below it. Every strategy therefore looks at each
//! table independently, yields at most one candidate per table, and reduces the
//! candidates with an explicit tie-break.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::domain::cell_text::{cell_text, is_day_code, is_padded_time_of_day};

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector must be valid"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("row selector must be valid"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("cell selector must be valid"));
static SECOND_CELL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td:nth-of-type(2)").expect("second cell selector must be valid")
});

/// Tables below the second cell of the root table, the last one holds the rows.
const NESTED_TABLE_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorStrategy {
    /// Table text contains one of `markers` and some row starts with a day code.
    /// Among those, the table with the fewest rows (the innermost) wins.
    TextAnchor { markers: &'static [&'static str] },
    /// First table where some row's second cell is an `HH:MM` time.
    Structural,
    /// Fixed descent through the nested layout tables, no text validation.
    NestedDescent,
}

impl LocatorStrategy {
    /// Whether a missing table means "no rows" rather than a failure.
    pub fn tolerates_missing_table(&self) -> bool {
        matches!(self, Self::NestedDescent)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("no table contains the rain marker {marker:?} with day rows")]
    NoAnchoredTable { marker: &'static str },
    #[error("no table has hourly rows")]
    NoHourlyTable,
    #[error("nested forecast table missing at level {level}")]
    NestedTableMissing { level: usize },
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    table: ElementRef<'a>,
    row_count: usize,
}

pub fn locate_table<'a>(
    document: &'a Html,
    strategy: &LocatorStrategy,
) -> Result<ElementRef<'a>, LocateError> {
    match strategy {
        LocatorStrategy::TextAnchor { markers } => document
            .select(&TABLE)
            .filter_map(|table| anchored_candidate(table, markers))
            .reduce(fewer_rows)
            .map(|candidate| candidate.table)
            .ok_or(LocateError::NoAnchoredTable {
                marker: markers.first().copied().unwrap_or_default(),
            }),
        LocatorStrategy::Structural => document
            .select(&TABLE)
            .filter_map(hourly_candidate)
            .map(|candidate| candidate.table)
            .next()
            .ok_or(LocateError::NoHourlyTable),
        LocatorStrategy::NestedDescent => nested_table(document),
    }
}

/// Rows of the located table. A tolerated missing table yields no rows.
pub fn locate_rows<'a>(
    document: &'a Html,
    strategy: &LocatorStrategy,
) -> Result<Vec<ElementRef<'a>>, LocateError> {
    match locate_table(document, strategy) {
        Ok(table) => Ok(table_rows(table)),
        Err(error) if strategy.tolerates_missing_table() => {
            tracing::debug!(error = %error, "forecast table not found, no rows to parse");
            Ok(Vec::new())
        }
        Err(error) => Err(error),
    }
}

pub fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table.select(&ROW).collect()
}

pub fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.select(&CELL).collect()
}

fn anchored_candidate<'a>(
    table: ElementRef<'a>,
    markers: &[&'static str],
) -> Option<Candidate<'a>> {
    let text: String = table.text().collect();
    if !markers.iter().any(|marker| text.contains(marker)) {
        return None;
    }

    let rows = table_rows(table);
    let has_day_rows = rows.iter().any(|row| {
        row_cells(*row)
            .first()
            .is_some_and(|cell| is_day_code(&cell_text(cell)))
    });

    has_day_rows.then_some(Candidate {
        table,
        row_count: rows.len(),
    })
}

fn hourly_candidate(table: ElementRef<'_>) -> Option<Candidate<'_>> {
    let rows = table_rows(table);
    let has_hour_rows = rows.iter().any(|row| {
        row_cells(*row)
            .get(1)
            .is_some_and(|cell| is_padded_time_of_day(&cell_text(cell)))
    });

    has_hour_rows.then_some(Candidate {
        table,
        row_count: rows.len(),
    })
}

/// Ties keep the earlier table.
fn fewer_rows<'a>(best: Candidate<'a>, candidate: Candidate<'a>) -> Candidate<'a> {
    if candidate.row_count < best.row_count {
        candidate
    } else {
        best
    }
}

fn nested_table(document: &Html) -> Result<ElementRef<'_>, LocateError> {
    let root = document
        .select(&TABLE)
        .next()
        .ok_or(LocateError::NestedTableMissing { level: 0 })?;
    let second_cell = root
        .select(&SECOND_CELL)
        .next()
        .ok_or(LocateError::NestedTableMissing { level: 1 })?;

    (0..NESTED_TABLE_DEPTH).try_fold(second_cell, |parent, depth| {
        parent
            .select(&TABLE)
            .next()
            .ok_or(LocateError::NestedTableMissing { level: depth + 2 })
    })
}
