pub mod calendar;
pub mod cell_text;
pub mod last_update;
pub mod merge;
pub mod models;
pub mod row_parser;
pub mod table_locator;
pub mod three_hour;
