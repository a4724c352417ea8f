pub mod api;
pub mod forecast_source;
pub mod hourly_feed;
pub mod page_fetcher;
