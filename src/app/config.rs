use std::net::SocketAddr;

use crate::adapters::page_fetcher::DEFAULT_USER_AGENT;
use crate::app::AppError;

const DEFAULT_HTTP_BIND: &str = "0.0.0.0:3000";
const DEFAULT_BASE_URL: &str = "https://www.meteociel.fr";
const DEFAULT_STATION_PATH: &str = "12368/la_bouexiere.htm";
const DEFAULT_LOCATION: &str = "La Bouëxière";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub base_url: String,
    pub station_path: String,
    pub location: String,
    pub user_agent: String,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            return Err(AppError::config(format!("failed to load .env: {error}")));
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = non_empty(&lookup, "METEOCIEL_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::config(
                "METEOCIEL_BASE_URL must start with http:// or https://",
            ));
        }

        let http_bind = parse_or_default(
            &lookup,
            "HTTP_BIND",
            DEFAULT_HTTP_BIND,
            "a valid socket address",
        )?;

        Ok(Self {
            http_bind,
            base_url,
            station_path: non_empty(&lookup, "METEOCIEL_STATION_PATH")
                .unwrap_or_else(|| DEFAULT_STATION_PATH.to_string()),
            location: non_empty(&lookup, "FORECAST_LOCATION")
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            user_agent: non_empty(&lookup, "SCRAPER_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            cors_allowed_origin: non_empty(&lookup, "CORS_ALLOWED_ORIGIN"),
        })
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `expected` completes the error message: "`key` must be `expected`".
fn parse_or_default<T, F>(
    lookup: &F,
    key: &str,
    default: &str,
    expected: &str,
) -> Result<T, AppError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .as_deref()
        .unwrap_or(default)
        .parse::<T>()
        .map_err(|_| AppError::config(format!("{key} must be {expected}")))
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, parse_or_default};

    #[test]
    fn applies_defaults_for_missing_and_empty_values() {
        let result = AppConfig::from_lookup(|key| match key {
            "FORECAST_LOCATION" => Some("   ".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(result.http_bind.to_string(), "0.0.0.0:3000");
        assert_eq!(result.base_url, "https://www.meteociel.fr");
        assert_eq!(result.station_path, "12368/la_bouexiere.htm");
        assert_eq!(result.location, "La Bouëxière");
        assert!(result.user_agent.contains("WeatherAggregator/1.0"));
        assert_eq!(result.cors_allowed_origin, None);
    }

    #[test]
    fn reads_overrides() {
        let result = AppConfig::from_lookup(|key| match key {
            "HTTP_BIND" => Some("127.0.0.1:8081".to_string()),
            "METEOCIEL_BASE_URL" => Some("http://localhost:9000".to_string()),
            "CORS_ALLOWED_ORIGIN" => Some("http://localhost:5173".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(result.http_bind.port(), 8081);
        assert_eq!(result.base_url, "http://localhost:9000");
        assert_eq!(
            result.cors_allowed_origin.as_deref(),
            Some("http://localhost:5173")
        );
    }

    #[test]
    fn rejects_invalid_bind_address() {
        let result = AppConfig::from_lookup(|key| match key {
            "HTTP_BIND" => Some("localhost".to_string()),
            _ => None,
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: HTTP_BIND must be a valid socket address"
        );
    }

    #[test]
    fn rejects_base_url_without_http_scheme() {
        let result = AppConfig::from_lookup(|key| match key {
            "METEOCIEL_BASE_URL" => Some("www.meteociel.fr".to_string()),
            _ => None,
        });

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: METEOCIEL_BASE_URL must start with http:// or https://"
        );
    }

    #[test]
    fn parse_errors_name_the_expected_value() {
        let lookup = |_: &str| Some("many".to_string());

        let result = parse_or_default::<u16, _>(&lookup, "WORKERS", "4", "a port number");

        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: WORKERS must be a port number"
        );
    }
}
