/// Configuration loading from TOML file
use std::path::Path;

use crate::error::{MarketHoursError, Result};
use crate::time::{CalendarProvider, CsvCalendar, ExchangeCalendar};
use crate::types::Config;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| MarketHoursError::ConfigError(format!("Failed to read config file: {}", e)))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;

    // Validate config
    validate_config(&config)?;

    Ok(config)
}

/// Calendar source named by the config: a CSV schedule file if set, else the exchange rules
pub fn calendar_from_config(config: &Config) -> Result<Box<dyn CalendarProvider>> {
    if let Some(path) = &config.calendar_file {
        return Ok(Box::new(CsvCalendar::new(path)));
    }

    match config.exchange.to_uppercase().as_str() {
        "NYSE" => Ok(Box::new(ExchangeCalendar::nyse())),
        other => Err(MarketHoursError::ConfigError(format!(
            "No built-in calendar for exchange {}; set calendar_file",
            other
        ))),
    }
}

const MINUTES_PER_DAY: i64 = 24 * 60;

fn validate_config(config: &Config) -> Result<()> {
    if config.exchange.is_empty() {
        return Err(MarketHoursError::ConfigError("exchange is empty".to_string()));
    }

    config.tz()?;

    // Validate extended window offsets
    for (name, minutes) in [
        ("pre_market_offset_minutes", config.pre_market_offset_minutes),
        ("post_market_offset_minutes", config.post_market_offset_minutes),
    ] {
        if !(0..MINUTES_PER_DAY).contains(&minutes) {
            return Err(MarketHoursError::ConfigError(format!(
                "Invalid {}: {} (must be in 0..{})",
                name, minutes, MINUTES_PER_DAY
            )));
        }
    }

    if config.log_level.is_empty() {
        return Err(MarketHoursError::ConfigError("log_level is empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.exchange, "NYSE");
        assert_eq!(config.timezone, "America/New_York");
        assert_eq!(config.pre_market_offset_minutes, 330);
        assert_eq!(config.post_market_offset_minutes, 240);
        assert!(config.calendar_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = parse_config(
            r#"
            exchange = "LSE"
            timezone = "Europe/London"
            pre_market_offset_minutes = 60
            calendar_file = "data/lse.csv"
            log_json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.exchange, "LSE");
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::London);
        assert_eq!(config.pre_market_offset_minutes, 60);
        assert_eq!(config.post_market_offset_minutes, 240);
        assert!(config.log_json);
        assert!(calendar_from_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let result = parse_config("post_market_offset_minutes = -5");
        assert!(matches!(result, Err(MarketHoursError::ConfigError(_))));

        let result = parse_config("pre_market_offset_minutes = 1440");
        assert!(matches!(result, Err(MarketHoursError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let result = parse_config(r#"timezone = "Nowhere/Special""#);
        assert!(matches!(result, Err(MarketHoursError::UnknownTimezone(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = parse_config("exchange = ");
        assert!(matches!(result, Err(MarketHoursError::ConfigParseError(_))));
    }

    #[test]
    fn test_unknown_exchange_needs_calendar_file() {
        let config = parse_config(r#"exchange = "TSX""#).unwrap();
        assert!(matches!(
            calendar_from_config(&config),
            Err(MarketHoursError::ConfigError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("no/such/config.toml");
        assert!(matches!(result, Err(MarketHoursError::ConfigError(_))));
    }
}
