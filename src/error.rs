/// Centralized error types for market hours classification
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketHoursError {
    // Calendar Provider Errors
    #[error("Calendar provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration parse failed: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type Result<T> = std::result::Result<T, MarketHoursError>;

impl MarketHoursError {
    /// Whether rebuilding the classifier later could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MarketHoursError::ProviderUnavailable(_))
    }

    /// Whether the error came from the calendar provider rather than local setup
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            MarketHoursError::ProviderUnavailable(_) | MarketHoursError::MalformedSchedule(_)
        )
    }

    /// Get error code for logging
    pub fn error_code(&self) -> &str {
        match self {
            MarketHoursError::ProviderUnavailable(_) => "CAL_001",
            MarketHoursError::MalformedSchedule(_) => "CAL_002",
            MarketHoursError::ConfigError(_) => "CFG_001",
            MarketHoursError::ConfigParseError(_) => "CFG_002",
            MarketHoursError::InvalidParameter(_) => "CFG_003",
            MarketHoursError::UnknownTimezone(_) => "CFG_004",
        }
    }
}
