/// Core type definitions for market hours classification
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{MarketHoursError, Result};

/// One row of an exchange schedule: the official session for a single date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub market_open: DateTime<Utc>,
    pub market_close: DateTime<Utc>,
}

impl ScheduleRow {
    pub fn new(date: NaiveDate, market_open: DateTime<Utc>, market_close: DateTime<Utc>) -> Self {
        Self {
            date,
            market_open,
            market_close,
        }
    }
}

/// Regular session boundaries for a trading day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBoundaries {
    pub regular_open: DateTime<Utc>,
    pub regular_close: DateTime<Utc>,
}

impl SessionBoundaries {
    /// Build boundaries from a schedule row, rejecting a close before the open
    pub fn from_row(row: &ScheduleRow) -> Result<Self> {
        if row.market_close < row.market_open {
            return Err(MarketHoursError::MalformedSchedule(format!(
                "{}: close {} is before open {}",
                row.date, row.market_close, row.market_open
            )));
        }

        Ok(Self {
            regular_open: row.market_open,
            regular_close: row.market_close,
        })
    }
}

/// Fixed offsets used to derive the extended windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOffsets {
    /// How long before the regular open the pre-market starts
    pub pre_market: Duration,
    /// How long after the regular close the post-market ends
    pub post_market: Duration,
}

impl SessionOffsets {
    pub fn new(pre_market: Duration, post_market: Duration) -> Result<Self> {
        if pre_market < Duration::zero() || post_market < Duration::zero() {
            return Err(MarketHoursError::InvalidParameter(format!(
                "session offsets must be non-negative (pre={}, post={})",
                pre_market, post_market
            )));
        }

        Ok(Self {
            pre_market,
            post_market,
        })
    }
}

impl Default for SessionOffsets {
    fn default() -> Self {
        Self {
            pre_market: Duration::hours(5) + Duration::minutes(30),
            post_market: Duration::hours(4),
        }
    }
}

/// Trading window label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketWindow {
    PreMarket,
    Regular,
    PostMarket,
    Closed,
}

impl MarketWindow {
    pub fn as_str(&self) -> &str {
        match self {
            MarketWindow::PreMarket => "PRE_MARKET",
            MarketWindow::Regular => "REGULAR",
            MarketWindow::PostMarket => "POST_MARKET",
            MarketWindow::Closed => "CLOSED",
        }
    }
}

/// Serializable view of a classifier's state
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_date: NaiveDate,
    pub evaluated_at: DateTime<Utc>,
    pub trading_day: bool,
    pub pre_market_open: DateTime<Utc>,
    pub regular_open: DateTime<Utc>,
    pub regular_close: DateTime<Utc>,
    pub post_market_close: DateTime<Utc>,
    pub is_pre_market_open: bool,
    pub is_regular_market_open: bool,
    pub is_post_market_open: bool,
    pub window: MarketWindow,
}

/// Configuration for market hours evaluation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub exchange: String,
    pub timezone: String,

    // Extended Windows
    pub pre_market_offset_minutes: i64,
    pub post_market_offset_minutes: i64,

    // Calendar Source
    pub calendar_file: Option<String>,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: "NYSE".to_string(),
            timezone: "America/New_York".to_string(),
            pre_market_offset_minutes: 330,
            post_market_offset_minutes: 240,
            calendar_file: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| MarketHoursError::UnknownTimezone(self.timezone.clone()))
    }

    pub fn offsets(&self) -> Result<SessionOffsets> {
        SessionOffsets::new(
            Duration::minutes(self.pre_market_offset_minutes),
            Duration::minutes(self.post_market_offset_minutes),
        )
    }
}
