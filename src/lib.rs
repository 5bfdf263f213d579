pub mod types;
pub mod error;
pub mod config;
pub mod time;

pub use types::*;
pub use error::{MarketHoursError, Result};
pub use time::{CalendarProvider, Clock, ExchangeCalendar, MarketHours, SystemClock};
