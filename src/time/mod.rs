pub mod calendar;
pub mod clock;
pub mod holidays;
pub mod market_hours;
pub mod session;

pub use calendar::{parse_schedule, CalendarProvider, CsvCalendar, StaticCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use holidays::{get_nyse_early_closes, get_nyse_holidays};
pub use market_hours::MarketHours;
pub use session::ExchangeCalendar;
