/// Rule-based exchange session calendar
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use chrono_tz::Tz;
use std::collections::HashSet;
use tracing::warn;

use crate::error::{MarketHoursError, Result};
use crate::time::calendar::CalendarProvider;
use crate::time::holidays::{get_nyse_early_closes, get_nyse_holidays, is_weekend, NYSE_TABLE_YEARS};
use crate::types::ScheduleRow;

/// Exchange calendar built from fixed local session times plus holiday tables.
///
/// Local times are resolved in the exchange timezone for each date, so the
/// UTC boundaries follow daylight saving changes.
#[derive(Debug, Clone)]
pub struct ExchangeCalendar {
    name: String,
    tz: Tz,
    open: NaiveTime,
    close: NaiveTime,
    early_close: NaiveTime,
    holidays: HashSet<NaiveDate>,
    early_closes: HashSet<NaiveDate>,
    table_years: Option<(i32, i32)>,
}

impl ExchangeCalendar {
    pub fn new(name: &str, tz: Tz, open: NaiveTime, close: NaiveTime) -> Result<Self> {
        if close <= open {
            return Err(MarketHoursError::InvalidParameter(format!(
                "{}: close {} must be after open {}",
                name, close, open
            )));
        }

        Ok(Self {
            name: name.to_string(),
            tz,
            open,
            close,
            early_close: close,
            holidays: HashSet::new(),
            early_closes: HashSet::new(),
            table_years: None,
        })
    }

    /// NYSE: 09:30-16:00 America/New_York, 13:00 on early-close days
    pub fn nyse() -> Self {
        Self {
            name: "NYSE".to_string(),
            tz: New_York,
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            early_close: NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
            holidays: get_nyse_holidays(),
            early_closes: get_nyse_early_closes(),
            table_years: Some(NYSE_TABLE_YEARS),
        }
    }

    pub fn with_holidays<I: IntoIterator<Item = NaiveDate>>(mut self, holidays: I) -> Self {
        self.holidays.extend(holidays);
        self
    }

    pub fn with_early_closes<I: IntoIterator<Item = NaiveDate>>(
        mut self,
        early_close: NaiveTime,
        dates: I,
    ) -> Result<Self> {
        if early_close <= self.open {
            return Err(MarketHoursError::InvalidParameter(format!(
                "{}: early close {} must be after open {}",
                self.name, early_close, self.open
            )));
        }
        self.early_close = early_close;
        self.early_closes.extend(dates);
        Ok(self)
    }

    /// Check if the exchange holds a session on `date`
    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.holidays.contains(&date)
    }

    /// Get the next date after `from_date` with a session
    pub fn next_trading_day(&self, from_date: NaiveDate) -> NaiveDate {
        let mut date = from_date + chrono::Duration::days(1);

        while !self.is_trading_day(date) {
            date = date + chrono::Duration::days(1);
        }

        date
    }

    /// Session for a single date, `None` when the exchange is closed
    pub fn session(&self, date: NaiveDate) -> Result<Option<ScheduleRow>> {
        if let Some((first, last)) = self.table_years {
            if date.year() < first || date.year() > last {
                warn!(
                    "{} holiday table covers {}-{}, treating {} as a regular weekday calendar",
                    self.name, first, last, date
                );
            }
        }

        if !self.is_trading_day(date) {
            return Ok(None);
        }

        let close = if self.early_closes.contains(&date) {
            self.early_close
        } else {
            self.close
        };

        Ok(Some(ScheduleRow::new(
            date,
            self.local_to_utc(date, self.open)?,
            self.local_to_utc(date, close)?,
        )))
    }

    fn local_to_utc(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                MarketHoursError::MalformedSchedule(format!(
                    "{}: {} {} does not exist in {}",
                    self.name, date, time, self.tz
                ))
            })
    }
}

impl CalendarProvider for ExchangeCalendar {
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleRow>> {
        let mut rows = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            if let Some(row) = self.session(date)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nyse_winter_session() {
        let row = ExchangeCalendar::nyse().session(date(2024, 1, 2)).unwrap().unwrap();
        assert_eq!(row.market_open, Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap());
        assert_eq!(row.market_close, Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap());
    }

    #[test]
    fn test_nyse_summer_session_follows_dst() {
        let row = ExchangeCalendar::nyse().session(date(2024, 7, 1)).unwrap().unwrap();
        assert_eq!(row.market_open, Utc.with_ymd_and_hms(2024, 7, 1, 13, 30, 0).unwrap());
        assert_eq!(row.market_close, Utc.with_ymd_and_hms(2024, 7, 1, 20, 0, 0).unwrap());
    }

    #[test]
    fn test_nyse_early_close() {
        let row = ExchangeCalendar::nyse().session(date(2024, 11, 29)).unwrap().unwrap();
        assert_eq!(row.market_close, Utc.with_ymd_and_hms(2024, 11, 29, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_nyse_closed_days() {
        let nyse = ExchangeCalendar::nyse();
        assert!(nyse.session(date(2024, 1, 6)).unwrap().is_none()); // Saturday
        assert!(nyse.session(date(2024, 7, 4)).unwrap().is_none());
        assert!(nyse.schedule(date(2024, 1, 6), date(2024, 1, 7)).unwrap().is_empty());
    }

    #[test]
    fn test_nyse_trading_days() {
        let nyse = ExchangeCalendar::nyse();
        assert!(nyse.is_trading_day(date(2024, 1, 2)));
        assert!(!nyse.is_trading_day(date(2024, 1, 6))); // Saturday
        assert!(!nyse.is_trading_day(date(2024, 1, 7))); // Sunday
        assert!(!nyse.is_trading_day(date(2024, 7, 4)));

        for early in get_nyse_early_closes() {
            assert!(nyse.is_trading_day(early), "{} should be a trading day", early);
        }
    }

    #[test]
    fn test_nyse_next_trading_day_skips_holiday_and_weekend() {
        let nyse = ExchangeCalendar::nyse();
        // Friday before Martin Luther King Jr. Day
        assert_eq!(nyse.next_trading_day(date(2025, 1, 17)), date(2025, 1, 21));
        assert_eq!(nyse.next_trading_day(date(2024, 12, 31)), date(2025, 1, 2));
        assert_eq!(nyse.next_trading_day(date(2024, 1, 2)), date(2024, 1, 3));
    }

    #[test]
    fn test_custom_early_closes() {
        let xetra = ExchangeCalendar::new(
            "XETRA",
            chrono_tz::Europe::Berlin,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
        )
        .unwrap()
        .with_early_closes(NaiveTime::from_hms_opt(14, 0, 0).unwrap(), vec![date(2024, 12, 30)])
        .unwrap();

        let early = xetra.session(date(2024, 12, 30)).unwrap().unwrap();
        assert_eq!(early.market_close, Utc.with_ymd_and_hms(2024, 12, 30, 13, 0, 0).unwrap());

        let regular = xetra.session(date(2024, 12, 27)).unwrap().unwrap();
        assert_eq!(regular.market_close, Utc.with_ymd_and_hms(2024, 12, 27, 16, 30, 0).unwrap());
    }

    #[test]
    fn test_early_close_before_open_rejected() {
        let result = ExchangeCalendar::nyse()
            .with_early_closes(NaiveTime::from_hms_opt(9, 0, 0).unwrap(), vec![date(2024, 12, 24)]);
        assert!(matches!(result, Err(MarketHoursError::InvalidParameter(_))));

        let result = ExchangeCalendar::nyse()
            .with_early_closes(NaiveTime::from_hms_opt(9, 30, 0).unwrap(), vec![date(2024, 12, 24)]);
        assert!(matches!(result, Err(MarketHoursError::InvalidParameter(_))));
    }

    #[test]
    fn test_schedule_range_skips_closed_days() {
        let rows = ExchangeCalendar::nyse()
            .schedule(date(2024, 12, 30), date(2025, 1, 3))
            .unwrap();
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 12, 30), date(2024, 12, 31), date(2025, 1, 2), date(2025, 1, 3)]
        );
    }

    #[test]
    fn test_custom_exchange() {
        let lse = ExchangeCalendar::new(
            "LSE",
            chrono_tz::Europe::London,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
        )
        .unwrap()
        .with_holidays(vec![date(2024, 12, 26)]);

        assert!(!lse.is_trading_day(date(2024, 12, 26)));
        assert_eq!(lse.next_trading_day(date(2024, 12, 24)), date(2024, 12, 25));

        let row = lse.session(date(2024, 7, 1)).unwrap().unwrap();
        assert_eq!(row.market_open, Utc.with_ymd_and_hms(2024, 7, 1, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_inverted_hours_rejected() {
        let result = ExchangeCalendar::new(
            "BAD",
            New_York,
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        );
        assert!(matches!(result, Err(MarketHoursError::InvalidParameter(_))));
    }
}
