/// Pre-market / regular / post-market window classification for a single day
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::error::{MarketHoursError, Result};
use crate::time::calendar::CalendarProvider;
use crate::time::clock::Clock;
use crate::types::{MarketWindow, ScheduleRow, SessionBoundaries, SessionOffsets, SessionSnapshot};

/// Trading windows for one session date, evaluated at a single captured instant.
///
/// All state is computed at construction. The calendar provider is queried
/// once and the clock is sampled once, so repeated queries on the same value
/// always agree. Build a new value to re-evaluate against a later instant.
///
/// Windows are inclusive at both ends: the regular open instant is in both the
/// pre-market and the regular session, and the regular close instant is in
/// both the regular session and the post-market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    session_date: NaiveDate,
    boundaries: Option<SessionBoundaries>,
    pre_market_open: DateTime<Utc>,
    regular_open: DateTime<Utc>,
    regular_close: DateTime<Utc>,
    post_market_close: DateTime<Utc>,
    now: DateTime<Utc>,
}

impl MarketHours {
    /// Classify the clock's current instant using the default 5h30m / 4h offsets
    pub fn new<P, C>(provider: &P, clock: &C, tz: Tz) -> Result<Self>
    where
        P: CalendarProvider + ?Sized,
        C: Clock + ?Sized,
    {
        Self::with_offsets(provider, clock, tz, SessionOffsets::default())
    }

    pub fn with_offsets<P, C>(provider: &P, clock: &C, tz: Tz, offsets: SessionOffsets) -> Result<Self>
    where
        P: CalendarProvider + ?Sized,
        C: Clock + ?Sized,
    {
        let now = clock.now();
        let session_date = now.with_timezone(&tz).date_naive();

        let rows = provider.schedule(session_date, session_date).map_err(|e| {
            warn!(
                "Calendar lookup for {} failed: {} ({})",
                session_date,
                e,
                e.error_code()
            );
            e
        })?;

        let row = single_session(session_date, rows)?;
        Self::from_schedule(session_date, row, now, tz, offsets)
    }

    /// Build from an already-fetched schedule row.
    ///
    /// `row` is `None` when the exchange is closed on `session_date`; every
    /// boundary is then set to the start of the next day in `tz`, so no instant
    /// on `session_date` falls in any window.
    pub fn from_schedule(
        session_date: NaiveDate,
        row: Option<ScheduleRow>,
        now: DateTime<Utc>,
        tz: Tz,
        offsets: SessionOffsets,
    ) -> Result<Self> {
        let Some(row) = row else {
            let next_day = session_date.succ_opt().ok_or_else(|| {
                MarketHoursError::InvalidParameter(format!("no day after {}", session_date))
            })?;
            let sentinel = start_of_day(next_day, tz)?;
            info!("No session on {} - market closed all day", session_date);

            return Ok(Self {
                session_date,
                boundaries: None,
                pre_market_open: sentinel,
                regular_open: sentinel,
                regular_close: sentinel,
                post_market_close: sentinel,
                now,
            });
        };

        if row.date != session_date {
            return Err(MarketHoursError::MalformedSchedule(format!(
                "requested {} but calendar returned {}",
                session_date, row.date
            )));
        }

        let boundaries = SessionBoundaries::from_row(&row)?;
        let pre_market_open = boundaries
            .regular_open
            .checked_sub_signed(offsets.pre_market)
            .ok_or_else(|| {
                MarketHoursError::InvalidParameter(format!(
                    "pre-market offset {} out of range",
                    offsets.pre_market
                ))
            })?;
        let post_market_close = boundaries
            .regular_close
            .checked_add_signed(offsets.post_market)
            .ok_or_else(|| {
                MarketHoursError::InvalidParameter(format!(
                    "post-market offset {} out of range",
                    offsets.post_market
                ))
            })?;

        debug!(
            "Session {}: pre {} | open {} | close {} | post {}",
            session_date,
            pre_market_open,
            boundaries.regular_open,
            boundaries.regular_close,
            post_market_close
        );

        Ok(Self {
            session_date,
            boundaries: Some(boundaries),
            pre_market_open,
            regular_open: boundaries.regular_open,
            regular_close: boundaries.regular_close,
            post_market_close,
            now,
        })
    }

    /// regular open <= now <= regular close
    pub fn is_regular_market_open(&self) -> bool {
        self.regular_open <= self.now && self.now <= self.regular_close
    }

    /// pre-market open <= now <= regular open
    pub fn is_pre_market_open(&self) -> bool {
        self.pre_market_open <= self.now && self.now <= self.regular_open
    }

    /// regular close <= now <= post-market close
    pub fn is_post_market_open(&self) -> bool {
        self.regular_close <= self.now && self.now <= self.post_market_close
    }

    /// Single label for `now`; the regular session wins at the shared boundary instants
    pub fn current_window(&self) -> MarketWindow {
        if self.is_regular_market_open() {
            MarketWindow::Regular
        } else if self.is_pre_market_open() {
            MarketWindow::PreMarket
        } else if self.is_post_market_open() {
            MarketWindow::PostMarket
        } else {
            MarketWindow::Closed
        }
    }

    pub fn is_trading_day(&self) -> bool {
        self.boundaries.is_some()
    }

    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    pub fn evaluated_at(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn pre_market_open_at(&self) -> DateTime<Utc> {
        self.pre_market_open
    }

    pub fn regular_open_at(&self) -> DateTime<Utc> {
        self.regular_open
    }

    pub fn regular_close_at(&self) -> DateTime<Utc> {
        self.regular_close
    }

    pub fn post_market_close_at(&self) -> DateTime<Utc> {
        self.post_market_close
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_date: self.session_date,
            evaluated_at: self.now,
            trading_day: self.is_trading_day(),
            pre_market_open: self.pre_market_open,
            regular_open: self.regular_open,
            regular_close: self.regular_close,
            post_market_close: self.post_market_close,
            is_pre_market_open: self.is_pre_market_open(),
            is_regular_market_open: self.is_regular_market_open(),
            is_post_market_open: self.is_post_market_open(),
            window: self.current_window(),
        }
    }
}

/// A single-date lookup must yield at most one row, for that date
fn single_session(date: NaiveDate, rows: Vec<ScheduleRow>) -> Result<Option<ScheduleRow>> {
    let mut rows = rows.into_iter();
    let first = rows.next();
    if rows.next().is_some() {
        return Err(MarketHoursError::MalformedSchedule(format!(
            "more than one session returned for {}",
            date
        )));
    }
    Ok(first)
}

/// First instant of `date` in `tz`, as UTC.
///
/// Where a DST change skips local midnight, the day starts at the first local
/// time after the gap.
fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=24 * 4)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            MarketHoursError::InvalidParameter(format!("{} has no local start of day in {}", date, tz))
        })
}
