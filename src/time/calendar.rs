/// Calendar providers supplying regular session times per date
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{MarketHoursError, Result};
use crate::types::{ScheduleRow, SessionBoundaries};

/// Source of an exchange schedule.
///
/// `schedule` returns one row per trading day in `[start, end]`, ordered by
/// date. Days the exchange is closed have no row; an empty result for a single
/// date means no session that day.
pub trait CalendarProvider {
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleRow>>;
}

/// In-memory schedule keyed by date
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    rows: BTreeMap<NaiveDate, ScheduleRow>,
}

impl StaticCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<I: IntoIterator<Item = ScheduleRow>>(rows: I) -> Result<Self> {
        let mut calendar = Self::new();
        for row in rows {
            calendar.insert(row)?;
        }
        Ok(calendar)
    }

    /// Add a session, rejecting a second row for the same date
    pub fn insert(&mut self, row: ScheduleRow) -> Result<()> {
        SessionBoundaries::from_row(&row)?;
        if self.rows.contains_key(&row.date) {
            return Err(MarketHoursError::MalformedSchedule(format!(
                "duplicate session for {}",
                row.date
            )));
        }
        self.rows.insert(row.date, row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CalendarProvider for StaticCalendar {
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleRow>> {
        if end < start {
            return Ok(Vec::new());
        }
        Ok(self.rows.range(start..=end).map(|(_, row)| *row).collect())
    }
}

/// Schedule read from a CSV export with `date,market_open,market_close` columns.
///
/// The file is read on every `schedule` call, so a missing or unreadable file
/// surfaces as `ProviderUnavailable` at the point the schedule is requested.
#[derive(Debug, Clone)]
pub struct CsvCalendar {
    path: PathBuf,
}

impl CsvCalendar {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CalendarProvider for CsvCalendar {
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduleRow>> {
        let file = std::fs::File::open(&self.path).map_err(|e| {
            MarketHoursError::ProviderUnavailable(format!(
                "Failed to open calendar file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let calendar = StaticCalendar::from_rows(parse_schedule(file)?)?;
        debug!(
            "Loaded {} sessions from {}",
            calendar.len(),
            self.path.display()
        );

        calendar.schedule(start, end)
    }
}

/// Parse CSV schedule rows; timestamps are RFC 3339
pub fn parse_schedule<R: Read>(reader: R) -> Result<Vec<ScheduleRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<ScheduleRow>().enumerate() {
        let row = record.map_err(|e| {
            MarketHoursError::MalformedSchedule(format!("row {}: {}", index + 1, e))
        })?;
        rows.push(row);
    }

    Ok(rows)
}
