/// NYSE Holiday Calendar Management
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// First and last year covered by the tables below (update annually)
pub const NYSE_TABLE_YEARS: (i32, i32) = (2024, 2026);

const NYSE_HOLIDAYS: &[(i32, u32, u32)] = &[
    // 2024
    (2024, 1, 1),   // New Year's Day
    (2024, 1, 15),  // Martin Luther King Jr. Day
    (2024, 2, 19),  // Washington's Birthday
    (2024, 3, 29),  // Good Friday
    (2024, 5, 27),  // Memorial Day
    (2024, 6, 19),  // Juneteenth
    (2024, 7, 4),   // Independence Day
    (2024, 9, 2),   // Labor Day
    (2024, 11, 28), // Thanksgiving Day
    (2024, 12, 25), // Christmas Day
    // 2025
    (2025, 1, 1),   // New Year's Day
    (2025, 1, 9),   // National Day of Mourning (President Carter)
    (2025, 1, 20),  // Martin Luther King Jr. Day
    (2025, 2, 17),  // Washington's Birthday
    (2025, 4, 18),  // Good Friday
    (2025, 5, 26),  // Memorial Day
    (2025, 6, 19),  // Juneteenth
    (2025, 7, 4),   // Independence Day
    (2025, 9, 1),   // Labor Day
    (2025, 11, 27), // Thanksgiving Day
    (2025, 12, 25), // Christmas Day
    // 2026
    (2026, 1, 1),   // New Year's Day
    (2026, 1, 19),  // Martin Luther King Jr. Day
    (2026, 2, 16),  // Washington's Birthday
    (2026, 4, 3),   // Good Friday
    (2026, 5, 25),  // Memorial Day
    (2026, 6, 19),  // Juneteenth
    (2026, 7, 3),   // Independence Day (observed)
    (2026, 9, 7),   // Labor Day
    (2026, 11, 26), // Thanksgiving Day
    (2026, 12, 25), // Christmas Day
];

// 1:00 PM close
const NYSE_EARLY_CLOSES: &[(i32, u32, u32)] = &[
    (2024, 7, 3),
    (2024, 11, 29),
    (2024, 12, 24),
    (2025, 7, 3),
    (2025, 11, 28),
    (2025, 12, 24),
    (2026, 11, 27),
    (2026, 12, 24),
];

fn to_dates(table: &[(i32, u32, u32)]) -> HashSet<NaiveDate> {
    table
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

/// Full-day NYSE closures
pub fn get_nyse_holidays() -> HashSet<NaiveDate> {
    to_dates(NYSE_HOLIDAYS)
}

/// NYSE sessions that close early
pub fn get_nyse_early_closes() -> HashSet<NaiveDate> {
    to_dates(NYSE_EARLY_CLOSES)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    let weekday = date.weekday();
    weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun
}
