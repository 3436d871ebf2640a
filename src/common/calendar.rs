// src/common/calendar.rs

//! Gregorian day counting for acquisition runs that span calendar dates.

/// Error returned by the calendar helpers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid calendar date")]
    InvalidDate,
    #[error("End date precedes start date")]
    EndBeforeStart,
}

/// Gregorian leap-year rule.
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub const fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A validated proleptic Gregorian date.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CalendarDate {
    year: i32,
    month: u8,
    day: u8,
}

impl CalendarDate {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, CalendarError> {
        if day == 0 || day > days_in_month(year, month) {
            return Err(CalendarError::InvalidDate);
        }
        Ok(CalendarDate { year, month, day })
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Days since 1970-01-01 (negative before it).
    pub fn days_since_epoch(&self) -> i64 {
        // Shift the year to start in March so the leap day is the last day.
        let (y, m) = if self.month <= 2 {
            (self.year as i64 - 1, self.month as i64 + 9)
        } else {
            (self.year as i64, self.month as i64 - 3)
        };
        let era = y.div_euclid(400);
        let year_of_era = y.rem_euclid(400);
        let day_of_year = (153 * m + 2) / 5 + self.day as i64 - 1;
        let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
        era * 146_097 + day_of_era - 719_468
    }
}

/// Number of calendar days from `start` to `end`, both included.
pub fn days_inclusive(start: CalendarDate, end: CalendarDate) -> Result<u32, CalendarError> {
    let span = end.days_since_epoch() - start.days_since_epoch();
    if span < 0 {
        return Err(CalendarError::EndBeforeStart);
    }
    u32::try_from(span + 1).map_err(|_| CalendarError::InvalidDate)
}
