use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::AttendanceError;

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, AttendanceError> {
        if !(1..=12).contains(&month) {
            return Err(AttendanceError::InvalidPeriod(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if year < 1 {
            return Err(AttendanceError::InvalidPeriod(format!(
                "year must be positive, got {year}"
            )));
        }

        let period = Self { year, month };
        // both ends of the window must be real dates
        if period.first_day().is_none() || period.next_first_day().is_none() {
            return Err(AttendanceError::InvalidPeriod(format!(
                "year {year} is out of range"
            )));
        }

        Ok(period)
    }

    /// Builds a period from raw query values. Missing or blank values fall
    /// back to `today`'s month and year.
    pub fn from_query(
        month: Option<&str>,
        year: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, AttendanceError> {
        let month = match non_blank(month) {
            Some(m) => m.parse::<u32>().map_err(|_| {
                AttendanceError::InvalidPeriod(format!("month '{m}' is not a number"))
            })?,
            None => today.month(),
        };

        let year = match non_blank(year) {
            Some(y) => y.parse::<i32>().map_err(|_| {
                AttendanceError::InvalidPeriod(format!("year '{y}' is not a number"))
            })?,
            None => today.year(),
        };

        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Half-open UTC window `[start, end)` covering the month.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (midnight_utc(self.start_date()), midnight_utc(self.end_date()))
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.bounds();
        instant >= start && instant < end
    }

    fn start_date(&self) -> NaiveDate {
        self.first_day().unwrap_or(NaiveDate::MIN)
    }

    fn end_date(&self) -> NaiveDate {
        self.next_first_day().unwrap_or(NaiveDate::MAX)
    }

    fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    fn next_first_day(&self) -> Option<NaiveDate> {
        if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year.checked_add(1)?, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
