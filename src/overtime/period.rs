use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("month must look like YYYY-MM, got `{0}`")]
    InvalidMonth(String),

    #[error("{0} has no representable start in the operating timezone")]
    Unrepresentable(NaiveDate),
}

/// First instant of `date` in `tz`.
///
/// A handful of zones jump over local midnight on DST days; there the first
/// local hour that exists is used instead.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    (0..24)
        .find_map(|hour| {
            let local = date.and_hms_opt(hour, 0, 0)?;
            tz.from_local_datetime(&local).earliest()
        })
        .map(|instant| instant.with_timezone(&Utc))
}

/// One calendar day in the operating timezone, as `[start, end)`.
///
/// Attendance rows are matched against this interval instead of comparing
/// the stored day instant for equality, so a stored value carrying a different
/// sub-second part still resolves to the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayRange {
    pub fn for_date(date: NaiveDate, tz: Tz) -> Result<Self, PeriodError> {
        let start = start_of_day(date, tz).ok_or(PeriodError::Unrepresentable(date))?;
        let next = date
            .checked_add_days(Days::new(1))
            .ok_or(PeriodError::Unrepresentable(date))?;
        let end = start_of_day(next, tz).ok_or(PeriodError::Unrepresentable(next))?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// A billing month in the operating timezone, as `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthRange {
    /// Parses `YYYY-MM`.
    pub fn parse(text: &str, tz: Tz) -> Result<Self, PeriodError> {
        let invalid = || PeriodError::InvalidMonth(text.to_string());

        let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(invalid)?;

        Ok(Self {
            year: first.year(),
            month: first.month(),
            start: start_of_day(first, tz).ok_or(PeriodError::Unrepresentable(first))?,
            end: start_of_day(next, tz).ok_or(PeriodError::Unrepresentable(next))?,
        })
    }
}
