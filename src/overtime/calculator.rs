//! Duty and overtime hours for a single day's check-in / check-out pair.
//!
//! Times are wall-clock values in the deployment's operating timezone. A shift
//! whose out-time falls before its in-time is treated as ending on the next
//! calendar day; longer shifts (over 24 hours) cannot be expressed.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use super::round2;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
// chrono accepts single-digit fields, so the zero-padded layout is checked first
const DATE_SHAPE: &str = "9999-99-99";
const TIME_SHAPE: &str = "99:99";

/// Why a record produced no shift.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    #[error("in-time or out-time is missing")]
    MissingTime,

    #[error("standard duty minutes must be positive, got {0}")]
    NonPositiveStandardDuty(i64),

    #[error("malformed date `{0}`")]
    MalformedDate(String),

    #[error("malformed time `{0}`")]
    MalformedTime(String),

    #[error("local time {local} does not exist in {zone}")]
    NonexistentLocalTime { local: NaiveDateTime, zone: &'static str },

    #[error("negative duration of {0} minutes")]
    NegativeDuration(i64),
}

/// A successfully evaluated shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub in_time: DateTime<Utc>,
    pub out_time: DateTime<Utc>,
    pub total_minutes: i64,
    pub overtime_minutes: i64,
    pub duty_hours: Decimal,
    pub overtime_hours: Decimal,
    /// Out-time was moved to the next calendar day.
    pub overnight: bool,
}

/// Calculation outcome in the shape the HTTP layer and batcher consume.
///
/// Invalid input yields [`OvertimeResult::null`]: zero hours and no instants.
/// Callers treat that as "do not persist", never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OvertimeResult {
    #[schema(value_type = f64, example = 10.5)]
    pub duty_hours: Decimal,
    #[schema(value_type = f64, example = 1.33)]
    pub overtime_hours: Decimal,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub in_time: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub out_time: Option<DateTime<Utc>>,
}

impl OvertimeResult {
    pub const fn null() -> Self {
        Self {
            duty_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            in_time: None,
            out_time: None,
        }
    }
}

impl From<Shift> for OvertimeResult {
    fn from(shift: Shift) -> Self {
        Self {
            duty_hours: shift.duty_hours,
            overtime_hours: shift.overtime_hours,
            in_time: Some(shift.in_time),
            out_time: Some(shift.out_time),
        }
    }
}

/// Stateless calculator bound to the operating timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OvertimeCalculator {
    tz: Tz,
}

impl OvertimeCalculator {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Fail-soft variant: any rejected input collapses to the null result.
    pub fn compute(
        &self,
        date: &str,
        in_time: &str,
        out_time: &str,
        standard_duty_minutes: i64,
    ) -> OvertimeResult {
        match self.try_compute(date, in_time, out_time, standard_duty_minutes) {
            Ok(shift) => shift.into(),
            Err(reason) => {
                debug!(date, in_time, out_time, %reason, "Overtime calculation skipped");
                OvertimeResult::null()
            }
        }
    }

    pub fn try_compute(
        &self,
        date: &str,
        in_time: &str,
        out_time: &str,
        standard_duty_minutes: i64,
    ) -> Result<Shift, CalcError> {
        let (in_text, out_text) = (in_time.trim(), out_time.trim());
        if in_text.is_empty() || out_text.is_empty() {
            return Err(CalcError::MissingTime);
        }
        if standard_duty_minutes <= 0 {
            return Err(CalcError::NonPositiveStandardDuty(standard_duty_minutes));
        }

        let day = parse_date(date)?;
        let in_local = day.and_time(parse_time(in_text)?);
        let mut out_local = day.and_time(parse_time(out_text)?);

        let in_instant = self.localize(in_local)?;
        let mut out_instant = self.localize(out_local)?;

        // Applied once only: a shift can cross at most one midnight.
        let overnight = out_instant < in_instant;
        if overnight {
            out_local = out_local
                .checked_add_days(Days::new(1))
                .ok_or_else(|| CalcError::MalformedDate(date.to_string()))?;
            out_instant = self.localize(out_local)?;
        }

        let total_minutes = (out_instant - in_instant).num_minutes();
        if total_minutes < 0 {
            return Err(CalcError::NegativeDuration(total_minutes));
        }
        let overtime_minutes = (total_minutes - standard_duty_minutes).max(0);

        Ok(Shift {
            in_time: in_instant,
            out_time: out_instant,
            total_minutes,
            overtime_minutes,
            // rounded independently, never derived from each other
            duty_hours: minutes_to_hours(total_minutes),
            overtime_hours: minutes_to_hours(overtime_minutes),
            overnight,
        })
    }

    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    fn localize(&self, local: NaiveDateTime) -> Result<DateTime<Utc>, CalcError> {
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .map(|instant| instant.with_timezone(&Utc))
            .ok_or(CalcError::NonexistentLocalTime {
                local,
                zone: self.tz.name(),
            })
    }
}

/// `9` in `shape` matches any ASCII digit; every other byte must match exactly.
fn has_shape(text: &str, shape: &str) -> bool {
    text.len() == shape.len()
        && text.bytes().zip(shape.bytes()).all(|(c, s)| match s {
            b'9' => c.is_ascii_digit(),
            _ => c == s,
        })
}

pub fn parse_date(text: &str) -> Result<NaiveDate, CalcError> {
    let trimmed = text.trim();
    if !has_shape(trimmed, DATE_SHAPE) {
        return Err(CalcError::MalformedDate(text.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| CalcError::MalformedDate(text.to_string()))
}

fn parse_time(text: &str) -> Result<NaiveTime, CalcError> {
    if !has_shape(text, TIME_SHAPE) {
        return Err(CalcError::MalformedTime(text.to_string()));
    }
    NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|_| CalcError::MalformedTime(text.to_string()))
}

pub fn minutes_to_hours(minutes: i64) -> Decimal {
    round2(Decimal::from(minutes) / Decimal::from(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, Asia::Dhaka, UTC};
    use rust_decimal_macros::dec;

    fn dhaka() -> OvertimeCalculator {
        OvertimeCalculator::new(Dhaka)
    }

    #[test]
    fn same_day_shift_with_overtime() {
        let result = dhaka().compute("2023-12-25", "09:00", "19:30", 550);

        assert_eq!(result.duty_hours, dec!(10.50));
        assert_eq!(result.overtime_hours, dec!(1.33));
        assert_eq!(
            result.in_time,
            Some(Utc.with_ymd_and_hms(2023, 12, 25, 3, 0, 0).unwrap())
        );
        assert_eq!(
            result.out_time,
            Some(Utc.with_ymd_and_hms(2023, 12, 25, 13, 30, 0).unwrap())
        );
    }

    #[test]
    fn exact_standard_duration_has_no_overtime() {
        let result = dhaka().compute("2023-12-25", "09:00", "17:10", 490);

        assert_eq!(result.duty_hours, dec!(8.17));
        assert_eq!(result.overtime_hours, dec!(0.00));
    }

    #[test]
    fn overnight_shift_rolls_out_time_to_next_day() {
        let shift = dhaka()
            .try_compute("2023-12-25", "21:00", "02:00", 480)
            .unwrap();

        assert!(shift.overnight);
        assert_eq!(shift.total_minutes, 300);
        assert_eq!(shift.duty_hours, dec!(5.00));
        assert_eq!(shift.overtime_hours, dec!(0.00));
        assert_eq!(
            shift.out_time,
            Utc.with_ymd_and_hms(2023, 12, 25, 20, 0, 0).unwrap()
        );
    }

    #[test]
    fn overnight_shift_with_overtime() {
        let shift = dhaka()
            .try_compute("2024-01-31", "18:00", "06:15", 600)
            .unwrap();

        assert_eq!(shift.total_minutes, 735);
        assert_eq!(shift.overtime_minutes, 135);
        assert_eq!(shift.duty_hours, dec!(12.25));
        assert_eq!(shift.overtime_hours, dec!(2.25));
    }

    #[test]
    fn equal_in_and_out_is_a_zero_length_shift() {
        let shift = dhaka()
            .try_compute("2023-12-25", "09:00", "09:00", 480)
            .unwrap();

        assert!(!shift.overnight);
        assert_eq!(shift.duty_hours, dec!(0.00));
    }

    #[test]
    fn hours_are_rounded_independently() {
        // 481 min = 8.0166 h -> 8.02, 422 min = 7.0333 h -> 7.03, 59 min -> 0.98
        let shift = dhaka()
            .try_compute("2023-12-25", "09:00", "17:01", 422)
            .unwrap();

        assert_eq!(shift.duty_hours, dec!(8.02));
        assert_eq!(shift.overtime_hours, dec!(0.98));
        assert_ne!(
            shift.duty_hours - minutes_to_hours(422),
            shift.overtime_hours
        );
    }

    #[test]
    fn hours_keep_two_decimal_places() {
        let result = dhaka().compute("2023-12-25", "09:00", "19:30", 550);

        assert_eq!(result.duty_hours.to_string(), "10.50");
        assert_eq!(result.overtime_hours.to_string(), "1.33");
    }

    #[test]
    fn missing_time_yields_null_result() {
        let calc = dhaka();

        assert_eq!(calc.compute("2023-12-25", "", "17:00", 480), OvertimeResult::null());
        assert_eq!(calc.compute("2023-12-25", "09:00", "  ", 480), OvertimeResult::null());
        assert_eq!(
            calc.try_compute("not a date", "", "17:00", 0),
            Err(CalcError::MissingTime)
        );
    }

    #[test]
    fn non_positive_standard_duty_yields_null_result() {
        let calc = dhaka();

        assert_eq!(calc.compute("2023-12-25", "09:00", "17:00", 0), OvertimeResult::null());
        assert_eq!(
            calc.try_compute("2023-12-25", "09:00", "17:00", -30),
            Err(CalcError::NonPositiveStandardDuty(-30))
        );
    }

    #[test]
    fn malformed_text_yields_null_result() {
        let calc = dhaka();

        assert_eq!(
            calc.try_compute("2023-13-40", "09:00", "17:00", 480),
            Err(CalcError::MalformedDate("2023-13-40".to_string()))
        );
        assert_eq!(
            calc.try_compute("2023-12-25", "9am", "17:00", 480),
            Err(CalcError::MalformedTime("9am".to_string()))
        );
        assert_eq!(
            calc.try_compute("2023-12-25", "09:00", "25:00", 480),
            Err(CalcError::MalformedTime("25:00".to_string()))
        );
        assert_eq!(calc.compute("25/12/2023", "09:00", "17:00", 480), OvertimeResult::null());
    }

    #[test]
    fn unpadded_fields_are_malformed() {
        let calc = dhaka();

        for time in ["9:00", "09:0", "9:5", "09:00:00", "0900"] {
            assert_eq!(
                calc.try_compute("2023-12-25", time, "17:00", 480),
                Err(CalcError::MalformedTime(time.to_string())),
                "{time}"
            );
        }
        for date in ["2023-1-5", "2023-01-5", "23-01-05", "2023/01/05"] {
            assert_eq!(
                calc.try_compute(date, "09:00", "17:00", 480),
                Err(CalcError::MalformedDate(date.to_string())),
                "{date}"
            );
        }
        assert_eq!(calc.compute("2023-12-25", "9:00", "17:00", 480), OvertimeResult::null());
        assert_eq!(parse_date(" 2023-12-25 ").unwrap().to_string(), "2023-12-25");
    }

    #[test]
    fn time_inside_dst_gap_yields_null_result() {
        // New York skipped 02:00-03:00 on 2024-03-10
        let calc = OvertimeCalculator::new(New_York);

        assert!(matches!(
            calc.try_compute("2024-03-10", "02:30", "10:00", 480),
            Err(CalcError::NonexistentLocalTime { .. })
        ));
    }

    #[test]
    fn elapsed_time_follows_real_instants_across_dst() {
        // 00:00 -> 08:00 local on the spring-forward day is only 7 real hours
        let calc = OvertimeCalculator::new(New_York);
        let shift = calc.try_compute("2024-03-10", "00:00", "08:00", 420).unwrap();

        assert_eq!(shift.total_minutes, 420);
        assert_eq!(shift.overtime_hours, dec!(0.00));
    }

    #[test]
    fn same_wall_clock_in_different_zones_gives_different_instants() {
        let in_utc = OvertimeCalculator::new(UTC)
            .compute("2023-12-25", "09:00", "17:00", 480)
            .in_time
            .unwrap();
        let in_dhaka = dhaka()
            .compute("2023-12-25", "09:00", "17:00", 480)
            .in_time
            .unwrap();

        assert_eq!(in_utc - in_dhaka, chrono::Duration::hours(6));
    }
}
