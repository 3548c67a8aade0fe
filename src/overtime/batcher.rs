//! Turns one employee's submitted days into per-day upsert descriptors.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::calculator::{CalcError, OvertimeCalculator, parse_date};
use super::period::DayRange;
use crate::model::attendance::AttendanceRecord;

/// One submitted day, exactly as the client sent it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DailyRecord {
    #[schema(example = "2023-12-25")]
    pub date: String,

    #[serde(default)]
    #[schema(example = "21:00")]
    pub in_time: Option<String>,

    #[serde(default)]
    #[schema(example = "02:00")]
    pub out_time: Option<String>,
}

impl DailyRecord {
    pub fn new(date: &str, in_time: &str, out_time: &str) -> Self {
        Self {
            date: date.to_string(),
            in_time: Some(in_time.to_string()),
            out_time: Some(out_time.to_string()),
        }
    }

    fn times(&self) -> Option<(&str, &str)> {
        let in_time = self.in_time.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let out_time = self.out_time.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        Some((in_time, out_time))
    }
}

/// Unique target of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttendanceKey {
    pub employee_id: u64,
    pub day: NaiveDate,
}

/// Insert-or-replace for one (employee, day).
///
/// Stores match existing rows by `range`, then overwrite them with `record`
/// wholesale. Ops never depend on one another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsertOp {
    pub key: AttendanceKey,
    pub range: DayRange,
    pub record: AttendanceRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Rejected(CalcError),
    /// A later record in the same batch targets the same day.
    SupersededBySameDay,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Rejected(err) => write!(f, "{err}"),
            SkipReason::SupersededBySameDay => {
                f.write_str("superseded by a later entry for the same day")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub date: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub ops: Vec<UpsertOp>,
    pub skipped: Vec<SkippedRecord>,
}

impl BatchPlan {
    /// Number of emitted upserts.
    pub fn accepted(&self) -> usize {
        self.ops.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Prepares the upserts for one employee's batch.
///
/// Records without both times are dropped before any calculation; records the
/// calculator rejects are dropped too. At most one op is emitted per day: when
/// a day repeats, the later record wins and keeps the earlier one's position.
pub fn prepare_batch(
    calculator: &OvertimeCalculator,
    employee_id: u64,
    standard_duty_minutes: i64,
    records: &[DailyRecord],
) -> BatchPlan {
    let mut plan = BatchPlan::default();
    // day -> (op index, date text of the record currently holding it)
    let mut by_day: HashMap<NaiveDate, (usize, &str)> = HashMap::new();

    for raw in records {
        let skip = |reason| SkippedRecord {
            date: raw.date.clone(),
            reason,
        };

        let Some((in_time, out_time)) = raw.times() else {
            plan.skipped.push(skip(SkipReason::Rejected(CalcError::MissingTime)));
            continue;
        };

        let op = calculator
            .try_compute(&raw.date, in_time, out_time, standard_duty_minutes)
            .and_then(|shift| {
                debug!(
                    date = %raw.date,
                    total_minutes = shift.total_minutes,
                    overtime_minutes = shift.overtime_minutes,
                    overnight = shift.overnight,
                    "Shift evaluated"
                );
                let day = parse_date(&raw.date)?;
                let range = DayRange::for_date(day, calculator.timezone())
                    .map_err(|_| CalcError::MalformedDate(raw.date.clone()))?;
                Ok(UpsertOp {
                    key: AttendanceKey { employee_id, day },
                    range,
                    record: AttendanceRecord {
                        employee_id,
                        date: range.start,
                        in_time: shift.in_time,
                        out_time: shift.out_time,
                        duty_hours: shift.duty_hours,
                        overtime_hours: shift.overtime_hours,
                    },
                })
            });

        let op = match op {
            Ok(op) => op,
            Err(err) => {
                plan.skipped.push(skip(SkipReason::Rejected(err)));
                continue;
            }
        };

        match by_day.get_mut(&op.key.day) {
            Some((index, holder)) => {
                plan.ops[*index] = op;
                plan.skipped.push(SkippedRecord {
                    date: holder.to_string(),
                    reason: SkipReason::SupersededBySameDay,
                });
                *holder = raw.date.as_str();
            }
            None => {
                by_day.insert(op.key.day, (plan.ops.len(), raw.date.as_str()));
                plan.ops.push(op);
            }
        }
    }

    plan
}
