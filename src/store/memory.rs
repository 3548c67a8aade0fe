//! In-process store with the same matching rules as the MySQL one.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::{AttendanceStore, StoreError, UpsertOutcome};
use crate::model::attendance::{Attendance, AttendanceRecord};
use crate::overtime::UpsertOp;

#[derive(Default)]
struct Inner {
    rows: Vec<Attendance>,
    next_id: u64,
    failing_days: HashSet<NaiveDate>,
}

#[derive(Default)]
pub struct MemoryAttendanceStore {
    inner: Mutex<Inner>,
}

impl MemoryAttendanceStore {
    /// Inserts a row verbatim, bypassing day normalisation.
    pub fn seed(&self, record: AttendanceRecord) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push(record.into_row(id));
        id
    }

    /// Makes every upsert for `day` fail.
    pub fn fail_on(&self, day: NaiveDate) {
        self.inner.lock().unwrap().failing_days.insert(day);
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn upsert(&self, op: &UpsertOp) -> Result<UpsertOutcome, StoreError> {
        let mut guard = self.inner.lock().unwrap();
        let inner = &mut *guard;
        if inner.failing_days.contains(&op.key.day) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }

        let existing = inner
            .rows
            .iter_mut()
            .find(|row| row.employee_id == op.key.employee_id && op.range.contains(row.date));

        match existing {
            Some(row) => {
                *row = op.record.clone().into_row(row.id);
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                inner.next_id += 1;
                let id = inner.next_id;
                inner.rows.push(op.record.clone().into_row(id));
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    async fn find_in_range(
        &self,
        employee_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Attendance>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Attendance> = inner
            .rows
            .iter()
            .filter(|row| row.employee_id == employee_id && from <= row.date && row.date < to)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }
}
