use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, MySqlPool};
use tracing::debug;

use super::{AttendanceStore, StoreError, UpsertOutcome};
use crate::model::attendance::Attendance;
use crate::overtime::UpsertOp;

/// Applies to the next transaction on the connection. Under the default
/// REPEATABLE READ, `FOR UPDATE` on an empty day takes a gap lock that two
/// first writers can both hold, and their inserts then deadlock.
const ISOLATION: &str = "SET TRANSACTION ISOLATION LEVEL READ COMMITTED";

/// Column list shared across attendance queries.
const COLUMNS: &str = "id, employee_id, work_date, in_time, out_time, duty_hours, overtime_hours";

/// Attendance rows in the `attendance` table.
///
/// `(employee_id, work_date)` carries a unique index; rows are still located
/// by day range so values written with a different sub-second part match.
#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn upsert(&self, op: &UpsertOp) -> Result<UpsertOutcome, StoreError> {
        let record = &op.record;
        let mut conn = self.pool.acquire().await?;
        sqlx::query(ISOLATION).execute(&mut *conn).await?;
        let mut tx = conn.begin().await?;

        let existing = sqlx::query_as::<_, (u64,)>(
            r#"
            SELECT id
            FROM attendance
            WHERE employee_id = ?
            AND work_date >= ?
            AND work_date < ?
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(op.key.employee_id)
        .bind(op.range.start)
        .bind(op.range.end)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE attendance
                    SET employee_id = ?, work_date = ?, in_time = ?, out_time = ?,
                        duty_hours = ?, overtime_hours = ?
                    WHERE id = ?
                    "#,
                )
                .bind(record.employee_id)
                .bind(record.date)
                .bind(record.in_time)
                .bind(record.out_time)
                .bind(record.duty_hours)
                .bind(record.overtime_hours)
                .bind(id)
                .execute(&mut *tx)
                .await?;

                UpsertOutcome::Replaced
            }
            None => {
                // No gap lock is held at READ COMMITTED, so a concurrent first
                // writer of the same key blocks on the unique index here and
                // the duplicate-key clause applies the later write.
                let result = sqlx::query(
                    r#"
                    INSERT INTO attendance
                    (employee_id, work_date, in_time, out_time, duty_hours, overtime_hours)
                    VALUES (?, ?, ?, ?, ?, ?)
                    ON DUPLICATE KEY UPDATE
                        in_time = VALUES(in_time),
                        out_time = VALUES(out_time),
                        duty_hours = VALUES(duty_hours),
                        overtime_hours = VALUES(overtime_hours)
                    "#,
                )
                .bind(record.employee_id)
                .bind(record.date)
                .bind(record.in_time)
                .bind(record.out_time)
                .bind(record.duty_hours)
                .bind(record.overtime_hours)
                .execute(&mut *tx)
                .await?;

                // MySQL reports 1 for a fresh row, 2 (or 0) when an existing one was hit
                if result.rows_affected() == 1 {
                    UpsertOutcome::Inserted
                } else {
                    UpsertOutcome::Replaced
                }
            }
        };

        tx.commit().await?;

        debug!(
            employee_id = op.key.employee_id,
            day = %op.key.day,
            ?outcome,
            "Attendance upserted"
        );

        Ok(outcome)
    }

    async fn find_in_range(
        &self,
        employee_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Attendance>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM attendance
             WHERE employee_id = ? AND work_date >= ? AND work_date < ?
             ORDER BY work_date ASC"
        );

        let rows = sqlx::query_as::<_, Attendance>(&sql)
            .bind(employee_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}
