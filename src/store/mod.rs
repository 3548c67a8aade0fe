//! Persistence of attendance rows behind an injected handle.
//!
//! The core only needs two capabilities from storage: an atomic per-key
//! upsert and a range read. Handlers receive the store as
//! `web::Data<dyn AttendanceStore>`, constructed once in `main`.

#[cfg(test)]
pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::model::attendance::Attendance;
use crate::overtime::UpsertOp;

pub use mysql::MySqlAttendanceStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Insert-or-replace the row whose day falls inside `op.range`.
    ///
    /// Must be atomic per key; concurrent writers of the same key end with
    /// the last write.
    async fn upsert(&self, op: &UpsertOp) -> Result<UpsertOutcome, StoreError>;

    /// Rows with `from <= date < to`, oldest first.
    async fn find_in_range(
        &self,
        employee_id: u64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Attendance>, StoreError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchWriteSummary {
    pub inserted: usize,
    pub replaced: usize,
    pub failed: usize,
}

impl BatchWriteSummary {
    pub fn written(&self) -> usize {
        self.inserted + self.replaced
    }
}

/// Applies every op independently. A failing op is logged and counted; the
/// remaining ops still run.
pub async fn execute_batch<S>(store: &S, ops: &[UpsertOp]) -> BatchWriteSummary
where
    S: AttendanceStore + ?Sized,
{
    let mut summary = BatchWriteSummary::default();

    for op in ops {
        match store.upsert(op).await {
            Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
            Ok(UpsertOutcome::Replaced) => summary.replaced += 1,
            Err(e) => {
                error!(
                    error = %e,
                    employee_id = op.key.employee_id,
                    day = %op.key.day,
                    "Attendance upsert failed"
                );
                summary.failed += 1;
            }
        }
    }

    summary
}
