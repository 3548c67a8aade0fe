use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored attendance row. At most one exists per (employee, day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 7,
        "date": "2023-12-24T18:00:00Z",
        "in_time": "2023-12-25T03:00:00Z",
        "out_time": "2023-12-25T13:30:00Z",
        "duty_hours": 10.5,
        "overtime_hours": 1.33
    })
)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,

    /// Start of the calendar day in the operating timezone.
    #[sqlx(rename = "work_date")]
    #[schema(value_type = String, format = "date-time")]
    pub date: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub in_time: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub out_time: DateTime<Utc>,

    #[schema(value_type = f64)]
    pub duty_hours: Decimal,

    #[schema(value_type = f64)]
    pub overtime_hours: Decimal,
}

/// Full replacement written by an upsert; every field overwrites the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    pub employee_id: u64,
    pub date: DateTime<Utc>,
    pub in_time: DateTime<Utc>,
    pub out_time: DateTime<Utc>,
    pub duty_hours: Decimal,
    pub overtime_hours: Decimal,
}

impl AttendanceRecord {
    pub fn into_row(self, id: u64) -> Attendance {
        Attendance {
            id,
            employee_id: self.employee_id,
            date: self.date,
            in_time: self.in_time,
            out_time: self.out_time,
            duty_hours: self.duty_hours,
            overtime_hours: self.overtime_hours,
        }
    }
}
