use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "employee_code": "EMP-007",
        "name": "Rahim Uddin",
        "designation": "Security Guard",
        "hourly_rate": 150.0,
        "standard_duty_minutes": 550,
        "created_at": "2024-01-01T00:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = "EMP-007")]
    pub employee_code: String,

    #[schema(example = "Rahim Uddin")]
    pub name: String,

    #[schema(example = "Security Guard", nullable = true)]
    pub designation: Option<String>,

    /// Overtime pay per hour.
    #[schema(value_type = f64, example = 150.0)]
    pub hourly_rate: Decimal,

    /// Expected daily work; anything beyond it counts as overtime.
    #[schema(example = 550)]
    pub standard_duty_minutes: i32,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
