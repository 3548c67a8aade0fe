use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::round2;
use crate::model::attendance::Attendance;

/// Monthly overtime bill for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReportSummary {
    pub days_worked: usize,
    #[schema(value_type = f64, example = 187.5)]
    pub total_duty_hours: Decimal,
    #[schema(value_type = f64, example = 12.33)]
    pub total_overtime_hours: Decimal,
    #[schema(value_type = f64, example = 150.0)]
    pub hourly_rate: Decimal,
    #[schema(value_type = f64, example = 1849.5)]
    pub total_bill: Decimal,
}

/// Sums the stored (already rounded) hours and prices the overtime.
pub fn summarize(records: &[Attendance], hourly_rate: Decimal) -> ReportSummary {
    let total_duty_hours: Decimal = records.iter().map(|r| r.duty_hours).sum();
    let total_overtime_hours: Decimal = records.iter().map(|r| r.overtime_hours).sum();

    ReportSummary {
        days_worked: records.len(),
        total_duty_hours: round2(total_duty_hours),
        total_overtime_hours: round2(total_overtime_hours),
        hourly_rate,
        total_bill: round2(total_overtime_hours * hourly_rate),
    }
}
