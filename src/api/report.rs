use actix_web::{HttpResponse, web};
use serde::Serialize;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    api::{attendance::MonthQuery, employee::require_employee},
    error::ApiResult,
    model::{attendance::Attendance, employee::Employee},
    overtime::{
        OvertimeCalculator,
        billing::{ReportSummary, summarize},
    },
    store::AttendanceStore,
};

#[derive(Serialize, ToSchema)]
pub struct MonthlyReport {
    #[schema(example = "2023-12")]
    pub month: String,
    pub employee: Employee,
    pub records: Vec<Attendance>,
    pub summary: ReportSummary,
}

/// Monthly overtime bill for one employee
#[utoipa::path(
    get,
    path = "/api/reports",
    params(MonthQuery),
    responses(
        (status = 200, description = "Report generated", body = MonthlyReport),
        (status = 400, description = "Missing or invalid employee_id / month"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn monthly_report(
    pool: web::Data<MySqlPool>,
    store: web::Data<dyn AttendanceStore>,
    calculator: web::Data<OvertimeCalculator>,
    query: web::Query<MonthQuery>,
) -> ApiResult<HttpResponse> {
    let (employee_id, range) = query.resolve(calculator.get_ref())?;
    let employee = require_employee(pool.get_ref(), employee_id).await?;

    let records = store
        .find_in_range(employee.id, range.start, range.end)
        .await?;
    let summary = summarize(&records, employee.hourly_rate);

    info!(
        employee_id,
        year = range.year,
        month = range.month,
        days = summary.days_worked,
        bill = %summary.total_bill,
        "Monthly report generated"
    );

    Ok(HttpResponse::Ok().json(MonthlyReport {
        month: format!("{:04}-{:02}", range.year, range.month),
        employee,
        records,
        summary,
    }))
}
