use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::employee::require_employee,
    auth::auth::AuthUser,
    error::{ApiError, ApiResult},
    model::attendance::Attendance,
    overtime::{
        BatchPlan, DailyRecord, MonthRange, OvertimeCalculator, OvertimeResult, prepare_batch,
    },
    store::{AttendanceStore, BatchWriteSummary, execute_batch},
};
use sqlx::MySqlPool;

#[derive(Deserialize, ToSchema)]
pub struct SaveAttendance {
    #[schema(example = 7)]
    pub employee_id: u64,
    pub attendance_records: Vec<DailyRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveAttendanceResponse {
    #[schema(example = "Attendance saved/updated successfully. Processed 2 records.")]
    pub message: String,
    /// Records turned into upserts.
    pub accepted: usize,
    /// Records dropped before reaching storage.
    pub skipped: usize,
    pub inserted: usize,
    pub replaced: usize,
    pub failed: usize,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    /// Employee ID
    pub employee_id: Option<u64>,
    /// Month as `YYYY-MM`
    #[param(example = "2023-12")]
    pub month: Option<String>,
}

impl MonthQuery {
    pub(crate) fn resolve(&self, calculator: &OvertimeCalculator) -> ApiResult<(u64, MonthRange)> {
        let (Some(employee_id), Some(month)) = (self.employee_id, self.month.as_deref()) else {
            return Err(ApiError::BadRequest(
                "Employee ID and month are required.".into(),
            ));
        };

        let range = MonthRange::parse(month, calculator.timezone())?;
        Ok((employee_id, range))
    }
}

#[derive(Deserialize, ToSchema)]
pub struct PreviewShift {
    #[schema(example = "2023-12-25")]
    pub date: String,
    #[schema(example = "09:00")]
    pub in_time: Option<String>,
    #[schema(example = "19:30")]
    pub out_time: Option<String>,
    /// Missing or non-positive values give the zero-hour result.
    #[schema(example = 550)]
    pub standard_duty_minutes: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub records: Vec<Attendance>,
}

fn save_response(
    plan: &BatchPlan,
    written: BatchWriteSummary,
) -> ApiResult<SaveAttendanceResponse> {
    let accepted = plan.accepted();

    if accepted > 0 && written.failed == accepted {
        return Err(ApiError::Internal(format!(
            "all {accepted} attendance upserts failed"
        )));
    }

    Ok(SaveAttendanceResponse {
        message: format!(
            "Attendance saved/updated successfully. Processed {accepted} records."
        ),
        accepted,
        skipped: plan.skipped_count(),
        inserted: written.inserted,
        replaced: written.replaced,
        failed: written.failed,
    })
}

/// Save a batch of daily attendance for one employee
///
/// Each day is calculated against the employee's standard duty time and
/// written as an insert-or-replace keyed by (employee, day).
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = SaveAttendance,
    responses(
        (status = 200, description = "Batch processed", body = SaveAttendanceResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Every upsert failed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "attendance_save",
    skip_all,
    fields(
        user_id = auth.user_id,
        employee_id = body.employee_id,
        submitted = body.attendance_records.len()
    )
)]
pub async fn save_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<dyn AttendanceStore>,
    calculator: web::Data<OvertimeCalculator>,
    body: web::Json<SaveAttendance>,
) -> ApiResult<HttpResponse> {
    let employee = require_employee(pool.get_ref(), body.employee_id).await?;

    let plan = prepare_batch(
        calculator.get_ref(),
        employee.id,
        i64::from(employee.standard_duty_minutes),
        &body.attendance_records,
    );

    for skipped in &plan.skipped {
        debug!(date = %skipped.date, reason = %skipped.reason, "Attendance record skipped");
    }

    let written = execute_batch(store.get_ref(), &plan.ops).await;

    if written.failed > 0 {
        warn!(failed = written.failed, "Some attendance upserts failed");
    }

    let response = save_response(&plan, written)?;

    info!(
        accepted = response.accepted,
        skipped = response.skipped,
        inserted = response.inserted,
        replaced = response.replaced,
        "Attendance batch saved"
    );

    Ok(HttpResponse::Ok().json(response))
}

/// List one employee's attendance for a month, oldest day first
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(MonthQuery),
    responses(
        (status = 200, description = "Attendance for the month", body = AttendanceListResponse),
        (status = 400, description = "Missing or invalid employee_id / month"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<dyn AttendanceStore>,
    calculator: web::Data<OvertimeCalculator>,
    query: web::Query<MonthQuery>,
) -> ApiResult<HttpResponse> {
    let (employee_id, month) = query.resolve(calculator.get_ref())?;

    let records = store
        .find_in_range(employee_id, month.start, month.end)
        .await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse { records }))
}

/// Calculate one day's hours without saving anything
///
/// Invalid input yields zero hours and null instants rather than an error.
#[utoipa::path(
    post,
    path = "/api/attendance/preview",
    request_body = PreviewShift,
    responses(
        (status = 200, description = "Calculated hours", body = OvertimeResult),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn preview_shift(
    calculator: web::Data<OvertimeCalculator>,
    body: web::Json<PreviewShift>,
) -> HttpResponse {
    let result: OvertimeResult = calculator.compute(
        &body.date,
        body.in_time.as_deref().unwrap_or_default(),
        body.out_time.as_deref().unwrap_or_default(),
        body.standard_duty_minutes.unwrap_or(0),
    );

    HttpResponse::Ok().json(result)
}
