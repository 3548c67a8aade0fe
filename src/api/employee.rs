use crate::{
    config::Config,
    error::{ApiError, ApiResult, is_unique_violation},
    model::employee::Employee,
    utils::db_utils::{SqlUpdate, SqlValue, execute_update},
};
use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

/// Column list shared across employee queries.
const COLUMNS: &str =
    "id, employee_code, name, designation, hourly_rate, standard_duty_minutes, created_at";

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-007")]
    pub employee_code: String,
    #[schema(example = "Rahim Uddin")]
    pub name: String,
    #[schema(example = "Security Guard")]
    pub designation: Option<String>,
    #[schema(example = 150.0, value_type = f64)]
    pub hourly_rate: Decimal,
    /// Defaults to the configured standard duty when omitted.
    #[schema(example = 550)]
    pub standard_duty_minutes: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub employee_code: Option<String>,
    pub name: Option<String>,
    pub designation: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub hourly_rate: Option<Decimal>,
    pub standard_duty_minutes: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<Employee>,
}

fn required_text(value: &str, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required.")));
    }
    Ok(trimmed.to_string())
}

fn check_rate(rate: Decimal) -> ApiResult<Decimal> {
    if rate.is_sign_negative() {
        return Err(ApiError::BadRequest("Hourly rate must not be negative.".into()));
    }
    Ok(rate)
}

fn check_duty(minutes: i32) -> ApiResult<i32> {
    if minutes <= 0 {
        return Err(ApiError::BadRequest(
            "Standard duty time must be a positive number of minutes.".into(),
        ));
    }
    Ok(minutes)
}

/// Blank designations are stored as NULL.
fn designation_value(designation: Option<&str>) -> SqlValue {
    match designation.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => SqlValue::String(d.to_string()),
        None => SqlValue::Null,
    }
}

fn duplicate_code(code: &str) -> ApiError {
    ApiError::Conflict(format!("Employee with ID '{code}' already exists."))
}

pub(crate) async fn fetch_employee(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<Employee>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM employees WHERE id = ?");
    sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn require_employee(pool: &MySqlPool, employee_id: u64) -> ApiResult<Employee> {
    fetch_employee(pool, employee_id)
        .await?
        .ok_or(ApiError::NotFound { entity: "Employee" })
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Duplicate employee code")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<CreateEmployee>,
) -> ApiResult<HttpResponse> {
    let code = required_text(&payload.employee_code, "Employee ID")?;
    let name = required_text(&payload.name, "Name")?;
    let hourly_rate = check_rate(payload.hourly_rate)?;
    let duty = check_duty(
        payload
            .standard_duty_minutes
            .unwrap_or(config.default_standard_duty_minutes),
    )?;
    let designation = match designation_value(payload.designation.as_deref()) {
        SqlValue::String(d) => Some(d),
        _ => None,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (employee_code, name, designation, hourly_rate, standard_duty_minutes)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&code)
    .bind(&name)
    .bind(designation)
    .bind(hourly_rate)
    .bind(duty)
    .execute(pool.get_ref())
    .await;

    let id = match result {
        Ok(res) => res.last_insert_id(),
        Err(e) if is_unique_violation(&e) => return Err(duplicate_code(&code)),
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            return Err(e.into());
        }
    };

    let employee = require_employee(pool.get_ref(), id).await?;
    info!(employee_id = id, code = %code, "Employee created");

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee created successfully",
        "employee": employee
    })))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees, newest first", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(pool: web::Data<MySqlPool>) -> ApiResult<HttpResponse> {
    let sql = format!("SELECT {COLUMNS} FROM employees ORDER BY created_at DESC, id DESC");

    let employees = sqlx::query_as::<_, Employee>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employees");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse { employees }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let employee = require_employee(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "employee": employee })))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Duplicate employee code")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> ApiResult<HttpResponse> {
    let employee_id = path.into_inner();
    require_employee(pool.get_ref(), employee_id).await?;

    let code = body
        .employee_code
        .as_deref()
        .map(|c| required_text(c, "Employee ID"))
        .transpose()?;

    let mut update = SqlUpdate::new("employees");
    update
        .set_opt("employee_code", code.clone().map(SqlValue::String))
        .set_opt(
            "name",
            body.name
                .as_deref()
                .map(|n| required_text(n, "Name"))
                .transpose()?
                .map(SqlValue::String),
        )
        .set_opt(
            "designation",
            body.designation.as_deref().map(|d| designation_value(Some(d))),
        )
        .set_opt(
            "hourly_rate",
            body.hourly_rate.map(check_rate).transpose()?.map(SqlValue::Decimal),
        )
        .set_opt(
            "standard_duty_minutes",
            body.standard_duty_minutes
                .map(check_duty)
                .transpose()?
                .map(SqlValue::I32),
        );

    if update.is_empty() {
        return Err(ApiError::BadRequest("No fields provided for update".into()));
    }

    match execute_update(pool.get_ref(), update, "id", employee_id).await {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(duplicate_code(code.as_deref().unwrap_or_default()));
        }
        Err(e) => {
            error!(error = %e, employee_id, "Failed to update employee");
            return Err(e.into());
        }
    }

    let employee = require_employee(pool.get_ref(), employee_id).await?;
    info!(employee_id, "Employee updated");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully",
        "employee": employee
    })))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> ApiResult<HttpResponse> {
    let employee_id = path.into_inner();

    let res = sqlx::query(r#"DELETE FROM employees WHERE id = ?"#)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete employee");
            ApiError::from(e)
        })?;

    if res.rows_affected() == 0 {
        return Err(ApiError::NotFound { entity: "Employee" });
    }

    info!(employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully"
    })))
}
