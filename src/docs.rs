use crate::api::attendance::{
    AttendanceListResponse, PreviewShift, SaveAttendance, SaveAttendanceResponse,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::report::MonthlyReport;
use crate::model::attendance::Attendance;
use crate::model::employee::Employee;
use crate::models::{LoginReqDto, LoginResponse, RegisterReqDto};
use crate::overtime::{DailyRecord, OvertimeResult};
use crate::overtime::billing::ReportSummary;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Overtime Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Overtime Tracker

Records daily check-in / check-out times, computes duty and overtime hours
against each employee's standard duty time, and produces monthly overtime bills.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, view and delete employees with their hourly rate
- **Attendance**
  - Save a batch of days at once; resubmitting a day replaces it
  - Overnight shifts (out-time before in-time) end on the next day
- **Reports**
  - Monthly totals and overtime bill per employee

### 🕒 Time handling
Dates (`YYYY-MM-DD`) and times (`HH:MM`, 24h) are wall-clock values in the
server's operating timezone. Hours are rounded half-up to 2 decimals.

### 🔐 Security
Every `/api` endpoint requires a **JWT Bearer** token from `/auth/login`.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::setup_admin,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::save_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::preview_shift,

        crate::api::report::monthly_report
    ),
    components(
        schemas(
            RegisterReqDto,
            LoginReqDto,
            LoginResponse,
            CreateEmployee,
            UpdateEmployee,
            Employee,
            EmployeeListResponse,
            DailyRecord,
            SaveAttendance,
            SaveAttendanceResponse,
            Attendance,
            AttendanceListResponse,
            PreviewShift,
            OvertimeResult,
            ReportSummary,
            MonthlyReport
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Daily attendance and overtime APIs"),
        (name = "Report", description = "Monthly overtime billing"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
