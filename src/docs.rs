use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::DepartureReq;
use crate::api::employee::{
    CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::models::{ForgotPasswordReq, LoginReqDto, LoginResponse, ResetPasswordReq};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Operations API",
        version = "1.0.0",
        description = r#"
## HR Operations Backend

This API powers the day-to-day HR operations of an organization.

### Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Attendance Management**
  - Daily arrival and departure recording, one of each per employee per day
- **Admin Authentication**
  - JWT bearer login plus a throttled password-reset flow

### Security
Endpoints under the API prefix are protected using **JWT Bearer authentication**.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::forgot_password,
        crate::auth::handlers::verify_reset,
        crate::auth::handlers::reset_password,

        crate::api::attendance::record_arrival,
        crate::api::attendance::record_departure,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            ForgotPasswordReq,
            ResetPasswordReq,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            AttendanceRecord,
            DepartureReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Admin login and password reset APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}
