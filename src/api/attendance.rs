use actix_web::{HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthAdmin;
use crate::error::ApiError;
use crate::service::attendance::Attendance;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DepartureReq {
    /// Record to close. Defaults to the employee's latest open record.
    pub attendance_id: Option<u64>,
}

/// Record arrival endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/arrival",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 201, description = "Arrival recorded successfully", body = Object, example = json!({
            "message": "Arrival recorded successfully"
        })),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Arrival already recorded today", body = Object, example = json!({
            "message": "Arrival already recorded for the employee today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_arrival(
    _auth: AuthAdmin,
    service: web::Data<Attendance>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let record = service.record_arrival(path.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Arrival recorded successfully",
        "data": record
    })))
}

/// Record departure endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/departure",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    request_body(content = DepartureReq, description = "Optional record selector"),
    responses(
        (status = 201, description = "Departure recorded successfully", body = Object, example = json!({
            "message": "Departure recorded successfully"
        })),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Departure already recorded today, or no arrival to close", body = Object, example = json!({
            "message": "No arrival recorded for the employee"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn record_departure(
    _auth: AuthAdmin,
    service: web::Data<Attendance>,
    path: web::Path<u64>,
    body: Option<web::Json<DepartureReq>>,
) -> Result<HttpResponse, ApiError> {
    let attendance_id = body.and_then(|b| b.attendance_id);

    let record = service
        .record_departure(path.into_inner(), attendance_id)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Departure recorded successfully",
        "data": record
    })))
}
