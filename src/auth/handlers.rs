use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::admin::Admin;
use crate::models::{ForgotPasswordReq, LoginReqDto, LoginResponse, ResetPasswordReq, VerifyResetQuery};
use crate::service::reset_token::ResetTokens;

async fn admin_by_email(email: &str, pool: &MySqlPool) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as::<_, Admin>(
        r#"
        SELECT id, name, email, password
        FROM admins
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Admin login handler
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in successfully", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, req),
    fields(email = %req.email)
)]
pub async fn login(
    req: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if req.email.trim().is_empty() || req.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email and password required");
    }

    debug!("Fetching admin from database");

    let admin = match admin_by_email(req.email.trim(), pool.get_ref()).await {
        Ok(Some(admin)) => {
            debug!(admin_id = admin.id, "Admin found");
            admin
        }
        Ok(None) => {
            info!("Invalid credentials: admin not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching admin");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if let Err(e) = verify_password(&req.password, &admin.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let access_token = generate_access_token(
        admin.id,
        admin.email.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse { access_token })
}

/// Request a password-reset link
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordReq,
    responses(
        (status = 200, description = "Reset link issued", body = Object, example = json!({
            "message": "Password reset link sent"
        })),
        (status = 404, description = "Admin not found"),
        (status = 429, description = "A link was issued less than a minute ago", body = Object, example = json!({
            "message": "A reset link was sent recently, try again shortly",
            "time_left_seconds": 42
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_forgot_password",
    skip(pool, tokens, req),
    fields(email = %req.email)
)]
pub async fn forgot_password(
    req: web::Json<ForgotPasswordReq>,
    pool: web::Data<MySqlPool>,
    tokens: web::Data<ResetTokens>,
) -> Result<HttpResponse, ApiError> {
    let email = req.email.trim();
    if email.is_empty() {
        return Err(ApiError::Invalid("Email is required".into()));
    }

    let admin = admin_by_email(email, pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Admin not found".into()))?;

    let latest = tokens.find(email, None).await?;
    let throttle = tokens.resend_throttle(latest.as_ref());

    if throttle.reject {
        return Ok(HttpResponse::TooManyRequests().json(json!({
            "message": "A reset link was sent recently, try again shortly",
            "time_left_seconds": throttle.time_left_seconds
        })));
    }

    let token = tokens.issue(email).await?;

    // Reset-mail dispatch hooks in here; until a mailer is wired up the
    // token is only surfaced at debug level for operators.
    info!(admin_id = admin.id, "password reset link issued");
    debug!(token = %token, "reset token value");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset link sent"
    })))
}

/// Verify a reset link before showing the new-password form
#[utoipa::path(
    get,
    path = "/auth/reset-password",
    params(
        ("email", Query, description = "Account email"),
        ("v_token", Query, description = "Token value from the reset link")
    ),
    responses(
        (status = 200, description = "Token is redeemable", body = Object, example = json!({
            "valid": true
        })),
        (status = 400, description = "Invalid or expired token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn verify_reset(
    query: web::Query<VerifyResetQuery>,
    tokens: web::Data<ResetTokens>,
) -> Result<HttpResponse, ApiError> {
    tokens.validate(&query.email, &query.v_token).await?;

    Ok(HttpResponse::Ok().json(json!({ "valid": true })))
}

/// Redeem a reset token and set a new password
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordReq,
    responses(
        (status = 200, description = "Password changed", body = Object, example = json!({
            "message": "Password has been reset"
        })),
        (status = 400, description = "Invalid or expired token"),
        (status = 404, description = "Admin not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_reset_password",
    skip(pool, tokens, req),
    fields(email = %req.email)
)]
pub async fn reset_password(
    req: web::Json<ResetPasswordReq>,
    pool: web::Data<MySqlPool>,
    tokens: web::Data<ResetTokens>,
) -> Result<HttpResponse, ApiError> {
    if req.password.is_empty() {
        return Err(ApiError::Invalid("Password must not be empty".into()));
    }

    let record = tokens.validate(&req.email, &req.token).await?;

    let hashed = hash_password(&req.password);

    let result = sqlx::query(
        r#"
        UPDATE admins
        SET password = ?
        WHERE email = ?
        "#,
    )
    .bind(&hashed)
    .bind(&record.email)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Admin not found".into()));
    }

    // Redeemed tokens must not be reusable.
    if !tokens.delete(&record).await? {
        warn!("reset token vanished before deletion");
    }

    info!("password reset completed");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password has been reset"
    })))
}
