//! Email-OTP auth route handlers.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify-otp", post(verify_otp))
}

/// Request body for requesting a sign-in code.
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    email: Option<String>,
    mobile: Option<String>,
}

/// Response for a dispatched code.
#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    message: &'static str,
}

/// Request body for verifying a sign-in code.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    email: Option<String>,
    otp: Option<String>,
}

/// Response for a verified code.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    message: &'static str,
    token: String,
    expires_at: DateTime<Utc>,
}

/// `POST /auth/send-otp` - upsert the account and mail a six-digit code
/// valid for five minutes.
///
/// # Errors
///
/// 400 for a missing/invalid email or mobile, 409 when the mobile belongs
/// to another account, 500 (message surfaced) when the mail bounces.
pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, AppError> {
    let email = body
        .email
        .as_deref()
        .ok_or(AppError::Auth(AuthError::MissingEmail))?;

    AuthService::new(state.pool(), state.email(), state.tokens())
        .send_otp(email, body.mobile.as_deref())
        .await?;

    Ok(Json(SendOtpResponse {
        message: "OTP sent to email",
    }))
}

/// `POST /auth/verify-otp` - verify the code and issue a seven-day session
/// token. The code is cleared on success and cannot be replayed.
///
/// # Errors
///
/// 400 for a missing field or any verification failure ("Invalid or
/// expired OTP" - deliberately not saying which).
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, AppError> {
    let (Some(email), Some(otp)) = (body.email.as_deref(), body.otp.as_deref()) else {
        return Err(AppError::BadRequest("Email and OTP are required".to_owned()));
    };

    let issued = AuthService::new(state.pool(), state.email(), state.tokens())
        .verify_otp(email, otp)
        .await?;

    Ok(Json(VerifyOtpResponse {
        message: "OTP verified",
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}
